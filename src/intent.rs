//! Keyword intent matching and dispatch.
//!
//! Transcripts are matched against a fixed, ordered rule table; the first
//! rule whose keyword appears in the transcript wins, so overlapping
//! keywords are resolved by declaration order ("play nonstop music" is a
//! play command, never a stop command). Parameter extraction is naive
//! substring removal — strip the trigger keyword, trim whitespace — which
//! matches the narrow fixed vocabulary this assistant understands.
//!
//! # Rule order
//!
//! | Keyword        | Intent                          |
//! |----------------|---------------------------------|
//! | (empty)        | `Empty`                         |
//! | "play"         | `Play { song }`                 |
//! | "time"         | `Time`                          |
//! | "who is"       | `WhoIs { person }`              |
//! | "joke"         | `Joke`                          |
//! | "weather in"   | `Weather { city }`              |
//! | "weather"      | `Weather { city }` (word strip) |
//! | "stop"/"exit"  | `Stop`                          |
//! | (no match)     | `Unrecognized`                  |

use crate::jokes::JokeBox;
use crate::lookup::{Encyclopedia, WeatherProvider};
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, warn};
use wren_lookup::LookupError;

/// Reply for an empty transcript.
pub const EMPTY_COMMAND_REPLY: &str = "Empty command received.";
/// Reply when no rule matches.
pub const NOT_RECOGNIZED_REPLY: &str =
    "I could not hear you properly or the command is not recognized.";
/// Reply for the stop/exit intent.
pub const GOODBYE_REPLY: &str = "Goodbye!";
/// Reply when the weather intent arrives without a city.
pub const SPECIFY_CITY_REPLY: &str = "Please specify a city, like: 'weather in London'.";
/// Reply when the weather service has no API key.
pub const WEATHER_UNCONFIGURED_REPLY: &str = "The weather API key is not configured.";

/// A response in both speakable and display form.
///
/// The two diverge when the display form carries a Markdown link or other
/// formatting unsuitable for speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Text handed to the speech synthesizer.
    pub speech: String,
    /// Text rendered by the presentation layer.
    pub display: String,
}

impl Response {
    /// A response whose spoken and displayed forms are identical.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            display: text.clone(),
            speech: text,
        }
    }
}

/// The result of dispatching one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The assistant's reply.
    pub response: Response,
    /// Whether the session should terminate after this reply.
    pub terminate: bool,
}

impl DispatchOutcome {
    fn reply(response: Response) -> Self {
        Self {
            response,
            terminate: false,
        }
    }
}

/// A parsed intent with its extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Empty transcript.
    Empty,
    /// Search for a song or video.
    Play {
        /// Transcript with the trigger keyword stripped.
        song: String,
    },
    /// Tell the current time.
    Time,
    /// Look up a person or subject.
    WhoIs {
        /// Transcript with the trigger keyword stripped.
        person: String,
    },
    /// Tell a joke.
    Joke,
    /// Report the weather. `city` may be empty, in which case the
    /// dispatcher asks for one instead of calling the weather service.
    Weather {
        /// City extracted from the transcript.
        city: String,
    },
    /// End the session.
    Stop,
    /// No rule matched.
    Unrecognized,
}

impl Intent {
    /// Match `transcript` against the rule table.
    ///
    /// The transcript is expected lowercased and trimmed (the transcription
    /// adapter normalizes it); both are applied again here so direct callers
    /// get the same behavior.
    #[must_use]
    pub fn parse(transcript: &str) -> Self {
        let command = transcript.trim().to_lowercase();

        if command.is_empty() {
            return Self::Empty;
        }
        if command.contains("play") {
            return Self::Play {
                song: strip_keyword(&command, "play"),
            };
        }
        if command.contains("time") {
            return Self::Time;
        }
        if command.contains("who is") {
            return Self::WhoIs {
                person: strip_keyword(&command, "who is"),
            };
        }
        if command.contains("joke") {
            return Self::Joke;
        }
        // "weather in <city>" is the specific form; a bare "weather" falls
        // back to stripping the single word and treating the rest as a city.
        if let Some((_, after)) = command.split_once("weather in") {
            return Self::Weather {
                city: after.trim().to_owned(),
            };
        }
        if command.contains("weather") {
            return Self::Weather {
                city: strip_keyword(&command, "weather"),
            };
        }
        if command.contains("stop") || command.contains("exit") {
            return Self::Stop;
        }
        Self::Unrecognized
    }
}

/// Naive parameter extraction: remove every occurrence of the keyword and
/// trim the remainder.
fn strip_keyword(command: &str, keyword: &str) -> String {
    command.replace(keyword, "").trim().to_owned()
}

/// Dispatches transcripts to intent handlers.
///
/// Owns the lookup adapters behind trait objects so tests can substitute
/// in-process fakes. Every adapter failure degrades to a user-facing reply;
/// nothing here returns an error.
pub struct IntentDispatcher {
    encyclopedia: Arc<dyn Encyclopedia>,
    weather: Arc<dyn WeatherProvider>,
    jokes: JokeBox,
    summary_sentences: usize,
}

impl IntentDispatcher {
    /// Create a dispatcher over the given lookup adapters.
    pub fn new(
        encyclopedia: Arc<dyn Encyclopedia>,
        weather: Arc<dyn WeatherProvider>,
        summary_sentences: usize,
    ) -> Self {
        Self {
            encyclopedia,
            weather,
            jokes: JokeBox::new(),
            summary_sentences,
        }
    }

    /// Dispatch one transcript and produce the assistant's reply.
    pub async fn dispatch(&self, transcript: &str) -> DispatchOutcome {
        let intent = Intent::parse(transcript);
        debug!(?intent, "dispatching");

        match intent {
            Intent::Empty => DispatchOutcome::reply(Response::plain(EMPTY_COMMAND_REPLY)),
            Intent::Play { song } => DispatchOutcome::reply(play_response(&song)),
            Intent::Time => {
                let now = Local::now().format("%I:%M %p");
                DispatchOutcome::reply(Response::plain(format!("The current time is {now}")))
            }
            Intent::WhoIs { person } => DispatchOutcome::reply(self.who_is(&person).await),
            Intent::Joke => DispatchOutcome::reply(Response::plain(self.jokes.pick())),
            Intent::Weather { city } => DispatchOutcome::reply(self.weather(&city).await),
            Intent::Stop => DispatchOutcome {
                response: Response::plain(GOODBYE_REPLY),
                terminate: true,
            },
            Intent::Unrecognized => DispatchOutcome::reply(Response::plain(NOT_RECOGNIZED_REPLY)),
        }
    }

    async fn who_is(&self, person: &str) -> Response {
        match self
            .encyclopedia
            .summary(person, self.summary_sentences)
            .await
        {
            Ok(summary) => Response::plain(summary.extract),
            Err(LookupError::NotFound(_)) => Response::plain(format!(
                "Sorry, I could not find any information on {person}."
            )),
            Err(LookupError::Ambiguous(_)) => Response::plain(format!(
                "Multiple results for {person}. Please be more specific."
            )),
            Err(e) => {
                warn!("encyclopedia lookup failed: {e}");
                Response::plain("I had trouble reaching the encyclopedia. Please try again.")
            }
        }
    }

    async fn weather(&self, city: &str) -> Response {
        if city.is_empty() {
            return Response::plain(SPECIFY_CITY_REPLY);
        }

        match self.weather.current(city).await {
            Ok(report) => Response::plain(format!(
                "The temperature in {} is {}\u{b0}C with {}.",
                report.city, report.temperature, report.description
            )),
            Err(LookupError::NotFound(reason)) => Response::plain(format!(
                "Sorry, I couldn't find the weather for {city}. Reason: {reason}."
            )),
            Err(LookupError::Config(_)) => Response::plain(WEATHER_UNCONFIGURED_REPLY),
            Err(e) => {
                warn!("weather lookup failed: {e}");
                Response::plain("I had trouble reaching the weather service. Please try again.")
            }
        }
    }
}

/// Build the play response: a spoken pointer plus a display form carrying a
/// URL-encoded YouTube search link.
fn play_response(song: &str) -> Response {
    let query = urlencoding::encode(song);
    let url = format!("https://www.youtube.com/results?search_query={query}");
    Response {
        speech: format!("Here is a link to search for {song} on YouTube."),
        display: format!("Here is a link for '{song}':\n[Click here to watch]({url})"),
    }
}
