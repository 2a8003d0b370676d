//! Embedded knowledge lookups for Wren.
//!
//! Two small HTTP clients back the assistant's lookup intents:
//! - [`EncyclopediaClient`] — plain-text article summaries via the MediaWiki
//!   API, with typed not-found and disambiguation outcomes.
//! - [`WeatherClient`] — current conditions via the OpenWeatherMap API,
//!   with the missing-API-key case surfaced as a configuration error.
//!
//! Neither client retries; failures map to [`LookupError`] variants that the
//! caller turns into spoken replies.

pub mod config;
pub mod encyclopedia;
pub mod error;
pub mod http;
pub mod types;
pub mod weather;

pub use config::{ApiKeyRef, LookupConfig, WeatherConfig};
pub use encyclopedia::EncyclopediaClient;
pub use error::{LookupError, Result};
pub use types::{Summary, WeatherReport};
pub use weather::WeatherClient;
