//! Built-in one-liner jokes for the joke intent.

use rand::seq::SliceRandom;

/// The canned joke collection. Short one-liners that read well when spoken.
const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "I told my computer I needed a break, and it said it would go to sleep.",
    "There are only two hard things in computer science: cache invalidation, \
     naming things, and off-by-one errors.",
    "Why did the developer go broke? Because they used up all their cache.",
    "A SQL query walks into a bar, goes up to two tables and asks: may I join you?",
    "Why do Java developers wear glasses? Because they don't C sharp.",
    "I would tell you a UDP joke, but you might not get it.",
    "How many programmers does it take to change a light bulb? None, that's \
     a hardware problem.",
    "My code doesn't have bugs. It has undocumented features.",
    "Debugging: being the detective in a crime movie where you are also the murderer.",
];

/// Picks a joke at random from the built-in collection.
#[derive(Debug, Default, Clone, Copy)]
pub struct JokeBox;

impl JokeBox {
    /// Create a new joke box.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Select a random joke.
    #[must_use]
    pub fn pick(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        JOKES
            .choose(&mut rng)
            .copied()
            // JOKES is a non-empty const array, choose only returns None on empty slices
            .unwrap_or(JOKES[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_returns_a_known_joke() {
        let jokes = JokeBox::new();
        let joke = jokes.pick();
        assert!(JOKES.contains(&joke));
        assert!(!joke.is_empty());
    }

    #[test]
    fn collection_is_not_empty() {
        assert!(!JOKES.is_empty());
    }
}
