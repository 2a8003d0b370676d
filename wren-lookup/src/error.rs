//! Error types for the wren-lookup crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. API keys never appear in error messages.

/// Errors that can occur during knowledge lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The query matched nothing. The payload is the service's own reason
    /// string when one was provided (e.g. OpenWeatherMap's `message` field).
    #[error("not found: {0}")]
    NotFound(String),

    /// The query matched several subjects and the service cannot pick one.
    /// The payload is the original query.
    #[error("ambiguous query: {0}")]
    Ambiguous(String),

    /// An HTTP request to the backing service failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service responded but the payload could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or missing lookup configuration (e.g. no API key).
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for wren-lookup results.
pub type Result<T> = std::result::Result<T, LookupError>;
