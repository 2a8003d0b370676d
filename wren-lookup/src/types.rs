//! Result types returned by the lookup clients.

use serde::{Deserialize, Serialize};

/// An encyclopedia summary for a single subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Canonical article title (after redirect resolution).
    pub title: String,
    /// Plain-text summary, truncated to the configured sentence count.
    pub extract: String,
}

/// Current weather conditions for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// City name as echoed by the service.
    pub city: String,
    /// Temperature in the configured units (Celsius for `metric`).
    pub temperature: f64,
    /// Short human-readable description, e.g. "scattered clouds".
    pub description: String,
}
