//! Current-weather lookup backed by the OpenWeatherMap API.
//!
//! A missing API key is surfaced at construction time as a configuration
//! error; runtime failures (unknown city, network trouble) are reported
//! per request.

use crate::config::LookupConfig;
use crate::error::{LookupError, Result};
use crate::http;
use crate::types::WeatherReport;
use serde_json::Value;

/// OpenWeatherMap current-weather client.
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    units: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a client, resolving the configured API key.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] when no usable API key is configured
    /// and [`LookupError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let api_key = config.weather.api_key.resolve()?;
        Ok(Self {
            client: http::build_client(config)?,
            base_url: config.weather.base_url.trim_end_matches('/').to_owned(),
            units: config.weather.units.clone(),
            api_key,
        })
    }

    /// Fetch current conditions for `city`.
    ///
    /// # Errors
    ///
    /// - [`LookupError::NotFound`] when the service reports a non-200 `cod`;
    ///   the payload carries the service's `message` when present.
    /// - [`LookupError::Http`] / [`LookupError::Parse`] for transport and
    ///   payload failures.
    pub async fn current(&self, city: &str) -> Result<WeatherReport> {
        tracing::trace!(city, "weather lookup");

        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("appid", self.api_key.as_str()),
                ("q", city),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Http(format!("weather request failed: {e}")))?;

        // The service reports errors in-band via `cod`, with HTTP status to
        // match — read the body regardless and let `cod` drive the outcome.
        let body: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(format!("invalid weather response: {e}")))?;

        if status_code(&body) != Some(200) {
            let reason = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned();
            return Err(LookupError::NotFound(reason));
        }

        let temperature = body
            .pointer("/main/temp")
            .and_then(Value::as_f64)
            .ok_or_else(|| LookupError::Parse("response is missing main.temp".to_owned()))?;

        let description = body
            .pointer("/weather/0/description")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                LookupError::Parse("response is missing weather[0].description".to_owned())
            })?
            .to_owned();

        let name = body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(city)
            .to_owned();

        Ok(WeatherReport {
            city: name,
            temperature,
            description,
        })
    }
}

/// Extract the service's `cod` field, which is a number on success but a
/// string (e.g. `"404"`) on error responses.
fn status_code(body: &Value) -> Option<i64> {
    match body.get("cod") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
