//! Adapter seams for the knowledge lookup services.
//!
//! The dispatcher talks to these traits, not to concrete HTTP clients, so
//! tests can substitute in-process fakes. The production implementations
//! live in the `wren-lookup` crate.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use wren_lookup::{
    EncyclopediaClient, LookupConfig, LookupError, Summary, WeatherClient, WeatherReport,
};

/// Encyclopedia summary lookup contract.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Fetch a summary of `query`, truncated to `sentences` sentences.
    async fn summary(&self, query: &str, sentences: usize) -> wren_lookup::Result<Summary>;
}

/// Current-weather lookup contract.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for `city`.
    async fn current(&self, city: &str) -> wren_lookup::Result<WeatherReport>;
}

#[async_trait]
impl Encyclopedia for EncyclopediaClient {
    async fn summary(&self, query: &str, sentences: usize) -> wren_lookup::Result<Summary> {
        EncyclopediaClient::summary(self, query, sentences).await
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current(&self, city: &str) -> wren_lookup::Result<WeatherReport> {
        WeatherClient::current(self, city).await
    }
}

/// Weather provider used when no API key is configured.
///
/// Keeps the assistant running: every request reports the configuration
/// error, which the dispatcher turns into a spoken reply.
pub struct UnconfiguredWeather;

#[async_trait]
impl WeatherProvider for UnconfiguredWeather {
    async fn current(&self, _city: &str) -> wren_lookup::Result<WeatherReport> {
        Err(LookupError::Config(
            "weather API key is not configured".to_owned(),
        ))
    }
}

/// Build the weather provider from config, degrading to
/// [`UnconfiguredWeather`] when the API key is missing.
///
/// # Errors
///
/// Returns an error only for non-configuration failures (e.g. the HTTP
/// client cannot be built).
pub fn weather_provider(config: &LookupConfig) -> wren_lookup::Result<Arc<dyn WeatherProvider>> {
    match WeatherClient::new(config) {
        Ok(client) => Ok(Arc::new(client)),
        Err(LookupError::Config(reason)) => {
            warn!("weather lookups disabled: {reason}");
            Ok(Arc::new(UnconfiguredWeather))
        }
        Err(e) => Err(e),
    }
}
