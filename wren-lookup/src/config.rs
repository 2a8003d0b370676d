//! Configuration for the lookup clients.

use crate::error::{LookupError, Result};
use serde::{Deserialize, Serialize};

/// Configuration shared by all lookup clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// User-Agent header sent with every request. MediaWiki asks API
    /// consumers to identify themselves.
    pub user_agent: String,
    /// Number of leading sentences returned by encyclopedia summaries.
    pub summary_sentences: usize,
    /// Base URL of the MediaWiki API endpoint.
    pub encyclopedia_url: String,
    /// Weather service settings.
    pub weather: WeatherConfig,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: concat!("wren/", env!("CARGO_PKG_VERSION")).to_owned(),
            summary_sentences: 1,
            encyclopedia_url: "https://en.wikipedia.org/w/api.php".to_owned(),
            weather: WeatherConfig::default(),
        }
    }
}

/// OpenWeatherMap client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL of the weather API (path `/data/2.5/weather` is appended).
    pub base_url: String,
    /// Unit system requested from the service.
    pub units: String,
    /// API key reference. Resolution failure is a configuration error,
    /// distinct from a runtime fetch failure.
    pub api_key: ApiKeyRef,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_owned(),
            units: "metric".to_owned(),
            api_key: ApiKeyRef::None,
        }
    }
}

/// Secret reference used for service API keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiKeyRef {
    /// No API key configured.
    #[default]
    None,
    /// Inline literal key (discouraged; prefer `env`).
    Literal { value: String },
    /// Resolve the key from an environment variable.
    Env { var: String },
}

impl ApiKeyRef {
    /// Resolve the key to a concrete string.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] when no key is configured, the
    /// environment variable is missing, or the resolved value is empty.
    pub fn resolve(&self) -> Result<String> {
        match self {
            Self::None => Err(LookupError::Config("API key is not configured".to_owned())),
            Self::Literal { value } => {
                if value.trim().is_empty() {
                    return Err(LookupError::Config("API key is empty".to_owned()));
                }
                Ok(value.clone())
            }
            Self::Env { var } => {
                let value = std::env::var(var).map_err(|_| {
                    LookupError::Config(format!("API key env var is missing: {var}"))
                })?;
                if value.trim().is_empty() {
                    return Err(LookupError::Config(format!("API key env var is empty: {var}")));
                }
                Ok(value)
            }
        }
    }

    /// Whether any key source is configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }
}
