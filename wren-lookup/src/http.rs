//! Shared HTTP client construction for the lookup services.

use crate::config::LookupConfig;
use crate::error::LookupError;
use std::time::Duration;

/// Build a [`reqwest::Client`] configured for lookup API requests.
///
/// The client has a per-request timeout and a stable User-Agent taken from
/// the config (MediaWiki requires API consumers to identify themselves).
///
/// # Errors
///
/// Returns [`LookupError::Http`] if the client cannot be constructed.
pub fn build_client(config: &LookupConfig) -> Result<reqwest::Client, LookupError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| LookupError::Http(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let config = LookupConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = LookupConfig {
            user_agent: "CustomAssistant/1.0".into(),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }
}
