//! NLU configuration: trait and env-based implementation.

use nlubot_core::ConfigError;
use std::env;
use std::time::Duration;

pub const DEFAULT_SLOT: &str = "production";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for a LUIS-style prediction endpoint.
pub trait NluConfig: Send + Sync {
    fn endpoint(&self) -> &str;
    fn app_id(&self) -> &str;
    fn api_key(&self) -> &str;
    fn slot(&self) -> &str;
    fn timeout(&self) -> Duration;
}

/// NLU config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvNluConfig {
    pub luis_endpoint: String,
    pub luis_app_id: String,
    pub luis_api_key: String,
    pub luis_slot: String,
    pub luis_timeout_secs: u64,
}

impl NluConfig for EnvNluConfig {
    fn endpoint(&self) -> &str {
        &self.luis_endpoint
    }
    fn app_id(&self) -> &str {
        &self.luis_app_id
    }
    fn api_key(&self) -> &str {
        &self.luis_api_key
    }
    fn slot(&self) -> &str {
        &self.luis_slot
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.luis_timeout_secs)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

impl EnvNluConfig {
    /// Load from environment: LUIS_ENDPOINT, LUIS_APP_ID, LUIS_API_KEY required;
    /// LUIS_SLOT, LUIS_TIMEOUT_SECS optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let luis_endpoint = required("LUIS_ENDPOINT")?;
        let luis_app_id = required("LUIS_APP_ID")?;
        let luis_api_key = required("LUIS_API_KEY")?;
        let luis_slot = env::var("LUIS_SLOT").unwrap_or_else(|_| DEFAULT_SLOT.to_string());
        let luis_timeout_secs = match env::var("LUIS_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "LUIS_TIMEOUT_SECS",
                reason: format!("`{}` is not a whole number of seconds", raw),
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        let config = Self {
            luis_endpoint,
            luis_app_id,
            luis_api_key,
            luis_slot,
            luis_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Endpoint must be an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.luis_endpoint).map_err(|e| ConfigError::InvalidValue {
            name: "LUIS_ENDPOINT",
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidValue {
                name: "LUIS_ENDPOINT",
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        Ok(())
    }
}
