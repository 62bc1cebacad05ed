//! Layered configuration for the model endpoint.
//!
//! Sources, highest priority first:
//! 1. `OBJECTIVE_STUDIO_*` environment variables
//! 2. `objective-studio.toml` in the working directory
//! 3. Built-in defaults
//!
//! `OPENAI_API_KEY` is honoured when `OBJECTIVE_STUDIO_API_KEY` is unset.
//! A missing key is not an error here; the client reports it on first use.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "objective-studio.toml";
pub const ENV_PREFIX: &str = "OBJECTIVE_STUDIO_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Absent means requests are bounded only by the endpoint.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let mut config: Config = Self::figment().extract()?;
        config.api_key = config
            .api_key
            .take()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()));
        config.validate()?;
        Ok(config)
    }

    /// Loads `.env` from the working directory first, if there is one.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "temperature".to_string(),
                reason: format!("{} is outside 0.0..=2.0", self.temperature),
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.temperature, 0.7);
        assert!(config.request_timeout_secs.is_none());
    }
}
