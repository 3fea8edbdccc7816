//! Configuration loading for the sync pipeline
//!
//! JSON file with every field optional:
//!
//! ```json
//! { "exchange_id": "bittrex", "base_unit": "BTC", "stable_unit": "USDT", "period_secs": 10 }
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_rates::ConversionTargets;
use thiserror::Error;

pub const ENV_API_KEY: &str = "EXCHANGE_API_KEY";
pub const ENV_API_SECRET: &str = "EXCHANGE_API_SECRET";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("--{flag} argument or '{var}' environment variable must be provided")]
    MissingCredential { flag: &'static str, var: &'static str },
}

/// Root configuration of one sync pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Exchange identifier written into every stored row
    pub exchange_id: String,
    pub base_unit: String,
    pub stable_unit: String,
    /// Seconds between sync cycles
    pub period_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            exchange_id: "bittrex".to_string(),
            base_unit: "BTC".to_string(),
            stable_unit: "USDT".to_string(),
            period_secs: 10,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exchange_id.trim().is_empty() {
            return Err(ConfigError::Invalid("exchange_id is empty".to_string()));
        }
        if self.base_unit.trim().is_empty() || self.stable_unit.trim().is_empty() {
            return Err(ConfigError::Invalid("conversion units must be set".to_string()));
        }
        if self.base_unit.eq_ignore_ascii_case(&self.stable_unit) {
            return Err(ConfigError::Invalid(format!(
                "base and stable unit are both {}",
                self.base_unit
            )));
        }
        if self.period_secs == 0 {
            return Err(ConfigError::Invalid("period_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn targets(&self) -> ConversionTargets {
        ConversionTargets::new(&self.base_unit, &self.stable_unit)
    }
}

/// Load and validate configuration from a JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
        path: path.as_ref().display().to_string(),
        error: e.to_string(),
    })?;

    load_config_from_str(&content)
}

/// Parse and validate configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<SyncConfig, ConfigError> {
    let config: SyncConfig =
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// API key pair for the exchange client
#[derive(Clone, PartialEq, Eq)]
pub struct ExchangeCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ExchangeCredentials {
    /// Explicit values win; missing or empty ones come from the environment
    pub fn resolve(
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(api_key, api_secret, |var| std::env::var(var).ok())
    }

    /// `resolve` with a custom variable lookup
    pub fn resolve_with<F>(
        api_key: Option<String>,
        api_secret: Option<String>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, flag: &'static str, var: &'static str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(var).filter(|v| !v.is_empty()))
                .ok_or(ConfigError::MissingCredential { flag, var })
        };

        Ok(Self {
            api_key: pick(api_key, "api-key", ENV_API_KEY)?,
            api_secret: pick(api_secret, "api-secret", ENV_API_SECRET)?,
        })
    }
}

impl fmt::Debug for ExchangeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.period(), Duration::from_secs(10));
        assert_eq!(config.targets(), ConversionTargets::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            load_config_from_str(r#"{ "stable_unit": "USDC", "period_secs": 60 }"#).unwrap();
        assert_eq!(config.exchange_id, "bittrex");
        assert_eq!(config.stable_unit, "USDC");
        assert_eq!(config.period(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            load_config_from_str(r#"{ "period_secs": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load_config_from_str(r#"{ "base_unit": "usdt" }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load_config_from_str(r#"{ "exchange_id": " " }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load_config_from_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/tally.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_credentials_prefer_explicit_values() {
        let creds = ExchangeCredentials::resolve_with(
            Some("key".to_string()),
            Some("secret".to_string()),
            |_| Some("from-env".to_string()),
        )
        .unwrap();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.api_secret, "secret");
    }

    #[test]
    fn test_credentials_fall_back_to_env() {
        let creds = ExchangeCredentials::resolve_with(Some(String::new()), None, |var| {
            Some(format!("{}-value", var))
        })
        .unwrap();
        assert_eq!(creds.api_key, "EXCHANGE_API_KEY-value");
        assert_eq!(creds.api_secret, "EXCHANGE_API_SECRET-value");
        assert!(!format!("{:?}", creds).contains("SECRET-value"));
    }

    #[test]
    fn test_missing_credential_names_source() {
        let err = ExchangeCredentials::resolve_with(Some("key".to_string()), None, |_| None)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingCredential {
                flag: "api-secret",
                var: ENV_API_SECRET
            }
        );
        assert!(err.to_string().contains("EXCHANGE_API_SECRET"));
    }
}
