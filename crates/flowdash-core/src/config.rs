//! Configuration management for the flowdash toolkit

use serde::{Deserialize, Serialize};

/// Main configuration structure shared by the client and the monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the telemetry backend (e.g. `http://10.0.0.5:8000/api/v1`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token, when already issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Username for token acquisition at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for token acquisition at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("FLOWDASH_BACKEND_BASE_URL")
                .unwrap_or_else(|_| default_base_url()),
            token: std::env::var("FLOWDASH_BACKEND_TOKEN").ok(),
            username: None,
            password: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and files
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("flowdash").required(false))
            .add_source(config::Environment::with_prefix("FLOWDASH").separator("_"))
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        config
            .try_deserialize()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.backend.base_url.is_empty());
        assert_eq!(config.backend.request_timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_backend_config_deserialization_defaults() {
        let config: BackendConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.token, None);
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let toml_str = r#"
            [backend]
            base_url = "https://scada.example/api/v1"
            token = "secret"
            request_timeout_seconds = 10

            [logging]
            level = "debug"
            format = "text"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "https://scada.example/api/v1");
        assert_eq!(config.backend.token.as_deref(), Some("secret"));
        assert_eq!(config.backend.request_timeout_seconds, 10);
        assert_eq!(config.logging.level, "debug");
    }
}
