//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the application server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Runtime mode; the devtool only runs in development.
    pub mode: Mode,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Registry devtool settings.
    pub devtool: DevtoolConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Whether the devtool endpoints should be mounted.
    pub fn devtool_active(&self) -> bool {
        self.devtool.enabled && self.mode == Mode::Development
    }
}

/// Runtime mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[serde(alias = "dev")]
    Development,
    #[default]
    Production,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Registry devtool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevtoolConfig {
    /// Expose the registry snapshot and graph endpoints.
    pub enabled: bool,

    /// Mount point of the devtool endpoints.
    pub path_prefix: String,

    /// Optional bearer token required by the devtool endpoints.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for DevtoolConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path_prefix: "/__devtool".to_string(),
            api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let raw = "mode = \"dev\"\n[devtool]\nenabled = true\n";
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.mode, Mode::Development);
        assert!(config.devtool_active());
        assert_eq!(config.devtool.path_prefix, "/__devtool");
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_devtool_inactive_in_production() {
        let mut config = AppConfig::default();
        config.devtool.enabled = true;
        assert!(!config.devtool_active());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = AppConfig::default();
        config.devtool.api_key = Some("secret".into());
        let value = serde_json::to_value(&config).unwrap();
        assert!(value["devtool"].get("api_key").is_none());
    }
}
