//! Centralized CLI configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `COLLOQUY__`, using `__` to separate nested keys, for example
//! `COLLOQUY__RESPONDER__LATENCY_MS=250`.

use colloquy_ai::CannedResponderConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Directory holding the stored conversations.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Responder configuration.
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// Responder-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponderConfig {
    /// Simulated reply latency, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Seconds to wait for a reply before giving up.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".colloquy")
}

fn default_log_filter() -> String {
    "warn,colloquy=info,colloquy_session=info,colloquy_conversation=info".to_string()
}

fn default_latency_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ResponderConfig {
    /// Returns the canned responder settings.
    #[must_use]
    pub fn canned(&self) -> CannedResponderConfig {
        CannedResponderConfig {
            latency_ms: self.latency_ms,
        }
    }

    /// Returns the reply timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CliConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("COLLOQUY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_uses_defaults() {
        let config: CliConfig = config::Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("deserialize");

        assert_eq!(config.data_dir, PathBuf::from(".colloquy"));
        assert_eq!(config.responder.latency_ms, 1000);
        assert_eq!(config.responder.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn nested_overrides_apply() {
        let config: CliConfig = config::Config::builder()
            .set_override("data_dir", "/tmp/colloquy-test")
            .and_then(|b| b.set_override("responder.latency_ms", 5))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("deserialize");

        assert_eq!(config.data_dir, PathBuf::from("/tmp/colloquy-test"));
        assert_eq!(config.responder.canned().latency_ms, 5);
        assert_eq!(config.responder.timeout_secs, 30);
    }
}
