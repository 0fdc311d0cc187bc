//! Settings shared by the server and the terminal client.

use crate::sync::SyncSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default config file looked up next to the binary's working directory.
pub const DEFAULT_CONFIG_PATH: &str = "noughts.toml";

/// Runtime settings, loaded from TOML.
///
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Settings {
    /// Address the server binds to.
    #[serde(default = "default_host")]
    host: String,

    /// Port the server binds to.
    #[serde(default = "default_port")]
    port: u16,

    /// Server URL used by `play`.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Sleep between marker pulls while the first player chooses.
    #[serde(default = "default_marker_poll_interval_ms")]
    marker_poll_interval_ms: u64,

    /// Upper bound on a single turn long-poll.
    #[serde(default = "default_turn_wait_timeout_ms")]
    turn_wait_timeout_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_marker_poll_interval_ms() -> u64 {
    250
}

fn default_turn_wait_timeout_ms() -> u64 {
    30_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            server_url: default_server_url(),
            marker_poll_interval_ms: default_marker_poll_interval_ms(),
            turn_wait_timeout_ms: default_turn_wait_timeout_ms(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(?settings, "Settings loaded");
        Ok(settings)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Replaces the bind address.
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Replaces the server URL.
    pub fn with_server_url(mut self, server_url: Option<String>) -> Self {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        self
    }

    /// Timing for a client session.
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings::new(
            Duration::from_millis(self.marker_poll_interval_ms),
            Duration::from_millis(self.turn_wait_timeout_ms),
        )
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\nmarker_poll_interval_ms = 10").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(*settings.port(), 8080);
        assert_eq!(settings.host(), "127.0.0.1");
        assert_eq!(
            *settings.sync_settings().marker_poll_interval(),
            Duration::from_millis(10)
        );
        assert_eq!(
            *settings.sync_settings().turn_wait_timeout(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let err = Settings::load_or_default(file.path()).unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_overrides_only_apply_when_given() {
        let settings = Settings::default()
            .with_bind(None, Some(9000))
            .with_server_url(Some("http://example.test:9000".to_string()));
        assert_eq!(settings.host(), "127.0.0.1");
        assert_eq!(*settings.port(), 9000);
        assert_eq!(settings.server_url(), "http://example.test:9000");
    }
}
