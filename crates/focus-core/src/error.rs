//! Core error types for focus-core.
//!
//! The session state machine itself never fails. Errors come from two places:
//! building a configuration (fatal, rejected before a session starts) and
//! delivering alerts (recovered locally, logged, never propagated out of a tick).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Alert delivery errors
    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The session task is no longer running
    #[error("Session has shut down")]
    SessionClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value, e.g. a zero phase duration
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Failures of the audio and notification sinks.
///
/// Both are non-fatal: the dispatcher logs them and the timer keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    /// No audio output device, or the playback path failed
    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    /// Notification permission missing or the notifier could not be reached
    #[error("Notification denied: {0}")]
    NotificationDenied(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_message_names_key() {
        let err = ConfigError::invalid("session.work_minutes", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'session.work_minutes': must be greater than zero"
        );
    }

    #[test]
    fn alert_error_wraps_into_core_error() {
        let err: CoreError = AlertError::AudioUnavailable("no device".into()).into();
        assert!(matches!(err, CoreError::Alert(AlertError::AudioUnavailable(_))));
        assert_eq!(err.to_string(), "Alert error: Audio unavailable: no device");
    }
}
