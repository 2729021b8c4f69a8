//! TOML-based application configuration.
//!
//! Holds the two phase lengths and the reminder interval bounds. Stored at
//! `~/.config/focus/config.toml`; timer state itself is never persisted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{ReminderConfig, SessionConfig};

/// Phase lengths in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u64,
}

/// Focus reminder timing in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSection {
    #[serde(default = "default_min_interval")]
    pub min_interval_secs: u64,
    #[serde(default = "default_max_interval")]
    pub max_interval_secs: u64,
    #[serde(default = "default_beep_gap")]
    pub beep_gap_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focus/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub reminder: ReminderSection,
}

fn default_work_minutes() -> u64 {
    90
}
fn default_break_minutes() -> u64 {
    20
}
fn default_min_interval() -> u64 {
    180
}
fn default_max_interval() -> u64 {
    300
}
fn default_beep_gap() -> u64 {
    10
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Default for ReminderSection {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval(),
            max_interval_secs: default_max_interval(),
            beep_gap_secs: default_beep_gap(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| {
                        ConfigError::invalid(key, format!("cannot parse '{value}' as a whole number"))
                    })?,
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    ///
    /// The result is validated before it is accepted, so an invalid value
    /// leaves `self` untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check every section builds into a valid runtime config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session_config()?;
        self.reminder_config()?;
        Ok(())
    }

    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let s = &self.session;
        if s.work_minutes == 0 {
            return Err(ConfigError::invalid("session.work_minutes", "must be greater than zero"));
        }
        if s.break_minutes == 0 {
            return Err(ConfigError::invalid("session.break_minutes", "must be greater than zero"));
        }
        SessionConfig::from_minutes(s.work_minutes, s.break_minutes)
    }

    pub fn reminder_config(&self) -> Result<ReminderConfig, ConfigError> {
        let r = &self.reminder;
        if r.min_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "reminder.min_interval_secs",
                "must be greater than zero",
            ));
        }
        if r.min_interval_secs > r.max_interval_secs {
            return Err(ConfigError::invalid(
                "reminder.max_interval_secs",
                format!("must be at least min_interval_secs ({})", r.min_interval_secs),
            ));
        }
        ReminderConfig::new(
            Duration::from_secs(r.min_interval_secs),
            Duration::from_secs(r.max_interval_secs),
            Duration::from_secs(r.beep_gap_secs),
        )
    }
}
