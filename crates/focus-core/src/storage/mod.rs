mod config;

pub use config::{Config, ReminderSection, SessionSection};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/focus[-dev]/`, creating it if needed.
///
/// `FOCUS_CONFIG_DIR` overrides the location entirely. Otherwise
/// `FOCUS_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUS_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focus-dev")
            } else {
                base_dir.join("focus")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
