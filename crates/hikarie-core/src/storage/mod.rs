mod config;
pub mod database;
pub mod migrations;

pub use config::{BadgesConfig, CalendarConfig, Config, DisplayConfig, LogConfig};
pub use database::{ArrivalEntry, Database, UserScore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `HIKARIE_DATA_DIR` wins when set. Otherwise `~/.config/hikarie[-dev]/`
/// based on `HIKARIE_ENV` (set `HIKARIE_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HIKARIE_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HIKARIE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("hikarie-dev")
            } else {
                base_dir.join("hikarie")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
