mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DisplayConfig, LogConfig, SpheresConfig, StatsConfig};
pub use database::LedgerDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `HABITLEDGER_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/habitledger[-dev]/`, with `HABITLEDGER_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = if let Ok(explicit) = std::env::var("HABITLEDGER_DATA_DIR") {
        PathBuf::from(explicit)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");

        let env = std::env::var("HABITLEDGER_ENV").unwrap_or_else(|_| "production".to_string());

        if env == "dev" {
            base_dir.join("habitledger-dev")
        } else {
            base_dir.join("habitledger")
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
