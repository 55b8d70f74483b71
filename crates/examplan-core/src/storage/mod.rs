mod config;

pub use config::{Config, UploadConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/examplan[-dev]/` based on EXAMPLAN_ENV.
///
/// Set EXAMPLAN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("EXAMPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("examplan-dev")
    } else {
        base_dir.join("examplan")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
