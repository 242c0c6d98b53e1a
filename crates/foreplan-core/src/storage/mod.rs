pub mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, WeightState};

use std::path::PathBuf;

/// Returns `~/.local/share/foreplan[-dev]/` based on FOREPLAN_ENV.
///
/// Set FOREPLAN_ENV=dev to keep development data apart from real records.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));

    let env = std::env::var("FOREPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("foreplan-dev")
    } else {
        base_dir.join("foreplan")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns `~/.config/foreplan/`, created on demand.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn config_dir() -> Result<PathBuf, std::io::Error> {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("foreplan");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
