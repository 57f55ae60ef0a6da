pub mod config;
pub mod migrations;
pub mod plan_db;

pub use config::Config;
pub use plan_db::PlanDb;

use std::path::PathBuf;

/// Returns `~/.config/tanzim[-dev]/` based on TANZIM_ENV.
///
/// Set TANZIM_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TANZIM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tanzim-dev")
    } else {
        base_dir.join("tanzim")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
