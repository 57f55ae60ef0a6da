//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - compile options (wake-up margin before Fajr)
//! - configured prayer durations
//! - the editor command used to open qalib templates
//!
//! Configuration is stored at `~/.config/tanzim/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::compiler::CompileOptions;
use crate::prayer::PrayerDurations;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tanzim/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compile: CompileOptions,
    #[serde(default)]
    pub prayers: PrayerDurations,
    /// Editor command for template editing. Falls back to $EDITOR.
    #[serde(default)]
    pub editor: Option<String>,
    /// Name of the qalib compiled when no template is given explicitly.
    #[serde(default)]
    pub default_template: Option<String>,
}

impl Config {
    /// Path of the configuration file.
    pub fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, writing defaults on first run.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Editor command, preferring the configured one over $EDITOR.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string())
    }
}
