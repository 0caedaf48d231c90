pub mod config;
pub mod sweep;
pub mod verify;

use std::path::PathBuf;

use anyhow::{Context, Result};

use staticlink_core::{Config, ConfigPaths};

/// Loads `--config` if given, otherwise the per-user config or built-in defaults.
pub fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => {
            Config::load(&path).with_context(|| format!("load config {}", path.display()))
        }
        None => {
            let paths = ConfigPaths::resolve()?;
            Config::load_or_default(&paths.config_path)
        }
    }
}
