use std::path::PathBuf;

use anyhow::Result;

use staticlink_core::{Config, ConfigPaths};

use super::load_config;

pub fn print_effective(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let output = config.to_toml_string()?;
    println!("{}", output);
    Ok(())
}

pub fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(path) => path,
        None => ConfigPaths::resolve()?.config_path,
    };
    if config_path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
    }
    let config = Config::default_config();
    config.save(&config_path)?;
    println!("Config written to {}", config_path.display());
    Ok(())
}
