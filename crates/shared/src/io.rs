use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Directory name used under the platform config and cache directories.
pub const APP_DIR: &str = "headlines";

/// Get the directory holding `config.json` and `.env`, creating it if needed
pub fn get_config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join(APP_DIR);

    fs::create_dir_all(&dir).context("Failed to create config directory")?;

    Ok(dir)
}

/// Get the directory holding the article database and the log file
pub fn get_cache_dir() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join(APP_DIR);

    fs::create_dir_all(&dir).context("Failed to create cache directory")?;

    Ok(dir)
}

pub fn get_default_db_path() -> Result<PathBuf> {
    Ok(get_cache_dir()?.join("data.db"))
}

pub fn get_default_log_path() -> Result<PathBuf> {
    Ok(get_cache_dir()?.join("headlines.log"))
}
