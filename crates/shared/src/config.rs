use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::feed::validate_url;
use crate::io::{get_config_dir, get_default_db_path, APP_DIR};
use crate::models::FeedDescriptor;
use crate::sync::DEFAULT_REFRESH_INTERVAL;

pub const CONFIG_FILE: &str = "config.json";

const DB_PATH_VAR: &str = "HEADLINES_DB_PATH";
const REFRESH_VAR: &str = "HEADLINES_REFRESH_SECS";

fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rss_feeds: Vec<FeedDescriptor>,
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
    /// Not stored in the file; resolved from the cache directory or the environment.
    #[serde(skip)]
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rss_feeds: Vec::new(),
            refresh_interval_secs: default_refresh_secs(),
            db_path: PathBuf::from("data.db"),
        }
    }
}

impl Config {
    /// Load the config from `path`, or from the default location.
    ///
    /// A missing file is created with defaults. `.env` overrides are applied
    /// after the file is read.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::try_load_dotenv();

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => get_config_dir()?.join(CONFIG_FILE),
        };

        let mut config = Self::read_or_create(&path)?;
        config.db_path = get_default_db_path()?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Read the config file, writing a default one first if it doesn't exist.
    pub fn read_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config
                .save(path)
                .context("Failed to create default config")?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse config file {}. Expected {{\"rss_feeds\": [{{\"source\": ..., \"url\": ...}}]}}",
                path.display()
            )
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Apply environment overrides, looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(db_path) = lookup(DB_PATH_VAR) {
            self.db_path = PathBuf::from(db_path);
        }

        if let Some(secs) = lookup(REFRESH_VAR) {
            self.refresh_interval_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got {:?}", REFRESH_VAR, secs))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be greater than zero");
        }

        for feed in &self.rss_feeds {
            if feed.source.trim().is_empty() {
                anyhow::bail!("Feed {} has an empty source name", feed.url);
            }
            validate_url(&feed.url)
                .map_err(|e| anyhow::anyhow!("Feed {} has a bad URL: {}", feed.source, e))?;
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/headlines/.env
        if let Some(config_dir) = dirs::config_dir() {
            let env_path = config_dir.join(APP_DIR).join(".env");
            if env_path.exists() && dotenvy::from_path(&env_path).is_ok() {
                return;
            }
        }

        // Nothing found is fine; the environment itself may carry overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config::read_or_create(&path).unwrap();

        assert!(config.rss_feeds.is_empty());
        assert_eq!(config.refresh_interval_secs, 900);
        assert!(path.exists());
        let written = Config::read_or_create(&path).unwrap();
        assert_eq!(written.refresh_interval_secs, 900);
    }

    #[test]
    fn test_reads_feeds() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{"rss_feeds": [
                {"source": "HN", "url": "https://news.ycombinator.com/rss"},
                {"source": "Lobsters", "url": "https://lobste.rs/rss"}
            ]}"#,
        );

        let config = Config::read_or_create(&path).unwrap();

        assert_eq!(config.rss_feeds.len(), 2);
        assert_eq!(config.rss_feeds[1], FeedDescriptor::new("Lobsters", "https://lobste.rs/rss"));
        assert_eq!(config.refresh_interval(), Duration::from_secs(900));
        config.validate().unwrap();
    }

    #[test]
    fn test_db_path_is_not_serialized() {
        let config = Config {
            db_path: PathBuf::from("/somewhere/data.db"),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("db_path"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "{ not json");
        let err = Config::read_or_create(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (DB_PATH_VAR, "/tmp/other.db"),
            (REFRESH_VAR, " 60 "),
        ]);
        let mut config = Config::default();

        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.refresh_interval_secs, 60);
    }

    #[test]
    fn test_bad_refresh_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == REFRESH_VAR).then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            rss_feeds: vec![FeedDescriptor::new("Broken", "not a url")],
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            refresh_interval_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
