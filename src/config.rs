use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub const DEFAULT_FEED_TITLE: &str = "Последние новости";
pub const DEFAULT_FEED_LINK: &str = "http://php3.loc/news/news.php";

const CONFIG_ENV: &str = "NEWSDESK_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_feed_path")]
    pub feed_path: PathBuf,

    #[serde(default = "default_error_log_path")]
    pub error_log_path: PathBuf,

    #[serde(default = "default_feed_title")]
    pub feed_title: String,

    #[serde(default = "default_feed_link")]
    pub feed_link: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("news.db")
}

fn default_feed_path() -> PathBuf {
    PathBuf::from("rss.xml")
}

fn default_error_log_path() -> PathBuf {
    PathBuf::from("logs").join("sql_errors.log")
}

fn default_feed_title() -> String {
    DEFAULT_FEED_TITLE.to_string()
}

fn default_feed_link() -> String {
    DEFAULT_FEED_LINK.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            feed_path: default_feed_path(),
            error_log_path: default_error_log_path(),
            feed_title: default_feed_title(),
            feed_link: default_feed_link(),
        }
    }
}

impl Config {
    /// Configuration rooted in `dir`: database, feed and error log all live
    /// under it.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            db_path: dir.join(default_db_path()),
            feed_path: dir.join(default_feed_path()),
            error_log_path: dir.join(default_error_log_path()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsdesk")
            .join("config.toml")
    }
}
