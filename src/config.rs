//! Configuration loader and validator for the daily verse service.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub content: Content,
    #[serde(default)]
    pub daily: Daily,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Locations of the read-only JSON corpora.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    pub verses_path: String,
    pub shlokas_path: String,
}

/// Item-of-the-day behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Daily {
    /// Local hour at which the logical day rolls over.
    #[serde(default = "default_boundary_hour")]
    pub boundary_hour: u32,
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for Daily {
    fn default() -> Self {
        Self {
            boundary_hour: default_boundary_hour(),
            notifications: true,
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_boundary_hour() -> u32 {
    6
}

fn default_true() -> bool {
    true
}

fn default_preview_chars() -> usize {
    120
}

impl App {
    /// Data directory with a leading `~/` expanded against `$HOME`.
    pub fn resolved_data_dir(&self) -> String {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => match std::env::var("HOME") {
                Ok(home) => format!("{}/{}", home.trim_end_matches('/'), rest),
                Err(_) => self.data_dir.clone(),
            },
            None => self.data_dir.clone(),
        }
    }
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.app.resolved_data_dir())
    }

    /// Default SQLite location inside the data directory.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}/gita.db", self.app.resolved_data_dir())
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.content.verses_path.trim().is_empty() {
        return Err(ConfigError::Invalid("content.verses_path must be non-empty"));
    }
    if cfg.content.shlokas_path.trim().is_empty() {
        return Err(ConfigError::Invalid("content.shlokas_path must be non-empty"));
    }
    if cfg.daily.boundary_hour > 23 {
        return Err(ConfigError::Invalid("daily.boundary_hour must be in 0..=23"));
    }
    if cfg.daily.preview_chars == 0 {
        return Err(ConfigError::Invalid("daily.preview_chars must be > 0"));
    }
    Ok(())
}

/// Returns the reference YAML content.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

content:
  verses_path: "./assets/verses.json"
  shlokas_path: "./assets/shlokas.json"

daily:
  boundary_hour: 6
  notifications: true
  preview_chars: 120
"#
}
