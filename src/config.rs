use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-pulse.toml.
///
/// All fields are optional; env vars fill the gaps and CLI flags override
/// everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub credentials and repository coordinates
    #[serde(default)]
    pub github: GitHubConfig,

    /// Detail-fetch throttling
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Snapshot persistence
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// Repository owner. If None, falls back to GITHUB_REPO_OWNER.
    pub owner: Option<String>,
    /// Repository name. If None, falls back to GITHUB_REPO_NAME.
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// How many detail fetches are issued together in one batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches, in milliseconds
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pause_ms: default_pause_ms(),
        }
    }
}

impl FetchConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// File holding the previous run's records per user
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_batch_size() -> usize {
    3
}

fn default_pause_ms() -> u64 {
    100
}

fn default_history_path() -> PathBuf {
    PathBuf::from(".pr-pulse-history.json")
}

impl Config {
    /// Load configuration from .pr-pulse.toml in the current directory.
    /// Returns default config if the file doesn't exist, then applies
    /// env-var fallbacks for the GitHub fields.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-pulse.toml");
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.github.token.is_none() {
            config.github.token = std::env::var("GITHUB_TOKEN").ok();
        }
        if config.github.owner.is_none() {
            config.github.owner = std::env::var("GITHUB_REPO_OWNER").ok();
        }
        if config.github.repo.is_none() {
            config.github.repo = std::env::var("GITHUB_REPO_NAME").ok();
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
