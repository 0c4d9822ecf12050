//! Configuration management for tview.
//!
//! Loads configuration from ${TVIEW_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable that overrides the configured server URL.
pub const SERVER_URL_ENV: &str = "TVIEW_SERVER_URL";

pub mod paths {
    //! Path resolution for tview configuration and data directories.
    //!
    //! TVIEW_HOME resolution order:
    //! 1. TVIEW_HOME environment variable (if set)
    //! 2. ~/.config/tview (default)

    use std::path::PathBuf;

    /// Returns the tview home directory.
    pub fn tview_home() -> PathBuf {
        if let Ok(home) = std::env::var("TVIEW_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tview")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tview_home().join("config.toml")
    }

    /// Returns the directory operator logs are written to.
    pub fn logs_dir() -> PathBuf {
        tview_home().join("logs")
    }

    /// Default location for exported PDFs.
    pub fn downloads_dir() -> PathBuf {
        tview_home().join("downloads")
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the thread server.
    pub server_url: String,
    /// Where exported PDFs are written. Defaults to `$TVIEW_HOME/downloads`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Client tag sent with new threads and ingest jobs.
    pub client_slug: String,
    /// Source tag sent with new threads.
    pub source_slug: String,
    /// Open the printable view in the system browser when export falls back.
    pub open_print_view: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Self::DEFAULT_SERVER_URL.to_string(),
            download_dir: None,
            client_slug: Self::DEFAULT_CLIENT_SLUG.to_string(),
            source_slug: String::new(),
            open_print_view: true,
        }
    }
}

impl Config {
    pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
    const DEFAULT_CLIENT_SLUG: &str = "default";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            toml::to_string(&Config::default()).context("Failed to serialize default config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Effective download directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(paths::downloads_dir)
    }

    /// Resolves the server URL: flag, then `TVIEW_SERVER_URL`, then config.
    pub fn resolve_server_url(&self, flag: Option<&str>) -> Result<Url> {
        let env = std::env::var(SERVER_URL_ENV).ok();
        resolve_server_url(flag, env.as_deref(), &self.server_url)
    }
}

fn resolve_server_url(flag: Option<&str>, env: Option<&str>, configured: &str) -> Result<Url> {
    let raw = [flag, env, Some(configured)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(Config::DEFAULT_SERVER_URL);

    Url::parse(raw).with_context(|| format!("Invalid server URL: {raw}"))
}
