//! Settings for the fwscope binary
//!
//! Values come from `~/.fwscope/config.toml` (or `--config`), overridden by
//! command-line flags. The bearer token falls back to `FWSCOPE_TOKEN`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use fwscope_client::ClientConfig;
use fwscope_logs::DEFAULT_FETCH_CEILING;
use fwscope_types::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MIN_PAGE_LIMIT};

/// Environment variable consulted when no token is configured
pub const TOKEN_ENV: &str = "FWSCOPE_TOKEN";

/// Problems loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("page size must be between 1 and 1000, got {0}")]
    PageSize(usize),

    #[error("fetch ceiling must be between 1 and 1000, got {0}")]
    FetchCeiling(usize),
}

/// Contents of the config file; every field is optional
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<usize>,
    pub fetch_ceiling: Option<usize>,
    pub export_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".fwscope").join("config.toml"))
    }

    /// Load `explicit`, or the default file when none was given.
    ///
    /// A missing default file yields empty settings; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<usize>,
    pub fetch_ceiling: Option<usize>,
    pub export_dir: Option<PathBuf>,
}

/// Fully resolved settings
#[derive(Debug)]
pub struct Settings {
    pub client: ClientConfig,
    pub page_size: usize,
    pub fetch_ceiling: usize,
    pub export_dir: PathBuf,
}

impl Settings {
    /// Merge flags over the file; `env_token` is used only when neither sets one
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        env_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = ClientConfig::default();

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or(defaults.base_url);
        let timeout = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(defaults.timeout);
        let token = overrides
            .token
            .or(file.token)
            .or(env_token)
            .filter(|t| !t.trim().is_empty());

        let page_size = overrides
            .page_size
            .or(file.page_size)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&page_size) {
            return Err(ConfigError::PageSize(page_size));
        }

        let fetch_ceiling = overrides
            .fetch_ceiling
            .or(file.fetch_ceiling)
            .unwrap_or(DEFAULT_FETCH_CEILING);
        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&fetch_ceiling) {
            return Err(ConfigError::FetchCeiling(fetch_ceiling));
        }

        let export_dir = overrides
            .export_dir
            .or(file.export_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut client = ClientConfig::new(base_url).with_timeout(timeout);
        if let Some(token) = token {
            client = client.with_token(token);
        }

        Ok(Self {
            client,
            page_size,
            fetch_ceiling,
            export_dir,
        })
    }
}
