//! Cache configuration
//!
//! Everything the host supplies to the caches: where entries live, how they
//! are referenced publicly, how long they stay fresh and how the fetcher
//! identifies itself. Values come from defaults, an optional JSON file, and
//! CLI overrides applied by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::freshness::DEFAULT_TTL_SECS;

/// Default connect timeout for remote fetches, in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default total transfer timeout for remote fetches, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No platform config directory could be determined
    #[error("failed to determine project directories")]
    NoProjectDirs,
}

/// Configuration shared by the resource and response caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory where cache entries are stored
    pub cache_dir: PathBuf,
    /// Public base that store keys are appended to when building references;
    /// empty means a `file://` URL of `cache_dir`
    pub base_url: String,
    /// Freshness window used when a call does not supply one
    pub default_ttl_secs: u64,
    /// User agent sent by the HTTP fetcher
    pub user_agent: String,
    /// Connect timeout for remote fetches
    pub connect_timeout_secs: u64,
    /// Total timeout for remote fetches
    pub timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let cache_dir = project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("cache"));
        Self::with_dir(cache_dir)
    }
}

impl CacheConfig {
    /// Default configuration rooted at `cache_dir`, referenced via `file://`
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            base_url: String::new(),
            default_ttl_secs: DEFAULT_TTL_SECS,
            user_agent: default_user_agent(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the public base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the default freshness window
    pub fn with_default_ttl(mut self, ttl_secs: u64) -> Self {
        self.default_ttl_secs = ttl_secs;
        self
    }

    /// Loads configuration from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the platform config file if present, otherwise defaults
    pub fn load_or_default() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Platform-specific configuration file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dirs = project_dirs().ok_or(ConfigError::NoProjectDirs)?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// Public reference for the entry stored under `store_key`
    ///
    /// The key is appended as one percent-encoded path segment, so `?`, `#`
    /// and spaces in either the directory or the key stay part of the path.
    pub fn reference_for(&self, store_key: &str) -> String {
        let base = if self.base_url.is_empty() {
            file_url(&self.cache_dir)
        } else {
            Url::parse(&self.base_url).ok()
        };

        let encoded = base.and_then(|mut url| {
            url.path_segments_mut().ok()?.pop_if_empty().push(store_key);
            Some(String::from(url))
        });

        encoded.unwrap_or_else(|| {
            if self.base_url.is_empty() {
                format!("file://{}/{}", self.cache_dir.display(), store_key)
            } else {
                format!("{}/{}", self.base_url.trim_end_matches('/'), store_key)
            }
        })
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "urlcache")
}

fn default_user_agent() -> String {
    format!("urlcache/{}", env!("CARGO_PKG_VERSION"))
}

fn file_url(dir: &Path) -> Option<Url> {
    let absolute = std::path::absolute(dir).ok()?;
    Url::from_directory_path(absolute).ok()
}
