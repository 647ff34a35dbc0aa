//! Command-line interface parsing for urlcache
//!
//! This module handles parsing of CLI arguments using clap and turning the
//! global flags into a `CacheConfig`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{CacheConfig, ConfigError};

/// Error types for CLI startup
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP fetcher could not be built
    #[error(transparent)]
    Fetch(#[from] crate::fetch::FetchError),

    /// Writing output failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// urlcache - cache remote resources and keyed responses on local disk
#[derive(Parser, Debug)]
#[command(name = "urlcache")]
#[command(about = "Write-through local cache for remote resources and keyed responses")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file (defaults to the platform config path)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory where cache entries are stored
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Public base URL that cache keys are appended to
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Freshness window in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub ttl: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Cache operations
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a reference to a local copy of URL (or URL itself on failure)
    Resolve {
        url: String,
        /// Basic-auth user name for the remote fetch
        #[arg(long)]
        username: Option<String>,
        /// Basic-auth password for the remote fetch
        #[arg(long, requires = "username")]
        password: Option<String>,
    },
    /// Write the payload stored under METHOD/SLUG to stdout
    GetResponse {
        method: String,
        slug: String,
        /// Return the payload even if it is stale
        #[arg(long)]
        allow_stale: bool,
    },
    /// Store PAYLOAD under METHOD/SLUG
    PutResponse {
        method: String,
        slug: String,
        payload: String,
    },
    /// Write the value stored under NAME to stdout
    GetValue { name: String },
    /// Store VALUE under NAME
    PutValue { name: String, value: String },
    /// Print the cache key derived for URL
    Key { url: String },
}

impl Cli {
    /// Builds the effective configuration: file (or platform default), then flags
    pub fn load_config(&self) -> Result<CacheConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => CacheConfig::load(path)?,
            None => CacheConfig::load_or_default(),
        };

        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(ttl) = self.ttl {
            config.default_ttl_secs = ttl;
        }
        Ok(config)
    }
}
