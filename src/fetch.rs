//! Fetching remote resources
//!
//! The resource cache only needs "give me the bytes behind this URL, or tell
//! me you couldn't". `HttpFetcher` is the reqwest-backed implementation with
//! short timeouts and an identifying user agent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use thiserror::Error;

use crate::config::CacheConfig;

/// Errors that can occur while fetching a remote resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// Building the HTTP client failed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure, including timeouts
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Basic-auth credentials passed through to the fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Builds credentials from optional CLI-style parts
    ///
    /// A password without a username is ignored.
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        match username {
            Some(user) if !user.is_empty() => Some(Self::new(user, password.map(str::to_string))),
            _ => None,
        }
    }
}

/// Capability to retrieve the bytes behind a remote identifier
///
/// An empty `Ok` payload means the transfer succeeded with no content, which
/// is distinct from a failure.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, credentials: Option<&Credentials>)
        -> Result<Vec<u8>, FetchError>;
}

fn client_builder(config: &CacheConfig) -> ClientBuilder {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.timeout_secs))
}

/// HTTP(S) fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the timeouts and user agent from `config`
    pub fn new(config: &CacheConfig) -> Result<Self, FetchError> {
        let client = client_builder(config).build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Create a fetcher with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<u8>, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let mut request = self.client.get(url);
        if let Some(creds) = credentials {
            request = request.basic_auth(&creds.username, creds.password.as_ref());
        }

        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        tracing::debug!(url, bytes = body.len(), "fetched remote resource");
        Ok(body.to_vec())
    }
}
