//! Resource cache: local copies of remote files
//!
//! Given a URL, returns a reference to a locally stored copy, fetching and
//! storing it only when no fresh copy exists. Every failure degrades to
//! either a stale local copy or the original URL; nothing is raised to the
//! caller.

use chrono::Utc;
use std::sync::Arc;

use super::freshness::{age, is_fresh};
use super::key::{CacheKey, KeyError};
use super::store::{Store, StoreError};
use crate::config::CacheConfig;
use crate::fetch::{Credentials, Fetch, FetchError};

/// How a resolution was answered, with the reference handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A fresh local copy already existed; no fetch happened
    Fresh(String),
    /// The resource was fetched and stored just now
    Fetched(String),
    /// Refresh failed; an older local copy is served instead
    Stale(String),
    /// Nothing cacheable or nothing stored; the original URL is returned
    Bypassed(String),
}

impl Resolution {
    /// The reference to hand to the caller
    pub fn reference(&self) -> &str {
        match self {
            Self::Fresh(r) | Self::Fetched(r) | Self::Stale(r) | Self::Bypassed(r) => r,
        }
    }

    pub fn into_reference(self) -> String {
        match self {
            Self::Fresh(r) | Self::Fetched(r) | Self::Stale(r) | Self::Bypassed(r) => r,
        }
    }

    /// Whether the reference points at a local copy
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Bypassed(_))
    }
}

/// Why a refresh attempt left nothing new in the store
#[derive(Debug, thiserror::Error)]
enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("remote returned an empty payload")]
    EmptyPayload,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Write-through cache of remote resources
pub struct ResourceCache<S, F> {
    store: Arc<S>,
    fetcher: F,
    config: Arc<CacheConfig>,
}

impl<S: Store, F: Fetch> ResourceCache<S, F> {
    pub fn new(store: Arc<S>, fetcher: F, config: Arc<CacheConfig>) -> Self {
        Self {
            store,
            fetcher,
            config,
        }
    }

    /// The store backing this cache
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The fetcher used on misses
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Public reference for a cache key, with the key percent-encoded
    pub fn reference_for(&self, key: &CacheKey) -> String {
        self.config.reference_for(&key.as_store_key())
    }

    /// Returns a reference to a local copy of `url`, or `url` itself
    ///
    /// An empty `url` yields `None`. `ttl_secs` falls back to the configured
    /// default when not given.
    pub async fn resolve(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        ttl_secs: Option<u64>,
    ) -> Option<String> {
        self.resolve_detailed(url, credentials, ttl_secs)
            .await
            .map(Resolution::into_reference)
    }

    /// Like [`resolve`](Self::resolve), reporting how the answer was reached
    pub async fn resolve_detailed(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        ttl_secs: Option<u64>,
    ) -> Option<Resolution> {
        let key = match CacheKey::derive(url) {
            Ok(key) => key,
            Err(KeyError::Empty) => return None,
            Err(e) => {
                tracing::debug!(url, error = %e, "not caching resource");
                return Some(Resolution::Bypassed(url.to_string()));
            }
        };
        let store_key = key.as_store_key();
        let ttl = ttl_secs.unwrap_or(self.config.default_ttl_secs);

        if self.is_fresh(&store_key, ttl) {
            tracing::debug!(url, key = %store_key, "serving fresh cached resource");
            return Some(Resolution::Fresh(self.reference_for(&key)));
        }

        let refreshed = self.refresh(url, &store_key, credentials).await;
        if let Err(e) = &refreshed {
            tracing::warn!(url, key = %store_key, error = %e, "failed to refresh cached resource");
        }

        // Freshness is not re-checked: whatever is stored now is the best available copy
        let resolution = match (refreshed, self.store.exists(&store_key)) {
            (Ok(()), true) => Resolution::Fetched(self.reference_for(&key)),
            (Err(_), true) => Resolution::Stale(self.reference_for(&key)),
            (_, false) => Resolution::Bypassed(url.to_string()),
        };
        Some(resolution)
    }

    fn is_fresh(&self, store_key: &str, ttl_secs: u64) -> bool {
        if !self.store.exists(store_key) {
            return false;
        }
        match self.store.modified(store_key) {
            Ok(modified) => {
                let now = Utc::now();
                let fresh = is_fresh(modified, ttl_secs, now);
                if !fresh {
                    tracing::debug!(
                        key = store_key,
                        age_secs = age(modified, now).num_seconds(),
                        "cached resource is stale"
                    );
                }
                fresh
            }
            Err(e) => {
                tracing::warn!(key = store_key, error = %e, "failed to read entry timestamp");
                false
            }
        }
    }

    async fn refresh(
        &self,
        url: &str,
        store_key: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), RefreshError> {
        let payload = self.fetcher.fetch(url, credentials).await?;
        if payload.is_empty() {
            return Err(RefreshError::EmptyPayload);
        }
        self.store.write(store_key, &payload)?;
        Ok(())
    }
}
