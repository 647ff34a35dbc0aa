//! Keyed response cache and its name/value specialisation
//!
//! Payloads are supplied by the caller and stored under
//! `rest--<method>--<slug>`; nothing is ever fetched. Reads honour the
//! freshness window unless the caller explicitly accepts stale payloads.

use std::sync::Arc;

use chrono::Utc;

use super::freshness::is_fresh;
use super::key::response_key;
use super::store::{Store, StoreError};
use crate::config::CacheConfig;

/// Method name reserved for the name/value cache
pub const VALUE_METHOD: &str = "value";

/// Cache of opaque payloads keyed by a (method, slug) pair
pub struct ResponseCache<S> {
    store: Arc<S>,
    config: Arc<CacheConfig>,
}

impl<S> Clone for ResponseCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: Store> ResponseCache<S> {
    pub fn new(store: Arc<S>, config: Arc<CacheConfig>) -> Self {
        Self { store, config }
    }

    /// Returns the stored payload for `(method, slug)`
    ///
    /// `None` when either part is empty, nothing is stored, or the entry is
    /// older than the TTL and `allow_stale` is not set.
    pub fn get(
        &self,
        method: &str,
        slug: &str,
        ttl_secs: Option<u64>,
        allow_stale: bool,
    ) -> Option<Vec<u8>> {
        let key = response_key(method, slug)?;
        let ttl = ttl_secs.unwrap_or(self.config.default_ttl_secs);

        match self.try_get(&key, ttl, allow_stale) {
            Ok(payload) => payload,
            Err(StoreError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to read cached response");
                None
            }
        }
    }

    /// Stores `payload` under `(method, slug)`, replacing any previous entry
    ///
    /// Empty parts or an empty payload are ignored. Returns whether the
    /// payload was written.
    pub fn put(&self, method: &str, slug: &str, payload: &[u8]) -> bool {
        let Some(key) = response_key(method, slug) else {
            return false;
        };
        if payload.is_empty() {
            return false;
        }

        match self.store.write(&key, payload) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to store response");
                false
            }
        }
    }

    fn try_get(
        &self,
        key: &str,
        ttl_secs: u64,
        allow_stale: bool,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        if !self.store.exists(key) {
            return Ok(None);
        }
        if !allow_stale {
            let modified = self.store.modified(key)?;
            if !is_fresh(modified, ttl_secs, Utc::now()) {
                tracing::debug!(key = %key, "cached response is stale");
                return Ok(None);
            }
        }
        self.store.read(key).map(Some)
    }
}

/// Named values stored through the response cache under [`VALUE_METHOD`]
///
/// An empty value cannot be stored; setting one is a no-op.
pub struct ValueCache<S> {
    responses: ResponseCache<S>,
}

impl<S: Store> ValueCache<S> {
    pub fn new(responses: ResponseCache<S>) -> Self {
        Self { responses }
    }

    /// Fresh value stored under `name`
    pub fn get(&self, name: &str, ttl_secs: Option<u64>) -> Option<Vec<u8>> {
        self.responses.get(VALUE_METHOD, name, ttl_secs, false)
    }

    /// Value stored under `name`, regardless of age
    pub fn get_stale(&self, name: &str) -> Option<Vec<u8>> {
        self.responses.get(VALUE_METHOD, name, None, true)
    }

    pub fn set(&self, name: &str, value: &[u8]) -> bool {
        self.responses.put(VALUE_METHOD, name, value)
    }
}
