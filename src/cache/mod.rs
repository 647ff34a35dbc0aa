//! Cache subsystems sharing one store
//!
//! The resource cache keeps local copies of remote files; the response cache
//! keeps caller-supplied payloads under a (method, slug) key, with a
//! name/value flavour on top. All of them read and write the same flat store
//! and use the same time-based staleness rule. Public operations never fail:
//! on any error they fall back to the original reference or to "absent".

pub mod freshness;
pub mod key;
mod resource;
mod response;
pub mod store;

use std::sync::Arc;

pub use key::CacheKey;
pub use resource::{ResourceCache, Resolution};
pub use response::{ResponseCache, ValueCache, VALUE_METHOD};
pub use store::{FsStore, MemoryStore, Store, StoreError};

use crate::config::CacheConfig;
use crate::fetch::{Credentials, Fetch, FetchError, HttpFetcher};

/// Entry point bundling the resource, response and value caches
pub struct UrlCache<S = FsStore, F = HttpFetcher> {
    resources: ResourceCache<S, F>,
    responses: ResponseCache<S>,
    values: ValueCache<S>,
}

impl UrlCache<FsStore, HttpFetcher> {
    /// Filesystem-backed cache with the reqwest fetcher, both built from `config`
    pub fn from_config(config: CacheConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config)?;
        let store = FsStore::new(config.cache_dir.clone());
        Ok(Self::new(store, fetcher, config))
    }
}

impl<S: Store, F: Fetch> UrlCache<S, F> {
    pub fn new(store: S, fetcher: F, config: CacheConfig) -> Self {
        let store = Arc::new(store);
        let config = Arc::new(config);
        let responses = ResponseCache::new(Arc::clone(&store), Arc::clone(&config));
        Self {
            resources: ResourceCache::new(store, fetcher, config),
            values: ValueCache::new(responses.clone()),
            responses,
        }
    }

    pub fn resources(&self) -> &ResourceCache<S, F> {
        &self.resources
    }

    pub fn responses(&self) -> &ResponseCache<S> {
        &self.responses
    }

    pub fn values(&self) -> &ValueCache<S> {
        &self.values
    }

    /// Reference to a local copy of `url`, or `url` itself; `None` for an empty URL
    pub async fn resolve(
        &self,
        url: &str,
        username: Option<&str>,
        password: Option<&str>,
        ttl_secs: Option<u64>,
    ) -> Option<String> {
        let credentials = Credentials::from_parts(username, password);
        self.resources
            .resolve(url, credentials.as_ref(), ttl_secs)
            .await
    }

    pub fn get_response(
        &self,
        method: &str,
        slug: &str,
        ttl_secs: Option<u64>,
        allow_stale: bool,
    ) -> Option<Vec<u8>> {
        self.responses.get(method, slug, ttl_secs, allow_stale)
    }

    pub fn put_response(&self, method: &str, slug: &str, payload: &[u8]) {
        self.responses.put(method, slug, payload);
    }

    pub fn get_value(&self, name: &str, ttl_secs: Option<u64>) -> Option<Vec<u8>> {
        self.values.get(name, ttl_secs)
    }

    pub fn put_value(&self, name: &str, value: &[u8]) {
        self.values.set(name, value);
    }
}
