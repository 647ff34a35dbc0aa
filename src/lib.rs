//! urlcache library
//!
//! A write-through, time-bounded local cache for remote resources, plus a
//! keyed cache for opaque response payloads sharing the same store.

pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;

pub use cache::{Resolution, UrlCache};
pub use config::CacheConfig;
pub use fetch::{Credentials, Fetch, FetchError, HttpFetcher};
