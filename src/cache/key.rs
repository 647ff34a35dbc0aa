//! Cache key derivation
//!
//! Resource entries are named `<md5 hex>.<extension>` after the remote URL;
//! response entries are named `rest--<method>--<slug>`. Both live in the same
//! flat store namespace.

use std::fmt;

use md5::{Digest, Md5};
use thiserror::Error;

/// Prefix shared by every response entry key
pub const RESPONSE_PREFIX: &str = "rest";

/// Separator between the parts of a response entry key
pub const RESPONSE_SEPARATOR: &str = "--";

/// Reasons a remote identifier cannot be turned into a cache key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The identifier was empty
    #[error("empty identifier")]
    Empty,

    /// The identifier has no usable file extension
    #[error("no file extension in '{0}'")]
    NoExtension(String),
}

/// Store key for a cached remote resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: String,
    extension: String,
}

impl CacheKey {
    /// Derives the key for a remote identifier
    ///
    /// The same identifier always produces the same key. Identifiers without
    /// an extension are not cacheable.
    pub fn derive(remote: &str) -> Result<Self, KeyError> {
        if remote.is_empty() {
            return Err(KeyError::Empty);
        }

        let extension =
            extension(remote).ok_or_else(|| KeyError::NoExtension(remote.to_string()))?;

        Ok(Self {
            hash: digest_hex(remote),
            extension: extension.to_string(),
        })
    }

    /// Hex digest part of the key
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Extension part of the key, without the leading dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Full store key, `<hash>.<extension>`
    pub fn as_store_key(&self) -> String {
        format!("{}.{}", self.hash, self.extension)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hash, self.extension)
    }
}

/// Renders the 128-bit MD5 digest of `input` as 32 lowercase hex characters
pub fn digest_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Returns the text after the last `.` of `remote`
///
/// Yields `None` when there is no dot, nothing follows it, or the text would
/// span a path separator (the last dot is then in a host or directory name).
pub fn extension(remote: &str) -> Option<&str> {
    let (_, ext) = remote.rsplit_once('.')?;
    if ext.is_empty() || ext.contains(['/', '\\']) {
        return None;
    }
    Some(ext)
}

/// Builds the store key for a response entry
///
/// Returns `None` when either part is empty. The separator is not escaped,
/// so `("a", "b--c")` and `("a--b", "c")` share a key.
pub fn response_key(method: &str, slug: &str) -> Option<String> {
    if method.is_empty() || slug.is_empty() {
        return None;
    }
    Some(format!(
        "{RESPONSE_PREFIX}{RESPONSE_SEPARATOR}{method}{RESPONSE_SEPARATOR}{slug}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_matches_known_md5() {
        assert_eq!(digest_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            digest_hex("The quick brown fox jumps over the lazy dog"),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn test_derive_is_deterministic() {
        let url = "https://example.com/logo.png";
        let first = CacheKey::derive(url).unwrap();
        let second = CacheKey::derive(url).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_store_key(), second.as_store_key());
    }

    #[test]
    fn test_derive_layout() {
        let url = "https://example.com/logo.png";
        let key = CacheKey::derive(url).unwrap();
        assert_eq!(key.hash().len(), 32);
        assert_eq!(key.hash(), digest_hex(url));
        assert_eq!(key.extension(), "png");
        assert_eq!(key.as_store_key(), format!("{}.png", digest_hex(url)));
        assert_eq!(key.to_string(), key.as_store_key());
    }

    #[test]
    fn test_different_urls_get_different_keys() {
        let a = CacheKey::derive("https://example.com/a.png").unwrap();
        let b = CacheKey::derive("https://example.com/b.png").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(extension("https://cdn.example.com/archive.tar.gz"), Some("gz"));
        assert_eq!(extension("photo.jpeg"), Some("jpeg"));
    }

    #[test]
    fn test_extension_absent() {
        assert_eq!(extension("no-dot-here"), None);
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension("https://example.com/page"), None);
        assert_eq!(extension("https://example.com/"), None);
    }

    #[test]
    fn test_derive_rejects_uncacheable() {
        assert_eq!(CacheKey::derive(""), Err(KeyError::Empty));
        assert!(matches!(
            CacheKey::derive("https://example.com/page"),
            Err(KeyError::NoExtension(_))
        ));
    }

    #[test]
    fn test_response_key_layout() {
        assert_eq!(
            response_key("posts", "latest").as_deref(),
            Some("rest--posts--latest")
        );
    }

    #[test]
    fn test_response_key_requires_both_parts() {
        assert!(response_key("", "slug").is_none());
        assert!(response_key("method", "").is_none());
    }

    #[test]
    fn test_response_key_separator_aliases() {
        assert_eq!(response_key("a", "b--c"), response_key("a--b", "c"));
    }
}
