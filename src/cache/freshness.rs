//! Time-based staleness policy
//!
//! An entry is fresh while `modified + ttl > now`. A zero TTL is always stale.

use chrono::{DateTime, Duration, Utc};

/// Default freshness window in seconds
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Returns whether an entry last written at `modified` is still fresh at `now`
pub fn is_fresh(modified: DateTime<Utc>, ttl_secs: u64, now: DateTime<Utc>) -> bool {
    let ttl = Duration::try_seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
        .unwrap_or(Duration::MAX);
    match modified.checked_add_signed(ttl) {
        Some(expires_at) => expires_at > now,
        // Past the representable range: treat as never expiring
        None => true,
    }
}

/// Age of an entry at `now`, clamped at zero for timestamps in the future
pub fn age(modified: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - modified).max(Duration::zero())
}
