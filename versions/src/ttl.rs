use std::time::{SystemTime, UNIX_EPOCH};

/// Cached version lists older than this are re-fetched on lookup.
pub const TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Whether an entry written at `updated_at` may still be served at `now`.
pub fn is_fresh(updated_at: u64, now: u64) -> bool {
    is_fresh_at(updated_at, now, TTL_SECS)
}

pub fn is_fresh_at(updated_at: u64, now: u64, ttl_secs: u64) -> bool {
    now.saturating_sub(updated_at) < ttl_secs
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_boundary() {
        let now = 2_000_000_000;

        // One second inside the window is still fresh
        assert!(is_fresh(now - (TTL_SECS - 1), now));

        // Exactly the window is stale
        assert!(!is_fresh(now - TTL_SECS, now));
        assert!(!is_fresh(now - TTL_SECS - 1, now));
    }

    #[test]
    fn test_clock_skew_does_not_underflow() {
        // An entry stamped in the future stays fresh rather than wrapping
        assert!(is_fresh(100, 50));
    }

    #[test]
    fn test_custom_ttl() {
        assert!(is_fresh_at(90, 99, 10));
        assert!(!is_fresh_at(90, 100, 10));
    }
}
