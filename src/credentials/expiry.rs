//! Token expiry policy.

/// Refresh this long before the recorded expiry (60 minutes).
pub const EXPIRY_BUFFER_MS: i64 = 60 * 60 * 1000;

/// Whether a token expiring at `expires_at` should be treated as expired at
/// `now`. Both values are milliseconds since the Unix epoch.
pub fn is_expired(expires_at: i64, now: i64) -> bool {
    now >= expires_at.saturating_sub(EXPIRY_BUFFER_MS)
}
