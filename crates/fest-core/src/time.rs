//! Wall-clock helpers. All persisted timestamps are unix seconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current unix time in milliseconds.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Seconds in one hour.
pub const HOUR_SECS: u64 = 60 * 60;
