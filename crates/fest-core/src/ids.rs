//! Time-based identifiers.
//!
//! Ids are the decimal millisecond clock, bumped by one whenever two ids
//! would collide within the same process. They sort chronologically when
//! compared as numbers, and as strings while the clock keeps 13 digits.
//! Uniqueness across processes is not guaranteed.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::time::epoch_millis;

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Generate a new monotonic time-based id.
pub fn time_id() -> String {
    next_id_from(epoch_millis()).to_string()
}

fn next_id_from(now_millis: u64) -> u64 {
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now_millis.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}
