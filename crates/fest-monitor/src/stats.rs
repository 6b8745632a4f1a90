//! Registration statistics for one monitoring check.

use chrono::DateTime;
use serde::Serialize;

use fest_core::time::HOUR_SECS;
use fest_state::{Registration, StateResult, StateStore};

/// Counts gathered at `now` over the trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationStats {
    pub now: u64,
    pub window_hours: u64,
    pub recent_registrations: u64,
    pub total_registrations: u64,
    pub last_registration: Option<Registration>,
}

impl RegistrationStats {
    pub fn collect(store: &StateStore, now: u64, window_hours: u64) -> StateResult<Self> {
        let since = now.saturating_sub(window_hours * HOUR_SECS);
        Ok(Self {
            now,
            window_hours,
            recent_registrations: store.count_registrations_since(since)?,
            total_registrations: store.count_registrations()?,
            last_registration: store.latest_registration()?,
        })
    }

    /// Whole hours since the last registration, if there is one.
    pub fn hours_since_last(&self) -> Option<u64> {
        self.last_registration
            .as_ref()
            .map(|r| self.now.saturating_sub(r.timestamp) / HOUR_SECS)
    }

    /// No sign-ups inside the window.
    pub fn is_quiet(&self) -> bool {
        self.recent_registrations == 0
    }

    pub fn view(&self) -> StatsView {
        StatsView {
            recent_registrations: self.recent_registrations,
            total_registrations: self.total_registrations,
            last_registration: self
                .last_registration
                .as_ref()
                .map(|r| format_time(r.timestamp)),
            hours_since_last: self.hours_since_last(),
        }
    }
}

/// Wire form of the statistics in a monitoring report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub recent_registrations: u64,
    pub total_registrations: u64,
    pub last_registration: Option<String>,
    pub hours_since_last: Option<u64>,
}

/// Long human-readable UTC time, e.g. "Saturday, October 11, 2025 at 17:00 UTC".
pub fn format_time(secs: u64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%A, %B %-d, %Y at %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
