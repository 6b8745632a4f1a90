//! Alert email composition.

use askama::Template;

use crate::error::{MonitorError, MonitorResult};
use crate::stats::{RegistrationStats, format_time};

#[derive(Template)]
#[template(path = "alert.html")]
struct AlertTemplate<'a> {
    site_name: &'a str,
    window_label: String,
    current_time: String,
    total_registrations: u64,
    last_time: String,
    since_last: String,
    /// More than two hours without a sign-up.
    overdue: bool,
    last_name: &'a str,
    last_email: &'a str,
    dashboard_url: &'a str,
}

/// Subject and HTML body of a no-registrations alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEmail {
    pub subject: String,
    pub html: String,
}

impl AlertEmail {
    pub fn compose(
        stats: &RegistrationStats,
        site_name: &str,
        dashboard_url: Option<&str>,
    ) -> MonitorResult<Self> {
        let hours = stats.hours_since_last();
        let last = stats.last_registration.as_ref();

        let template = AlertTemplate {
            site_name,
            window_label: match stats.window_hours {
                1 => "hour".to_string(),
                h => format!("{h} hours"),
            },
            current_time: format_time(stats.now),
            total_registrations: stats.total_registrations,
            last_time: last
                .map(|r| format_time(r.timestamp))
                .unwrap_or_else(|| "No registrations yet".to_string()),
            since_last: match hours {
                Some(h) if h > 0 => format!("{h} hours ago"),
                _ => "N/A".to_string(),
            },
            overdue: hours.is_some_and(|h| h > 2),
            last_name: last.map(|r| r.name.as_str()).unwrap_or_default(),
            last_email: last.map(|r| r.email.as_str()).unwrap_or_default(),
            dashboard_url: dashboard_url.unwrap_or_default(),
        };
        let html = template
            .render()
            .map_err(|e| MonitorError::Render(e.to_string()))?;

        Ok(Self {
            subject: subject_line(hours),
            html,
        })
    }
}

/// `hours` below one reads as `1h`.
pub fn subject_line(hours: Option<u64>) -> String {
    let hours = hours.filter(|h| *h > 0).unwrap_or(1);
    format!("Registration Alert: No New Sign-ups ({hours}h since last)")
}
