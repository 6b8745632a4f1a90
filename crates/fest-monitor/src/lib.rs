//! fest-monitor — registration monitoring for the festival site.
//!
//! Watches the sign-up rate and emails an alert when the trailing window
//! (one hour by default) produced no new registrations.
//!
//! # Architecture
//!
//! ```text
//! RegistrationMonitor
//!   ├── RegistrationStats::collect()  → counts from the StateStore
//!   ├── AlertEmail::compose()         → subject + HTML body
//!   ├── Mailer (trait)                → HttpMailer posts to the mail API
//!   └── spawn_periodic()              → interval loop with watch shutdown
//! ```
//!
//! The HTTP cron endpoint and `festd check-registrations` run a single
//! [`RegistrationMonitor::check`]; the daemon can also run it on an
//! interval.

pub mod alert;
pub mod error;
pub mod mailer;
pub mod monitor;
pub mod stats;

pub use alert::AlertEmail;
pub use error::{MailError, MonitorError, MonitorResult};
pub use mailer::{HttpMailer, Mailer, OutboundEmail};
pub use monitor::{CheckStatus, CronAccess, MonitorReport, RegistrationMonitor};
pub use stats::{RegistrationStats, StatsView};
