//! Error types for monitoring and mail delivery.

use fest_state::StateError;
use thiserror::Error;

pub type MonitorResult<T> = Result<T, MonitorError>;

/// Failure delivering an alert through the mail provider.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("unreadable mail provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("failed to send alert email: {0}")]
    Mail(#[from] MailError),

    #[error("alert email could not be rendered: {0}")]
    Render(String),

    #[error("monitoring is not configured: {0}")]
    NotConfigured(&'static str),
}
