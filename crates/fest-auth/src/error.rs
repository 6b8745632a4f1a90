//! Authentication errors.
//!
//! `Display` is the message shown to the person signing in. Provider
//! internals never reach it; `Internal` keeps its detail for logs only.

use fest_content::ContentError;
use fest_state::StateError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No account found with this email.")]
    UserNotFound,

    #[error("Incorrect password.")]
    WrongPassword,

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Too many failed attempts. Please try again later.")]
    TooManyAttempts,

    #[error("An account with this email already exists.")]
    EmailInUse,

    #[error("Password should be at least 6 characters.")]
    WeakPassword,

    #[error("Access denied. Admin privileges required.")]
    NotAdmin,

    #[error("Your session has expired. Please sign in again.")]
    InvalidSession,

    #[error("This password reset link is invalid or has expired.")]
    InvalidResetToken,

    #[error("Setup has already been completed.")]
    SetupClosed,

    #[error("Something went wrong. Please try again.")]
    Internal(String),
}

impl AuthError {
    /// Detail for logs; for most variants the user message itself.
    pub fn detail(&self) -> String {
        match self {
            AuthError::Internal(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<StateError> for AuthError {
    fn from(e: StateError) -> Self {
        AuthError::Internal(e.to_string())
    }
}

impl From<ContentError> for AuthError {
    fn from(e: ContentError) -> Self {
        AuthError::Internal(e.to_string())
    }
}
