//! fest-auth — admin authentication for the festival site.
//!
//! An [`AuthProvider`] owns accounts and passwords; [`AuthService`]
//! layers the admin allow-list, session tokens and the one-time setup
//! flow on top. Errors render as messages fit to show the person at the
//! sign-in form.

pub mod error;
pub mod password;
pub mod provider;
pub mod service;

pub use error::{AuthError, AuthResult};
pub use provider::{AuthProvider, Identity, LocalAuthProvider, ResetTicket};
pub use service::{AuthService, SignedIn};
