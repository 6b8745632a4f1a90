//! fest-content — content synchronization layer for the festival site.
//!
//! Sits between the pages and admin endpoints on one side and the
//! document store on the other:
//!
//! - [`ContentCache`]: process-local TTL cache, cleared on every write
//!   and every observed remote change.
//! - [`ContentService`]: typed read-through accessors that degrade to
//!   absent on failure, and partial-update writers that stamp
//!   `updated_at` and append to the version log.
//! - [`LiveBinding`]: a cancellable subscription that keeps one document
//!   fresh as other sessions write it.
//! - [`RegistrationDesk`]: attendee sign-ups behind the duplicate gate,
//!   plus CSV export in [`export`].

pub mod cache;
pub mod defaults;
pub mod error;
pub mod export;
pub mod kind;
pub mod live;
pub mod ordering;
pub mod registrations;
pub mod service;

pub use cache::ContentCache;
pub use error::{ContentError, ContentResult};
pub use kind::{ContentKind, ListEntry};
pub use live::{BindingState, LiveBinding};
pub use ordering::Direction;
pub use registrations::{RegistrationDesk, RegistrationForm, SubmitOutcome};
pub use service::ContentService;
