//! fest-state — embedded document store for the festival site.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for the six singleton content documents, their version log,
//! attendee registrations, and the admin allow-list.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Content documents are keyed by their fixed id; version records by
//! `{changed_at}:{id}` so a reverse scan yields newest first.
//!
//! Every committed content write is published on a per-document
//! [`feed::ChangeFeed`], the subscription primitive the live-binding layer
//! builds on.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| $crate::error::StateError::$variant(e.to_string())
    };
}

pub mod error;
pub mod feed;
pub mod patch;
pub mod people;
pub mod records;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use feed::{ChangeFeed, ChangeReceiver};
pub use patch::*;
pub use records::*;
pub use store::{ContentStore, StateStore};
pub use types::*;
