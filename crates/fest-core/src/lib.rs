//! fest-core — shared building blocks for the festival site crates.
//!
//! Holds the `festival.toml` configuration model, wall-clock helpers and
//! the time-based id generator used for sub-entities, version records and
//! registrations.

pub mod config;
pub mod ids;
pub mod time;

pub use config::FestConfig;
pub use ids::time_id;
pub use time::{epoch_millis, epoch_secs};
