//! redb table definitions for the festival document store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).

use redb::TableDefinition;

/// Singleton content documents keyed by their fixed id (`lineup_page`, ...).
pub const CONTENT: TableDefinition<&str, &[u8]> = TableDefinition::new("content");

/// Version log keyed by `{changed_at:012}:{version_id}` so key order is time order.
pub const CONTENT_VERSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("content_versions");

/// Attendee registrations keyed by registration id.
pub const REGISTRATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("registrations");

/// Admin allow-list keyed by user id.
pub const ADMINS: TableDefinition<&str, &[u8]> = TableDefinition::new("admins");

/// Local sign-in credentials keyed by lowercased email.
pub const CREDENTIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

/// Shape shared by every table: string key, JSON bytes value.
pub type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;
