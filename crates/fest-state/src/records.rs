//! Audit, attendee, and admin records.

use serde::{Deserialize, Serialize};

use crate::types::{ContentId, ContentType};

/// Immutable audit entry written after every successful content update.
///
/// `data` is the partial update exactly as it was applied. It is not
/// validated on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    pub content_type: ContentType,
    pub content_id: ContentId,
    pub data: serde_json::Value,
    /// Admin user id that made the change.
    pub changed_by: String,
    pub changed_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_note: Option<String>,
}

impl VersionRecord {
    /// Build the time-ordered key for the versions table.
    pub fn table_key(&self) -> String {
        format!("{:012}:{}", self.changed_at, self.id)
    }
}

/// An attendee lead collected by the public form or added by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    #[default]
    Admin,
    Editor,
}

/// Membership in the admin allow-list. Its presence is the whole
/// authorization check; `role` is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: AdminRole,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<u64>,
}

/// Stored sign-in secret for the local identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub uid: String,
    pub email: String,
    pub salt: String,
    /// Hex SHA-256 of `salt || password`.
    pub password_hash: String,
    pub created_at: u64,
}

impl Credential {
    /// Credentials are keyed by case-folded email.
    pub fn table_key(&self) -> String {
        self.email.to_lowercase()
    }
}
