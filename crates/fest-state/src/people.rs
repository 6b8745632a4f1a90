//! Registrations, the admin allow-list, and local credentials.

use redb::ReadableTable;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::records::{AdminUser, Credential, Registration};
use crate::store::StateStore;
use crate::tables::*;

impl StateStore {
    // ── Registrations ──────────────────────────────────────────────

    /// Insert or replace `reg` unless an existing record satisfies
    /// `conflicts`. The scan and the write share one write transaction,
    /// so concurrent callers are serialized. Returns the conflicting
    /// record when the write was refused.
    pub fn put_registration_unless(
        &self,
        reg: &Registration,
        conflicts: impl Fn(&Registration) -> bool,
    ) -> StateResult<Option<Registration>> {
        let value = serde_json::to_vec(reg).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(REGISTRATIONS).map_err(map_err!(Table))?;
            let mut conflict = None;
            for entry in table.iter().map_err(map_err!(Read))? {
                let (_, raw) = entry.map_err(map_err!(Read))?;
                let existing: Registration =
                    serde_json::from_slice(raw.value()).map_err(map_err!(Deserialize))?;
                if conflicts(&existing) {
                    conflict = Some(existing);
                    break;
                }
            }
            if conflict.is_some() {
                // Dropping the uncommitted transaction discards it.
                return Ok(conflict);
            }
            table
                .insert(reg.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(id = %reg.id, "registration stored");
        Ok(None)
    }

    /// Get a registration by id.
    pub fn get_registration(&self, id: &str) -> StateResult<Option<Registration>> {
        self.get_json(REGISTRATIONS, id)
    }

    /// List all registrations, newest first.
    pub fn list_registrations(&self) -> StateResult<Vec<Registration>> {
        let mut regs: Vec<Registration> = self.list_json(REGISTRATIONS)?;
        regs.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(regs)
    }

    /// Registrations whose fields satisfy `predicate`.
    pub fn find_registrations(
        &self,
        predicate: impl Fn(&Registration) -> bool,
    ) -> StateResult<Vec<Registration>> {
        let regs: Vec<Registration> = self.list_json(REGISTRATIONS)?;
        Ok(regs.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Delete a registration by id. Returns true if it existed.
    pub fn delete_registration(&self, id: &str) -> StateResult<bool> {
        let existed = self.delete_key(REGISTRATIONS, id)?;
        debug!(%id, existed, "registration deleted");
        Ok(existed)
    }

    /// Total number of registrations.
    pub fn count_registrations(&self) -> StateResult<u64> {
        self.count(REGISTRATIONS)
    }

    /// Number of registrations with `timestamp >= since`.
    pub fn count_registrations_since(&self, since: u64) -> StateResult<u64> {
        Ok(self.find_registrations(|r| r.timestamp >= since)?.len() as u64)
    }

    /// The most recent registration, if any.
    pub fn latest_registration(&self) -> StateResult<Option<Registration>> {
        Ok(self.list_registrations()?.into_iter().next())
    }

    // ── Admin allow-list ───────────────────────────────────────────

    /// Insert or update an admin record.
    pub fn put_admin(&self, admin: &AdminUser) -> StateResult<()> {
        self.put_json(ADMINS, &admin.id, admin)?;
        debug!(uid = %admin.id, "admin stored");
        Ok(())
    }

    /// Get an admin by user id.
    pub fn get_admin(&self, uid: &str) -> StateResult<Option<AdminUser>> {
        self.get_json(ADMINS, uid)
    }

    /// List all admins.
    pub fn list_admins(&self) -> StateResult<Vec<AdminUser>> {
        self.list_json(ADMINS)
    }

    /// Number of admins on the allow-list.
    pub fn admin_count(&self) -> StateResult<u64> {
        self.count(ADMINS)
    }

    /// Remove an admin from the allow-list. Returns true if it existed.
    pub fn delete_admin(&self, uid: &str) -> StateResult<bool> {
        self.delete_key(ADMINS, uid)
    }

    // ── Credentials ────────────────────────────────────────────────

    /// Insert a new credential. Fails if the email is already taken.
    pub fn insert_credential(&self, cred: &Credential) -> StateResult<()> {
        let key = cred.table_key();
        if self.get_credential(&key)?.is_some() {
            return Err(StateError::Write(format!("credential exists for {key}")));
        }
        self.put_json(CREDENTIALS, &key, cred)
    }

    /// Replace an existing credential (password change).
    pub fn update_credential(&self, cred: &Credential) -> StateResult<()> {
        self.put_json(CREDENTIALS, &cred.table_key(), cred)
    }

    /// Look up a credential by email (case-insensitive).
    pub fn get_credential(&self, email: &str) -> StateResult<Option<Credential>> {
        self.get_json(CREDENTIALS, &email.to_lowercase())
    }
}
