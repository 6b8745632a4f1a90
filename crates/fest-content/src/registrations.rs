//! Attendee registrations and the duplicate gate.
//!
//! A registration is a duplicate of an existing one when the names match
//! and either the emails match or, for a non-empty phone, the phones
//! match. Comparison is exact after trimming surrounding whitespace.
//! The check and the write share one store transaction, so two identical
//! concurrent submissions cannot both get through.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fest_core::{epoch_secs, time_id};
use fest_state::{Registration, StateStore};

use crate::error::{ContentError, ContentResult};

/// Fields submitted by the public form or an admin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl RegistrationForm {
    fn normalized(self) -> ContentResult<Self> {
        let form = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        };
        if form.name.is_empty() {
            return Err(ContentError::InvalidRegistration("name is required".into()));
        }
        if form.email.is_empty() {
            return Err(ContentError::InvalidRegistration("email is required".into()));
        }
        if !is_plausible_email(&form.email) {
            return Err(ContentError::InvalidRegistration(format!(
                "{} is not a valid email address",
                form.email
            )));
        }
        Ok(form)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Identity fields a new or edited registration is checked against.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateGate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    /// Registration being edited; never counts as its own duplicate.
    pub exclude_id: Option<&'a str>,
}

impl DuplicateGate<'_> {
    pub fn matches(&self, existing: &Registration) -> bool {
        if self.exclude_id == Some(existing.id.as_str()) {
            return false;
        }
        if existing.name != self.name {
            return false;
        }
        existing.email == self.email || (!self.phone.is_empty() && existing.phone == self.phone)
    }
}

/// Result of a gated write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Registered { registration: Registration },
    Duplicate { existing_id: String },
}

impl SubmitOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SubmitOutcome::Duplicate { .. })
    }
}

/// Registration operations over the store.
#[derive(Clone)]
pub struct RegistrationDesk {
    store: StateStore,
}

impl RegistrationDesk {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Public form submission.
    pub fn submit(&self, form: RegistrationForm) -> ContentResult<SubmitOutcome> {
        self.insert(form, epoch_secs(), "public")
    }

    /// Manual add from the admin panel. `timestamp` defaults to now.
    pub fn add(&self, form: RegistrationForm, timestamp: Option<u64>) -> ContentResult<SubmitOutcome> {
        self.insert(form, timestamp.unwrap_or_else(epoch_secs), "admin")
    }

    fn insert(&self, form: RegistrationForm, timestamp: u64, source: &str) -> ContentResult<SubmitOutcome> {
        let form = form.normalized()?;
        let registration = Registration {
            id: time_id(),
            name: form.name,
            email: form.email,
            phone: form.phone,
            timestamp,
        };
        self.gated_put(registration, None, source)
    }

    /// Replace the identity fields of `id`, keeping its timestamp.
    pub fn edit(&self, id: &str, form: RegistrationForm) -> ContentResult<SubmitOutcome> {
        let existing = self
            .store
            .get_registration(id)?
            .ok_or_else(|| ContentError::RegistrationNotFound(id.to_string()))?;
        let form = form.normalized()?;
        let registration = Registration {
            name: form.name,
            email: form.email,
            phone: form.phone,
            ..existing
        };
        self.gated_put(registration, Some(id), "admin")
    }

    fn gated_put(
        &self,
        registration: Registration,
        exclude_id: Option<&str>,
        source: &str,
    ) -> ContentResult<SubmitOutcome> {
        let gate = DuplicateGate {
            name: &registration.name,
            email: &registration.email,
            phone: &registration.phone,
            exclude_id,
        };
        match self
            .store
            .put_registration_unless(&registration, |existing| gate.matches(existing))?
        {
            Some(existing) => {
                info!(existing = %existing.id, source, "duplicate registration turned away");
                Ok(SubmitOutcome::Duplicate {
                    existing_id: existing.id,
                })
            }
            None => {
                debug!(id = %registration.id, source, "registration accepted");
                Ok(SubmitOutcome::Registered { registration })
            }
        }
    }

    pub fn delete(&self, id: &str) -> ContentResult<()> {
        if !self.store.delete_registration(id)? {
            return Err(ContentError::RegistrationNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> ContentResult<Option<Registration>> {
        Ok(self.store.get_registration(id)?)
    }

    /// All registrations, newest first.
    pub fn list(&self) -> ContentResult<Vec<Registration>> {
        Ok(self.store.list_registrations()?)
    }

    pub fn total(&self) -> ContentResult<u64> {
        Ok(self.store.count_registrations()?)
    }

    /// Registrations with `timestamp >= since`.
    pub fn count_since(&self, since: u64) -> ContentResult<u64> {
        Ok(self.store.count_registrations_since(since)?)
    }

    pub fn latest(&self) -> ContentResult<Option<Registration>> {
        Ok(self.store.latest_registration()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desk() -> RegistrationDesk {
        RegistrationDesk::new(StateStore::open_in_memory().unwrap())
    }

    fn form(name: &str, email: &str, phone: &str) -> RegistrationForm {
        RegistrationForm {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    fn registered(outcome: SubmitOutcome) -> Registration {
        match outcome {
            SubmitOutcome::Registered { registration } => registration,
            other => panic!("expected registration, got {other:?}"),
        }
    }

    #[test]
    fn same_name_and_email_is_a_duplicate() {
        let desk = desk();
        let first = registered(desk.submit(form("A", "x@x.com", "")).unwrap());

        let again = desk.submit(form("A", "x@x.com", "")).unwrap();
        assert_eq!(
            again,
            SubmitOutcome::Duplicate {
                existing_id: first.id
            }
        );
        assert_eq!(desk.total().unwrap(), 1);
    }

    #[test]
    fn same_name_different_email_is_accepted() {
        let desk = desk();
        desk.submit(form("A", "x@x.com", "")).unwrap();

        assert!(!desk.submit(form("A", "y@y.com", "")).unwrap().is_duplicate());
        assert_eq!(desk.total().unwrap(), 2);
    }

    #[test]
    fn same_name_and_phone_is_a_duplicate() {
        let desk = desk();
        desk.submit(form("A", "x@x.com", "619-555-0100")).unwrap();

        assert!(desk.submit(form("A", "y@y.com", "619-555-0100")).unwrap().is_duplicate());
        // Different name, same contact details is someone else.
        assert!(!desk.submit(form("B", "x@x.com", "619-555-0100")).unwrap().is_duplicate());
    }

    #[test]
    fn empty_phones_never_match_each_other() {
        let desk = desk();
        desk.submit(form("A", "x@x.com", "")).unwrap();
        assert!(!desk.submit(form("A", "z@z.com", "")).unwrap().is_duplicate());
    }

    #[test]
    fn editing_with_unchanged_identity_is_accepted() {
        let desk = desk();
        let original = registered(desk.submit(form("A", "x@x.com", "")).unwrap());

        let edited = registered(desk.edit(&original.id, form("A", "x@x.com", "")).unwrap());
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.timestamp, original.timestamp);
    }

    #[test]
    fn editing_into_another_record_is_a_duplicate() {
        let desk = desk();
        let a = registered(desk.submit(form("A", "a@x.com", "")).unwrap());
        let b = registered(desk.submit(form("B", "b@x.com", "")).unwrap());

        let outcome = desk.edit(&b.id, form("A", "a@x.com", "")).unwrap();
        assert_eq!(outcome, SubmitOutcome::Duplicate { existing_id: a.id });
        assert_eq!(desk.get(&b.id).unwrap().unwrap().name, "B");
    }

    #[test]
    fn edit_and_delete_unknown_ids_fail() {
        let desk = desk();
        assert!(matches!(
            desk.edit("nope", form("A", "a@x.com", "")),
            Err(ContentError::RegistrationNotFound(_))
        ));
        assert!(matches!(desk.delete("nope"), Err(ContentError::RegistrationNotFound(_))));
    }

    #[test]
    fn fields_are_trimmed_and_validated() {
        let desk = desk();
        let reg = registered(desk.submit(form("  Ann ", " ann@example.com ", " ")).unwrap());
        assert_eq!((reg.name.as_str(), reg.email.as_str(), reg.phone.as_str()), ("Ann", "ann@example.com", ""));

        for bad in [form("", "a@x.com", ""), form("A", "", ""), form("A", "not-an-email", "")] {
            assert!(matches!(desk.submit(bad), Err(ContentError::InvalidRegistration(_))));
        }
    }

    #[test]
    fn admin_add_keeps_supplied_timestamp_and_stats_follow() {
        let desk = desk();
        desk.add(form("Old", "old@x.com", ""), Some(1_000)).unwrap();
        let new = registered(desk.add(form("New", "new@x.com", ""), Some(5_000)).unwrap());

        assert_eq!(desk.count_since(2_000).unwrap(), 1);
        assert_eq!(desk.latest().unwrap(), Some(new));
        assert_eq!(desk.list().unwrap().len(), 2);
        desk.delete(&desk.list().unwrap()[1].id).unwrap();
        assert_eq!(desk.total().unwrap(), 1);
    }
}
