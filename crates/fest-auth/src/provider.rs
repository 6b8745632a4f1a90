//! Identity providers.
//!
//! The admin layer only needs four primitives from whoever owns the
//! accounts: sign-in, account creation, and the two halves of a password
//! reset. [`LocalAuthProvider`] implements them over the `credentials`
//! table with salted SHA-256 digests and per-email throttling.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use fest_core::epoch_secs;
use fest_state::{Credential, StateStore};

use crate::error::{AuthError, AuthResult};
use crate::password;

/// Failed sign-ins allowed per email inside [`THROTTLE_WINDOW_SECS`].
pub const MAX_FAILED_ATTEMPTS: usize = 5;
pub const THROTTLE_WINDOW_SECS: u64 = 15 * 60;
/// Lifetime of a password reset token.
pub const RESET_TOKEN_TTL_SECS: u64 = 60 * 60;

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// A pending password reset, handed to whoever delivers it to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTicket {
    pub email: String,
    pub token: String,
    pub expires_at: u64,
}

pub trait AuthProvider: Send + Sync + 'static {
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity>;

    fn create_user(&self, email: &str, password: &str) -> AuthResult<Identity>;

    fn reset_password(&self, email: &str) -> AuthResult<ResetTicket>;

    fn complete_reset(&self, token: &str, new_password: &str) -> AuthResult<()>;
}

/// Sliding window of failed attempts per case-folded email.
#[derive(Default)]
struct Throttle {
    failures: HashMap<String, Vec<u64>>,
}

impl Throttle {
    /// Call after [`prune`](Self::prune) so only in-window failures count.
    fn is_locked(&self, key: &str) -> bool {
        self.failures
            .get(key)
            .is_some_and(|times| times.len() >= MAX_FAILED_ATTEMPTS)
    }

    /// Forget failures that fell out of the window, and emails left
    /// with none.
    fn prune(&mut self, now: u64) {
        self.failures.retain(|_, times| {
            times.retain(|t| now.saturating_sub(*t) < THROTTLE_WINDOW_SECS);
            !times.is_empty()
        });
    }

    fn record_failure(&mut self, key: &str, now: u64) {
        self.failures.entry(key.to_string()).or_default().push(now);
    }

    fn clear(&mut self, key: &str) {
        self.failures.remove(key);
    }
}

pub struct LocalAuthProvider {
    store: StateStore,
    throttle: Mutex<Throttle>,
    resets: Mutex<HashMap<String, ResetTicket>>,
}

impl LocalAuthProvider {
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            throttle: Mutex::new(Throttle::default()),
            resets: Mutex::new(HashMap::new()),
        }
    }

    fn credential(&self, email: &str) -> AuthResult<Credential> {
        self.store.get_credential(email)?.ok_or(AuthError::UserNotFound)
    }

    /// Sign-in against an explicit clock, for the throttle.
    pub fn sign_in_at(&self, email: &str, password: &str, now: u64) -> AuthResult<Identity> {
        password::check_email(email)?;
        let key = email.to_lowercase();
        let mut throttle = self.throttle.lock().unwrap_or_else(|e| e.into_inner());
        throttle.prune(now);
        if throttle.is_locked(&key) {
            warn!(email = %key, "sign-in throttled");
            return Err(AuthError::TooManyAttempts);
        }

        let cred = match self.credential(email) {
            Ok(cred) => cred,
            Err(e) => {
                throttle.record_failure(&key, now);
                return Err(e);
            }
        };
        if !password::verify(&cred.salt, password, &cred.password_hash) {
            throttle.record_failure(&key, now);
            debug!(email = %key, "sign-in rejected: wrong password");
            return Err(AuthError::WrongPassword);
        }
        throttle.clear(&key);
        Ok(Identity {
            uid: cred.uid,
            email: cred.email,
        })
    }

    /// Reset against an explicit clock.
    pub fn complete_reset_at(&self, token: &str, new_password: &str, now: u64) -> AuthResult<()> {
        password::check_strength(new_password)?;
        let ticket = {
            let mut resets = self.resets.lock().unwrap_or_else(|e| e.into_inner());
            resets.remove(token)
        };
        let ticket = ticket
            .filter(|t| t.expires_at > now)
            .ok_or(AuthError::InvalidResetToken)?;

        let mut cred = self.credential(&ticket.email)?;
        cred.salt = password::random_hex(16)?;
        cred.password_hash = password::digest(&cred.salt, new_password);
        self.store.update_credential(&cred)?;

        let key = ticket.email.to_lowercase();
        self.throttle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear(&key);
        info!(email = %key, "password reset completed");
        Ok(())
    }
}

impl AuthProvider for LocalAuthProvider {
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        self.sign_in_at(email, password, epoch_secs())
    }

    fn create_user(&self, email: &str, password: &str) -> AuthResult<Identity> {
        password::check_email(email)?;
        password::check_strength(password)?;
        if self.store.get_credential(email)?.is_some() {
            return Err(AuthError::EmailInUse);
        }
        let salt = password::random_hex(16)?;
        let cred = Credential {
            uid: password::random_hex(14)?,
            email: email.to_string(),
            password_hash: password::digest(&salt, password),
            salt,
            created_at: epoch_secs(),
        };
        self.store.insert_credential(&cred)?;
        info!(uid = %cred.uid, email = %cred.email, "account created");
        Ok(Identity {
            uid: cred.uid,
            email: cred.email,
        })
    }

    fn reset_password(&self, email: &str) -> AuthResult<ResetTicket> {
        password::check_email(email)?;
        let cred = self.credential(email)?;
        let ticket = ResetTicket {
            email: cred.email,
            token: password::random_hex(24)?,
            expires_at: epoch_secs() + RESET_TOKEN_TTL_SECS,
        };
        self.resets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(ticket.token.clone(), ticket.clone());
        Ok(ticket)
    }

    fn complete_reset(&self, token: &str, new_password: &str) -> AuthResult<()> {
        self.complete_reset_at(token, new_password, epoch_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LocalAuthProvider {
        LocalAuthProvider::new(StateStore::open_in_memory().unwrap())
    }

    #[test]
    fn create_then_sign_in() {
        let p = provider();
        let created = p.create_user("Captain@Yacht.Rock", "smooth-sailing").unwrap();

        let signed_in = p.sign_in("captain@yacht.rock", "smooth-sailing").unwrap();
        assert_eq!(signed_in, created);
    }

    #[test]
    fn sign_in_errors_are_specific() {
        let p = provider();
        p.create_user("captain@yacht.rock", "smooth-sailing").unwrap();

        assert!(matches!(p.sign_in("nobody@yacht.rock", "x"), Err(AuthError::UserNotFound)));
        assert!(matches!(p.sign_in("captain@yacht.rock", "rough"), Err(AuthError::WrongPassword)));
        assert!(matches!(p.sign_in("captain", "x"), Err(AuthError::InvalidEmail)));
    }

    #[test]
    fn create_rejects_duplicates_and_weak_passwords() {
        let p = provider();
        p.create_user("captain@yacht.rock", "smooth-sailing").unwrap();

        assert!(matches!(
            p.create_user("CAPTAIN@yacht.rock", "another-one"),
            Err(AuthError::EmailInUse)
        ));
        assert!(matches!(p.create_user("mate@yacht.rock", "12345"), Err(AuthError::WeakPassword)));
    }

    #[test]
    fn five_failures_lock_the_email_for_the_window() {
        let p = provider();
        p.create_user("captain@yacht.rock", "smooth-sailing").unwrap();
        let t0 = 1_000_000;

        for i in 0..MAX_FAILED_ATTEMPTS as u64 {
            assert!(matches!(
                p.sign_in_at("captain@yacht.rock", "wrong", t0 + i),
                Err(AuthError::WrongPassword)
            ));
        }
        // Even the right password is refused while locked.
        assert!(matches!(
            p.sign_in_at("captain@yacht.rock", "smooth-sailing", t0 + 10),
            Err(AuthError::TooManyAttempts)
        ));
        assert!(
            p.sign_in_at("captain@yacht.rock", "smooth-sailing", t0 + THROTTLE_WINDOW_SECS + 10)
                .is_ok()
        );
    }

    #[test]
    fn throttle_forgets_emails_once_their_window_passes() {
        let p = provider();
        let t0 = 1_000_000;
        for i in 0..20u64 {
            let _ = p.sign_in_at(&format!("stranger{i}@yacht.rock"), "x", t0 + i);
        }
        assert_eq!(p.throttle.lock().unwrap().failures.len(), 20);

        let _ = p.sign_in_at("late@yacht.rock", "x", t0 + THROTTLE_WINDOW_SECS + 20);
        let throttle = p.throttle.lock().unwrap();
        assert_eq!(throttle.failures.len(), 1);
        assert!(throttle.failures.contains_key("late@yacht.rock"));
    }

    #[test]
    fn reset_flow_replaces_the_password_once() {
        let p = provider();
        p.create_user("captain@yacht.rock", "smooth-sailing").unwrap();

        let ticket = p.reset_password("captain@yacht.rock").unwrap();
        p.complete_reset(&ticket.token, "steady-as-she-goes").unwrap();

        assert!(p.sign_in("captain@yacht.rock", "steady-as-she-goes").is_ok());
        assert!(matches!(p.sign_in("captain@yacht.rock", "smooth-sailing"), Err(AuthError::WrongPassword)));
        assert!(matches!(
            p.complete_reset(&ticket.token, "again-and-again"),
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[test]
    fn reset_for_unknown_email_or_expired_token_fails() {
        let p = provider();
        p.create_user("captain@yacht.rock", "smooth-sailing").unwrap();
        assert!(matches!(p.reset_password("nobody@yacht.rock"), Err(AuthError::UserNotFound)));

        let ticket = p.reset_password("captain@yacht.rock").unwrap();
        assert!(matches!(
            p.complete_reset_at(&ticket.token, "steady-as-she-goes", ticket.expires_at),
            Err(AuthError::InvalidResetToken)
        ));
    }
}
