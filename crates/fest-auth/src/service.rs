//! Admin sessions on top of an [`AuthProvider`].
//!
//! Signing in proves who someone is; being on the admin allow-list is
//! what lets them in. A valid account without an `admins` record is
//! turned away. Sessions are opaque random tokens held in memory.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use fest_content::ContentService;
use fest_core::epoch_secs;
use fest_state::{AdminRole, AdminUser, StateStore};

use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::provider::{AuthProvider, ResetTicket};

/// How long a session stays valid after sign-in.
pub const SESSION_TTL_SECS: u64 = 12 * 60 * 60;

#[derive(Debug, Clone)]
struct Session {
    uid: String,
    expires_at: u64,
}

/// Returned by a successful sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub expires_at: u64,
    pub admin: AdminUser,
}

#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    store: StateStore,
    content: ContentService,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, store: StateStore, content: ContentService) -> Self {
        Self {
            provider,
            store,
            content,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<SignedIn> {
        let identity = self.provider.sign_in(email.trim(), password)?;
        let Some(mut admin) = self.store.get_admin(&identity.uid)? else {
            warn!(uid = %identity.uid, "sign-in by account outside the admin allow-list");
            return Err(AuthError::NotAdmin);
        };

        let now = epoch_secs();
        admin.last_login = Some(now);
        self.store.put_admin(&admin)?;

        let token = password::random_hex(32)?;
        let expires_at = now + SESSION_TTL_SECS;
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                uid: admin.id.clone(),
                expires_at,
            },
        );
        drop(sessions);
        info!(uid = %admin.id, "admin signed in");
        Ok(SignedIn {
            token,
            expires_at,
            admin,
        })
    }

    /// End the session and drop cached content.
    pub async fn sign_out(&self, token: &str) {
        if let Some(session) = self.sessions.write().await.remove(token) {
            debug!(uid = %session.uid, "admin signed out");
        }
        self.content.clear_cache().await;
    }

    /// Resolve a session token to its admin. The allow-list is checked
    /// again on every call so removals take effect immediately.
    pub async fn authenticate(&self, token: &str) -> AuthResult<AdminUser> {
        self.authenticate_at(token, epoch_secs()).await
    }

    pub async fn authenticate_at(&self, token: &str, now: u64) -> AuthResult<AdminUser> {
        let session = self.sessions.read().await.get(token).cloned();
        let Some(session) = session else {
            return Err(AuthError::InvalidSession);
        };
        if session.expires_at <= now {
            self.sessions.write().await.remove(token);
            return Err(AuthError::InvalidSession);
        }
        self.store.get_admin(&session.uid)?.ok_or(AuthError::NotAdmin)
    }

    /// Allow-list membership; lookup failures read as "no".
    pub fn is_admin(&self, uid: &str) -> bool {
        match self.store.get_admin(uid) {
            Ok(admin) => admin.is_some(),
            Err(e) => {
                error!(%uid, error = %e, "admin lookup failed");
                false
            }
        }
    }

    /// Create an account and put it on the allow-list.
    pub fn create_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: AdminRole,
    ) -> AuthResult<AdminUser> {
        let identity = self.provider.create_user(email.trim(), password)?;
        let admin = AdminUser {
            id: identity.uid,
            email: identity.email,
            name: name.trim().to_string(),
            role,
            created_at: epoch_secs(),
            last_login: None,
        };
        self.store.put_admin(&admin)?;
        info!(uid = %admin.id, role = ?admin.role, "admin created");
        Ok(admin)
    }

    /// True until the first admin exists.
    pub fn needs_setup(&self) -> AuthResult<bool> {
        Ok(self.store.admin_count()? == 0)
    }

    /// One-time bootstrap of the first admin, optionally seeding the
    /// default content first.
    pub async fn setup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        seed_content: bool,
    ) -> AuthResult<AdminUser> {
        if !self.needs_setup()? {
            return Err(AuthError::SetupClosed);
        }
        if seed_content {
            self.content.initialize_default_content().await?;
        }
        self.create_admin(email, password, name, AdminRole::Admin)
    }

    pub fn reset_password(&self, email: &str) -> AuthResult<ResetTicket> {
        self.provider.reset_password(email.trim())
    }

    pub fn complete_reset(&self, token: &str, new_password: &str) -> AuthResult<()> {
        self.provider.complete_reset(token, new_password)
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
