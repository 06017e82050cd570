//! Single-writer handle around a `SessionManager`
//!
//! Hosts that serve several tasks at once (the CLI's guard loop, tests that
//! fire operations concurrently) share one manager through this handle. Every
//! operation takes the lock for its whole duration, so operations are
//! serialized and observers only ever see a state that some operation left
//! behind.

use super::manager::SessionManager;
use super::social::SocialProvider;
use super::state::AuthState;
use crate::models::auth::AuthError;
use crate::models::{SessionSnapshot, SessionUser};
use crate::routing::{GuardOutcome, Redirect};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable, lock-protected session manager
#[derive(Clone)]
pub struct SharedSessionManager {
    inner: Arc<Mutex<SessionManager>>,
}

impl SharedSessionManager {
    #[must_use]
    pub fn new(manager: SessionManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    pub async fn restore(&self, current_path: &str) -> Option<Redirect> {
        self.inner.lock().await.restore(current_path)
    }

    /// # Errors
    /// See [`SessionManager::login`]
    pub async fn login(&self, email: &str, secret: &str) -> Result<Redirect, AuthError> {
        self.inner.lock().await.login(email, secret)
    }

    /// # Errors
    /// See [`SessionManager::sign_up`]
    pub async fn sign_up(&self, email: &str, secret: &str) -> Result<Redirect, AuthError> {
        self.inner.lock().await.sign_up(email, secret)
    }

    /// The lock is held while the provider runs.
    ///
    /// # Errors
    /// See [`SessionManager::social_login`]
    pub async fn social_login(&self, provider: &dyn SocialProvider) -> Result<Redirect, AuthError> {
        self.inner.lock().await.social_login(provider).await
    }

    /// # Errors
    /// See [`SessionManager::verify_email`]
    pub async fn verify_email(&self, email: &str) -> Result<SessionUser, AuthError> {
        self.inner.lock().await.verify_email(email)
    }

    pub async fn logout(&self) -> Redirect {
        self.inner.lock().await.logout()
    }

    pub async fn check_auth(&self) -> bool {
        self.inner.lock().await.check_auth()
    }

    pub async fn decide(&self, path: &str) -> GuardOutcome {
        self.inner.lock().await.decide(path)
    }

    pub async fn guard(&self, path: &str, require_auth: bool) -> GuardOutcome {
        self.inner.lock().await.guard(path, require_auth)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn state(&self) -> AuthState {
        self.inner.lock().await.state().clone()
    }
}

impl From<SessionManager> for SharedSessionManager {
    fn from(manager: SessionManager) -> Self {
        Self::new(manager)
    }
}
