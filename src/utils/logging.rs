// Centralized logging for the session lifecycle so messages stay consistent
use log::{debug, info, warn};

pub struct SessionLog;

impl SessionLog {
    /// Log the outcome of the startup restore
    pub fn log_restore(authenticated: bool, path: &str) {
        if authenticated {
            info!("✅ Session restored from storage (path: {path})");
        } else {
            info!("🔒 No usable stored session, starting unauthenticated (path: {path})");
        }
    }

    /// Log a rejected stored session before its slots are cleared
    pub fn log_stored_session_rejected(reason: &str) {
        warn!("Stored session rejected: {reason}");
    }

    /// Log a successful sign-in for any method
    pub fn log_signed_in(method: &str, user_id: u64) {
        info!("✅ User {user_id} signed in via {method}");
    }

    /// Log a failed sign-in attempt without echoing credentials
    pub fn log_sign_in_failed(method: &str, error: &crate::models::auth::AuthError) {
        warn!("❌ Sign-in via {method} failed: {error}");
    }

    pub fn log_signed_out(user_id: Option<u64>) {
        match user_id {
            Some(id) => info!("👋 User {id} signed out"),
            None => debug!("Sign-out requested with no active session"),
        }
    }

    /// Log a guard decision that results in navigation
    pub fn log_redirect(from: &str, to: &str) {
        debug!("🔀 Redirecting {from} -> {to}");
    }

    /// Log a storage failure that was swallowed to keep the session usable
    pub fn log_storage_failure(operation: &str, error: &crate::models::auth::AuthError) {
        warn!("⚠️  Session storage {operation} failed: {error}");
    }
}
