//! Session Manager - Authentication State Machine
//!
//! The `SessionManager` is the single source of truth for the dashboard's
//! authentication state. It owns the credential store, the token issuer, the
//! persisted record backend and the route table, and moves between three
//! states:
//!
//! - **Initializing** - until `restore` has run once
//! - **Unauthenticated** - no usable session
//! - **Authenticated** - a validated token and its user record are stored
//!
//! ## Organization
//!
//! 1. **Construction** - building a manager from parts or settings
//! 2. **Startup Restore** - the one-shot `Initializing` transition
//! 3. **Sign-in** - login, sign-up, social login and email verification
//! 4. **Sign-out & Re-validation** - logout and `check_auth`
//! 5. **Route Guarding** - decisions against the current state
//! 6. **Accessors**
//! 7. **Tests**
//!
//! Operations that fail (`InvalidCredentials`, `DuplicateEmail`, ...) leave
//! the state and the persisted record untouched. Token and storage failures
//! during restore and re-validation are never surfaced; they resolve to
//! "not authenticated".

use super::social::{generate_unusable_secret, SocialProvider};
use super::state::AuthState;
use super::storage::{storage_from_settings, SessionStorage};
use crate::credentials::CredentialStore;
use crate::models::auth::AuthError;
use crate::models::{Principal, SessionSnapshot, SessionUser};
use crate::routing::{guard_outcome, route_outcome, GuardOutcome, Redirect, RouteTable};
use crate::settings::SessionGuardSettings;
use crate::token::TokenIssuer;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::logging::SessionLog;
use log::debug;
use std::sync::Arc;

// =============================================================================
// Session Manager Structure
// =============================================================================

/// Session & route-guard manager
///
/// Construct one per application (or per test); nothing here is global.
pub struct SessionManager {
    store: CredentialStore,
    issuer: TokenIssuer,
    storage: Box<dyn SessionStorage>,
    routes: RouteTable,
    state: AuthState,
}

// =============================================================================
// 1. Construction
// =============================================================================

impl SessionManager {
    /// Create a manager in the `Initializing` state
    #[must_use]
    pub fn new(
        store: CredentialStore,
        issuer: TokenIssuer,
        storage: Box<dyn SessionStorage>,
        routes: RouteTable,
    ) -> Self {
        Self {
            store,
            issuer,
            storage,
            routes,
            state: AuthState::Initializing,
        }
    }

    /// Build a manager from settings on the wall clock
    ///
    /// # Errors
    ///
    /// Returns an error if the configured routes are invalid
    pub fn from_settings(settings: &SessionGuardSettings) -> anyhow::Result<Self> {
        Self::from_settings_with_clock(settings, Arc::new(SystemClock))
    }

    /// Build a manager from settings with an explicit clock
    ///
    /// # Errors
    ///
    /// Returns an error if the configured routes are invalid
    pub fn from_settings_with_clock(
        settings: &SessionGuardSettings,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let routes = settings.route_table()?;
        Ok(Self::new(
            CredentialStore::with_principals(settings.seed_principals()),
            TokenIssuer::new(&settings.token, clock),
            storage_from_settings(&settings.storage),
            routes,
        ))
    }
}

// =============================================================================
// 2. Startup Restore
// =============================================================================

impl SessionManager {
    /// Restore the session from storage and apply the redirect rule
    ///
    /// Runs once: the first call leaves `Initializing` for `Authenticated` (a
    /// complete, unexpired record is stored) or `Unauthenticated` (anything
    /// else, after clearing both slots). It then evaluates the redirect rule
    /// for `current_path` and returns at most one redirect. Later calls are
    /// no-ops returning `None`.
    pub fn restore(&mut self, current_path: &str) -> Option<Redirect> {
        if !self.state.is_loading() {
            debug!("Session restore already ran, ignoring");
            return None;
        }

        self.state = match self.stored_session() {
            Ok(Some(user)) => AuthState::Authenticated(user),
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                SessionLog::log_stored_session_rejected(&e.to_string());
                self.clear_storage_quietly();
                AuthState::Unauthenticated
            }
        };
        SessionLog::log_restore(self.state.is_authenticated(), current_path);

        self.decide(current_path).redirect().cloned()
    }

    /// Read and validate the persisted record
    ///
    /// `Ok(None)` means nothing is stored. A record with only one slot, an
    /// unusable token or an unreadable user slot is an error.
    fn stored_session(&self) -> Result<Option<SessionUser>, AuthError> {
        let slots = self.storage.load()?;

        match (slots.token, slots.user) {
            (None, None) => Ok(None),
            (Some(token), Some(user)) => {
                self.issuer.verify(&token)?;
                let user = SessionUser::from_slot(&user)
                    .map_err(|e| AuthError::MalformedToken(format!("user record: {e}")))?;
                Ok(Some(user))
            }
            (Some(_), None) => Err(AuthError::MalformedToken(
                "token stored without user record".to_string(),
            )),
            (None, Some(_)) => Err(AuthError::MalformedToken(
                "user record stored without token".to_string(),
            )),
        }
    }

    fn clear_storage_quietly(&mut self) {
        if let Err(e) = self.storage.clear() {
            SessionLog::log_storage_failure("clear", &e);
        }
    }
}

// =============================================================================
// 3. Sign-in
// =============================================================================

impl SessionManager {
    /// Sign in with email and secret
    ///
    /// On success both slots are written, the state becomes `Authenticated`
    /// and the caller should navigate to the returned dashboard redirect.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No principal matches both email and secret (`InvalidCredentials`)
    /// - The record cannot be persisted (`Storage`)
    pub fn login(&mut self, email: &str, secret: &str) -> Result<Redirect, AuthError> {
        let principal = self
            .store
            .find_by_email_and_secret(email, secret)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)
            .inspect_err(|e| SessionLog::log_sign_in_failed("password", e))?;

        self.establish(&principal, "password")
    }

    /// Register a new principal and sign in as it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is already registered (`DuplicateEmail`)
    /// - The record cannot be persisted (`Storage`)
    pub fn sign_up(&mut self, email: &str, secret: &str) -> Result<Redirect, AuthError> {
        let principal = self
            .store
            .draft(email, secret)
            .inspect_err(|e| SessionLog::log_sign_in_failed("sign-up", e))?;

        // Registered only once the session is persisted
        let redirect = self.establish(&principal, "sign-up")?;
        self.store.register(principal);
        Ok(redirect)
    }

    /// Sign in through an external provider
    ///
    /// The provider's email is looked up and registered on first use with a
    /// secret no password login can match.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The provider flow fails or yields an empty email (`Provider`)
    /// - The record cannot be persisted (`Storage`)
    pub async fn social_login(
        &mut self,
        provider: &dyn SocialProvider,
    ) -> Result<Redirect, AuthError> {
        let method = provider.name().to_string();
        let profile = provider
            .authenticate()
            .await
            .inspect_err(|e| SessionLog::log_sign_in_failed(&method, e))?;

        if profile.email.trim().is_empty() {
            let e = AuthError::Provider(format!("{method} returned no email"));
            SessionLog::log_sign_in_failed(&method, &e);
            return Err(e);
        }

        if let Some(existing) = self.store.find_by_email(&profile.email).cloned() {
            return self.establish(&existing, &method);
        }

        let principal = self
            .store
            .draft(&profile.email, &generate_unusable_secret())?;
        let redirect = self.establish(&principal, &method)?;
        self.store.register(principal);
        Ok(redirect)
    }

    /// Confirm an email belongs to a registered principal
    ///
    /// Does not change the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown email
    pub fn verify_email(&self, email: &str) -> Result<SessionUser, AuthError> {
        self.store
            .find_by_email(email)
            .map(Principal::to_session_user)
            .ok_or(AuthError::UserNotFound)
    }

    /// Issue, persist and adopt a session for `principal`
    fn establish(&mut self, principal: &Principal, method: &str) -> Result<Redirect, AuthError> {
        let token = self.issuer.issue(principal)?;
        let user = principal.to_session_user();
        let user_slot = user
            .to_slot()
            .map_err(|e| AuthError::Storage(format!("user record: {e}")))?;

        self.storage.save(&token, &user_slot)?;
        self.state = AuthState::Authenticated(user);

        SessionLog::log_signed_in(method, principal.id);
        Ok(Redirect::to_dashboard(&self.routes))
    }
}

// =============================================================================
// 4. Sign-out & Re-validation
// =============================================================================

impl SessionManager {
    /// Sign out unconditionally
    ///
    /// Clears both slots and the user; the caller should navigate to the
    /// returned login redirect. Calling it while signed out changes nothing.
    pub fn logout(&mut self) -> Redirect {
        SessionLog::log_signed_out(self.state.user().map(|user| user.id));

        self.clear_storage_quietly();
        self.state = AuthState::Unauthenticated;

        Redirect::to_login(&self.routes)
    }

    /// Re-validate the stored session
    ///
    /// Returns `true` while a complete, unexpired record is stored and adopts
    /// its user, so the state always agrees with the answer. An invalid
    /// record is cleared and the session drops to `Unauthenticated`; so does
    /// an authenticated session whose record disappeared. Never errors.
    ///
    /// Before `restore` has run this answers `false` and changes nothing;
    /// the startup transition and its redirect belong to `restore`.
    pub fn check_auth(&mut self) -> bool {
        if self.state.is_loading() {
            debug!("Session restore pending, deferring re-validation");
            return false;
        }

        match self.stored_session() {
            Ok(Some(user)) => {
                if self.state.user() != Some(&user) {
                    debug!("Adopting stored session for user {}", user.id);
                    self.state = AuthState::Authenticated(user);
                }
                true
            }
            Ok(None) => {
                if self.state.is_authenticated() {
                    debug!("Stored session vanished, signing out");
                    self.state = AuthState::Unauthenticated;
                }
                false
            }
            Err(e) => {
                SessionLog::log_stored_session_rejected(&e.to_string());
                self.clear_storage_quietly();
                self.state = AuthState::Unauthenticated;
                false
            }
        }
    }
}

// =============================================================================
// 5. Route Guarding
// =============================================================================

impl SessionManager {
    /// Apply the redirect decision rule to `path`
    ///
    /// `Waiting` while the restore has not run yet.
    #[must_use]
    pub fn decide(&self, path: &str) -> GuardOutcome {
        route_outcome(
            self.state.is_loading(),
            self.state.is_authenticated(),
            path,
            &self.routes,
        )
    }

    /// Outcome for a guard wrapper around `path`
    #[must_use]
    pub fn guard(&self, path: &str, require_auth: bool) -> GuardOutcome {
        guard_outcome(
            self.state.is_loading(),
            self.state.is_authenticated(),
            path,
            require_auth,
            &self.routes,
        )
    }
}

// =============================================================================
// 6. Accessors
// =============================================================================

impl SessionManager {
    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        self.state.user()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    #[must_use]
    pub const fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }
}

// =============================================================================
// 7. Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;
    use crate::settings::TokenSettings;
    use crate::utils::clock::ManualClock;

    const NOW: i64 = 1_700_000_000_000;

    fn manager_with(storage: &MemoryStorage, clock: &ManualClock) -> SessionManager {
        SessionManager::new(
            CredentialStore::with_principals([Principal::new(
                1,
                "user@example.com",
                "password123",
            )]),
            TokenIssuer::new(&TokenSettings::default(), Arc::new(clock.clone())),
            Box::new(storage.clone()),
            RouteTable::default(),
        )
    }

    #[test]
    fn test_starts_initializing() {
        let manager = manager_with(&MemoryStorage::new(), &ManualClock::new(NOW));

        assert!(manager.is_loading());
        assert!(!manager.is_authenticated());
        assert!(manager.user().is_none());
        assert_eq!(manager.decide("/dashboard"), GuardOutcome::Waiting);
        assert_eq!(manager.guard("/login", false), GuardOutcome::Waiting);
    }

    #[test]
    fn test_restore_empty_storage_on_root() {
        let mut manager = manager_with(&MemoryStorage::new(), &ManualClock::new(NOW));

        let redirect = manager.restore("/");

        assert_eq!(redirect, Some(Redirect::new("/login")));
        assert_eq!(manager.state(), &AuthState::Unauthenticated);
    }

    #[test]
    fn test_restore_runs_once() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);
        let mut manager = manager_with(&storage, &clock);

        assert!(manager.restore("/dashboard").is_some());
        assert!(manager.restore("/dashboard").is_none());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_restore_valid_session() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);

        let mut first = manager_with(&storage, &clock);
        first.restore("/login");
        first.login("user@example.com", "password123").unwrap();

        let mut second = manager_with(&storage, &clock);
        let redirect = second.restore("/login");

        assert_eq!(redirect, Some(Redirect::new("/dashboard")));
        assert_eq!(
            second.user(),
            Some(&SessionUser {
                id: 1,
                email: "user@example.com".to_string()
            })
        );
    }

    #[test]
    fn test_restore_clears_half_record() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);
        let mut writer = manager_with(&storage, &clock);
        writer.restore("/login");
        writer.login("user@example.com", "password123").unwrap();
        storage.remove_raw("user");

        let mut manager = manager_with(&storage, &clock);
        manager.restore("/login");

        assert!(!manager.is_authenticated());
        assert!(storage.get("authToken").is_none());
        assert!(storage.get("user").is_none());
    }

    #[test]
    fn test_restore_clears_unparseable_user_slot() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);
        let mut writer = manager_with(&storage, &clock);
        writer.restore("/login");
        writer.login("user@example.com", "password123").unwrap();
        storage.set_raw("user", "{broken");

        let mut manager = manager_with(&storage, &clock);
        assert_eq!(manager.restore("/otp"), Some(Redirect::new("/login")));
        assert!(storage.get("authToken").is_none());
    }

    #[test]
    fn test_login_failure_touches_nothing() {
        let storage = MemoryStorage::new();
        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/login");

        let result = manager.login("user@example.com", "wrong");

        assert_eq!(result, Err(AuthError::InvalidCredentials));
        assert_eq!(manager.state(), &AuthState::Unauthenticated);
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_login_success_persists_both_slots() {
        let storage = MemoryStorage::new();
        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/login");

        let redirect = manager.login("user@example.com", "password123").unwrap();

        assert_eq!(redirect, Redirect::new("/dashboard"));
        assert!(manager.is_authenticated());
        assert_eq!(
            storage.get("user").as_deref(),
            Some(r#"{"id":1,"email":"user@example.com"}"#)
        );
        let token = storage.get("authToken").unwrap();
        assert_eq!(manager.issuer().decode(&token).unwrap().id, 1);
    }

    #[test]
    fn test_sign_up_then_login() {
        let storage = MemoryStorage::new();
        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/signup");

        manager.sign_up("new@example.com", "pw").unwrap();
        assert_eq!(manager.user().map(|u| u.id), Some(2));

        manager.logout();
        manager.login("new@example.com", "pw").unwrap();
        let token = storage.get("authToken").unwrap();
        assert_eq!(manager.issuer().decode(&token).unwrap().id, 2);
    }

    #[test]
    fn test_sign_up_duplicate() {
        let storage = MemoryStorage::new();
        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/signup");

        let result = manager.sign_up("user@example.com", "other");

        assert_eq!(result, Err(AuthError::DuplicateEmail));
        assert_eq!(manager.credentials().len(), 1);
        assert!(!manager.is_authenticated());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_verify_email() {
        let manager = manager_with(&MemoryStorage::new(), &ManualClock::new(NOW));

        assert_eq!(manager.verify_email("user@example.com").unwrap().id, 1);
        assert_eq!(
            manager.verify_email("ghost@example.com"),
            Err(AuthError::UserNotFound)
        );
        assert!(manager.is_loading());
    }

    #[test]
    fn test_logout_idempotent() {
        let storage = MemoryStorage::new();
        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/login");
        manager.login("user@example.com", "password123").unwrap();

        assert_eq!(manager.logout(), Redirect::new("/login"));
        assert_eq!(manager.logout(), Redirect::new("/login"));
        assert_eq!(manager.state(), &AuthState::Unauthenticated);
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_check_auth_expires_session() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);
        let mut manager = manager_with(&storage, &clock);
        manager.restore("/login");
        manager.login("user@example.com", "password123").unwrap();

        assert!(manager.check_auth());

        clock.advance(3_600_000);
        assert!(!manager.check_auth());
        assert!(!manager.is_authenticated());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_check_auth_when_record_removed() {
        let storage = MemoryStorage::new();
        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/login");
        manager.login("user@example.com", "password123").unwrap();

        storage.remove_raw("authToken");
        storage.remove_raw("user");

        assert!(!manager.check_auth());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_check_auth_before_restore_keeps_startup_redirect() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);
        let mut writer = manager_with(&storage, &clock);
        writer.restore("/login");
        writer.login("user@example.com", "password123").unwrap();
        clock.advance(3_600_000);

        let mut manager = manager_with(&storage, &clock);
        assert!(!manager.check_auth());
        assert!(manager.is_loading());

        assert_eq!(manager.restore("/dashboard"), Some(Redirect::new("/login")));
        assert_eq!(manager.state(), &AuthState::Unauthenticated);
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_check_auth_before_restore_with_valid_record() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);
        let mut writer = manager_with(&storage, &clock);
        writer.restore("/login");
        writer.login("user@example.com", "password123").unwrap();

        let mut manager = manager_with(&storage, &clock);
        assert!(!manager.check_auth());
        assert!(manager.is_loading());
        assert!(!manager.is_authenticated());

        assert_eq!(manager.restore("/login"), Some(Redirect::new("/dashboard")));
        assert!(manager.check_auth());
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_check_auth_adopts_stored_session() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(NOW);
        let mut signed_out = manager_with(&storage, &clock);
        signed_out.restore("/login");

        let mut other = manager_with(&storage, &clock);
        other.restore("/login");
        other.sign_up("second@example.com", "pw").unwrap();

        assert!(signed_out.check_auth());
        assert_eq!(
            signed_out.user(),
            Some(&SessionUser {
                id: 2,
                email: "second@example.com".to_string()
            })
        );
        assert_eq!(signed_out.is_authenticated(), signed_out.check_auth());
    }

    #[test]
    fn test_sign_up_storage_failure_registers_nothing() {
        use crate::testing::FailingStorage;

        let mut manager = SessionManager::new(
            CredentialStore::with_principals([Principal::new(
                1,
                "user@example.com",
                "password123",
            )]),
            TokenIssuer::new(&TokenSettings::default(), Arc::new(ManualClock::new(NOW))),
            Box::new(FailingStorage::new()),
            RouteTable::default(),
        );
        manager.restore("/signup");

        for _ in 0..2 {
            let result = manager.sign_up("new@example.com", "pw");
            assert!(matches!(result, Err(AuthError::Storage(_))));
        }
        assert_eq!(manager.credentials().len(), 1);
        assert!(manager.credentials().find_by_email("new@example.com").is_none());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_token_for_unknown_principal_still_restores() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let storage = MemoryStorage::new();
        let payload = STANDARD.encode(format!(
            r#"{{"id":42,"email":"gone@example.com","exp":{}}}"#,
            NOW + 1_000
        ));
        storage.set_raw("authToken", &format!("h.{payload}.s"));
        storage.set_raw("user", r#"{"id":42,"email":"gone@example.com"}"#);

        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/dashboard");

        assert!(manager.is_authenticated());
        assert_eq!(manager.user().map(|u| u.id), Some(42));
    }

    #[test]
    fn test_guard_after_restore() {
        let storage = MemoryStorage::new();
        let mut manager = manager_with(&storage, &ManualClock::new(NOW));
        manager.restore("/pricing");

        assert_eq!(
            manager.guard("/dashboard", true),
            GuardOutcome::Redirect(Redirect::new("/login"))
        );
        assert_eq!(manager.guard("/login", false), GuardOutcome::Render);

        manager.login("user@example.com", "password123").unwrap();
        assert_eq!(manager.guard("/dashboard", true), GuardOutcome::Render);
        assert_eq!(
            manager.decide("/signup"),
            GuardOutcome::Redirect(Redirect::new("/dashboard"))
        );
    }
}
