//! Assertion helpers for session state and redirects

use crate::routing::{GuardOutcome, Redirect};
use crate::session::{AuthState, MemoryStorage, SessionManager, SessionStorage};

/// Assert that an operation asked for a navigation to `target`
///
/// # Panics
///
/// Panics if there is no redirect or it points elsewhere.
pub fn assert_redirect(redirect: Option<&Redirect>, target: &str) {
    match redirect {
        Some(redirect) => assert_eq!(
            redirect.target, target,
            "Expected redirect to '{target}', got '{}'",
            redirect.target
        ),
        None => panic!("Expected redirect to '{target}', got none"),
    }
}

/// Assert that a guard outcome redirects to `target`
///
/// # Panics
///
/// Panics if the outcome is not a redirect to `target`.
pub fn assert_guard_redirect(outcome: &GuardOutcome, target: &str) {
    assert_redirect(outcome.redirect(), target);
}

/// Assert that the manager is signed in as the given principal
///
/// # Panics
///
/// Panics if the manager is not authenticated as `id`/`email`.
pub fn assert_authenticated_as(manager: &SessionManager, id: u64, email: &str) {
    match manager.state() {
        AuthState::Authenticated(user) => {
            assert_eq!(user.id, id, "Expected user id {id}, got {}", user.id);
            assert_eq!(user.email, email);
        }
        other => panic!("Expected authenticated session for {email}, got {other:?}"),
    }
}

/// Assert that restore has run and nobody is signed in
///
/// # Panics
///
/// Panics unless the state is `Unauthenticated`.
pub fn assert_unauthenticated(manager: &SessionManager) {
    assert_eq!(
        manager.state(),
        &AuthState::Unauthenticated,
        "Expected unauthenticated session"
    );
    let snapshot = manager.snapshot();
    assert!(snapshot.user.is_none());
    assert!(!snapshot.is_loading);
}

/// Assert that neither slot is stored
///
/// # Panics
///
/// Panics if either slot is present or the backend cannot be read.
pub fn assert_slots_absent(storage: &MemoryStorage) {
    let slots = storage.load().expect("memory storage readable");
    assert!(
        slots.is_empty(),
        "Expected no stored session, found {slots:?}"
    );
}

/// Assert that both slots are stored
///
/// # Panics
///
/// Panics if either slot is missing or the backend cannot be read.
pub fn assert_slots_present(storage: &MemoryStorage) {
    let slots = storage.load().expect("memory storage readable");
    assert!(slots.token.is_some(), "Expected a stored token");
    assert!(slots.user.is_some(), "Expected a stored user record");
}
