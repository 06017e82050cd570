//! Test fixtures providing pre-built test objects

use crate::credentials::CredentialStore;
use crate::models::{Principal, TokenClaims};
use crate::settings::{SessionGuardSettings, StorageBackend};
use crate::token::TokenIssuer;
use crate::utils::clock::ManualClock;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use std::sync::Arc;

use super::builders::{TestSession, TestSessionBuilder};
use super::constants::{TEST_EMAIL, TEST_NOW_MS, TEST_SECRET, TEST_USER_ID};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Default settings: demo principal, memory backend, default routes
    #[must_use]
    pub fn settings() -> SessionGuardSettings {
        SessionGuardSettings::default()
    }

    /// Default settings pointed at a file backend under `dir`
    #[must_use]
    pub fn file_settings(dir: &Path) -> SessionGuardSettings {
        let mut settings = Self::settings();
        settings.storage.backend = StorageBackend::File;
        settings.storage.path = dir.join("session.json").display().to_string();
        settings
    }

    #[must_use]
    pub fn principal() -> Principal {
        Principal::new(TEST_USER_ID, TEST_EMAIL, TEST_SECRET)
    }

    #[must_use]
    pub fn credential_store() -> CredentialStore {
        CredentialStore::with_principals([Self::principal()])
    }

    #[must_use]
    pub fn clock() -> ManualClock {
        ManualClock::new(TEST_NOW_MS)
    }

    /// Unsigned issuer on `clock` with the default lifetime
    #[must_use]
    pub fn issuer(clock: &ManualClock) -> TokenIssuer {
        TokenIssuer::new(&Self::settings().token, Arc::new(clock.clone()))
    }

    /// Fresh manager still `Initializing`
    #[must_use]
    pub fn session() -> TestSession {
        TestSessionBuilder::new().build()
    }

    /// Manager restored from empty storage on `/login`
    #[must_use]
    pub fn signed_out_session() -> TestSession {
        let mut session = Self::session();
        session.manager.restore("/login");
        session
    }

    /// Manager signed in as the demo principal
    ///
    /// # Panics
    ///
    /// Panics if the demo login fails.
    #[must_use]
    pub fn signed_in_session() -> TestSession {
        let mut session = Self::signed_out_session();
        session
            .manager
            .login(TEST_EMAIL, TEST_SECRET)
            .expect("demo login succeeds");
        session
    }

    /// Hand-built token in the issued wire format
    ///
    /// # Panics
    ///
    /// Panics if the claims cannot be serialized.
    #[must_use]
    pub fn token_with_claims(claims: &TokenClaims) -> String {
        let header = STANDARD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = STANDARD.encode(serde_json::to_string(claims).expect("claims serialize"));
        format!("{header}.{payload}.signature")
    }

    /// Demo principal token that expired one second before `now_ms`
    #[must_use]
    pub fn expired_token(now_ms: i64) -> String {
        Self::token_with_claims(&TokenClaims {
            id: TEST_USER_ID,
            email: TEST_EMAIL.to_string(),
            exp: now_ms - 1_000,
        })
    }

    /// User slot JSON for the demo principal
    #[must_use]
    pub fn user_slot() -> String {
        format!(r#"{{"id":{TEST_USER_ID},"email":"{TEST_EMAIL}"}}"#)
    }
}
