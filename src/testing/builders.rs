//! Fluent builder for session managers wired to test doubles
//!
//! The built [`TestSession`] keeps handles to the manager's storage and clock
//! so tests can inspect raw slots and move time forward.

use crate::credentials::CredentialStore;
use crate::models::Principal;
use crate::routing::RouteTable;
use crate::session::{MemoryStorage, SessionManager, SessionStorage, StorageKeys};
use crate::settings::{RouteSettings, TokenSettings};
use crate::token::{TokenIssuer, TokenSigning};
use crate::utils::clock::ManualClock;

use super::constants::{TEST_EMAIL, TEST_NOW_MS, TEST_SECRET, TEST_SIGNING_SECRET, TEST_USER_ID};

/// A session manager plus handles to its storage and clock
pub struct TestSession {
    pub manager: SessionManager,
    pub storage: MemoryStorage,
    pub clock: ManualClock,
}

impl TestSession {
    /// Another manager over the same storage and clock, still `Initializing`
    ///
    /// Models an application restart.
    #[must_use]
    pub fn restart(&self) -> SessionManager {
        SessionManager::new(
            self.manager.credentials().clone(),
            self.manager.issuer().clone(),
            Box::new(self.storage.clone()),
            self.manager.routes().clone(),
        )
    }

    /// Raw token slot
    #[must_use]
    pub fn stored_token(&self) -> Option<String> {
        self.storage.get(&self.storage.keys().token_key)
    }

    /// Raw user slot
    #[must_use]
    pub fn stored_user(&self) -> Option<String> {
        self.storage.get(&self.storage.keys().user_key)
    }
}

/// Builder for [`TestSession`]
pub struct TestSessionBuilder {
    principals: Vec<Principal>,
    token: TokenSettings,
    routes: RouteSettings,
    keys: StorageKeys,
    now_ms: i64,
    storage: Option<Box<dyn SessionStorage>>,
}

impl TestSessionBuilder {
    /// Seeded demo principal, unsigned tokens, default routes
    #[must_use]
    pub fn new() -> Self {
        Self {
            principals: vec![Principal::new(TEST_USER_ID, TEST_EMAIL, TEST_SECRET)],
            token: TokenSettings::default(),
            routes: RouteSettings::default(),
            keys: StorageKeys::default(),
            now_ms: TEST_NOW_MS,
            storage: None,
        }
    }

    /// Add a principal to the seeded store
    #[must_use]
    pub fn with_principal(mut self, id: u64, email: &str, secret: &str) -> Self {
        self.principals.push(Principal::new(id, email, secret));
        self
    }

    /// Start with an empty credential store
    #[must_use]
    pub fn without_principals(mut self) -> Self {
        self.principals.clear();
        self
    }

    #[must_use]
    pub const fn with_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.token.ttl_ms = ttl_ms;
        self
    }

    /// Sign tokens with HMAC-SHA256 under the test key
    #[must_use]
    pub fn with_hmac_signing(mut self) -> Self {
        self.token.signing = TokenSigning::HmacSha256;
        self.token.signing_secret = TEST_SIGNING_SECRET.to_string();
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteSettings) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub fn with_storage_keys(mut self, token_key: &str, user_key: &str) -> Self {
        self.keys = StorageKeys {
            token_key: token_key.to_string(),
            user_key: user_key.to_string(),
        };
        self
    }

    /// Manual clock start instant
    #[must_use]
    pub const fn at(mut self, now_ms: i64) -> Self {
        self.now_ms = now_ms;
        self
    }

    /// Give the manager a different backend
    ///
    /// The returned `TestSession::storage` is then detached from the manager.
    #[must_use]
    pub fn with_storage(mut self, storage: Box<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// # Panics
    ///
    /// Panics if the configured routes are invalid.
    #[must_use]
    pub fn build(self) -> TestSession {
        let clock = ManualClock::new(self.now_ms);
        let storage = MemoryStorage::with_keys(self.keys);
        let routes = RouteTable::from_settings(&self.routes).expect("valid test routes");
        let backend = self
            .storage
            .unwrap_or_else(|| Box::new(storage.clone()));

        let manager = SessionManager::new(
            CredentialStore::with_principals(self.principals),
            TokenIssuer::new(&self.token, std::sync::Arc::new(clock.clone())),
            backend,
            routes,
        );

        TestSession {
            manager,
            storage,
            clock,
        }
    }
}

impl Default for TestSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
