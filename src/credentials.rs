//! In-memory credential store
//!
//! The only "backend" the dashboard has: a list of known principals matched by
//! plain equality. There is no update or delete.

use crate::models::auth::AuthError;
use crate::models::Principal;
use log::{debug, warn};

/// Registry of known principals
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    principals: Vec<Principal>,
}

impl CredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given principals
    ///
    /// Later entries reusing an id or an email already seeded are skipped.
    pub fn with_principals(principals: impl IntoIterator<Item = Principal>) -> Self {
        let mut store = Self::new();
        for principal in principals {
            if store.find_by_id(principal.id).is_some() {
                warn!("Skipping seed principal with duplicate id {}", principal.id);
                continue;
            }
            if store.find_by_email(&principal.email).is_some() {
                warn!("Skipping seed principal {} with duplicate email", principal.id);
                continue;
            }
            store.principals.push(principal);
        }
        store
    }

    /// Exact match on both email and secret
    #[must_use]
    pub fn find_by_email_and_secret(&self, email: &str, secret: &str) -> Option<&Principal> {
        self.principals
            .iter()
            .find(|p| p.email == email && p.secret == secret)
    }

    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<&Principal> {
        self.principals.iter().find(|p| p.email == email)
    }

    #[must_use]
    pub fn find_by_id(&self, id: u64) -> Option<&Principal> {
        self.principals.iter().find(|p| p.id == id)
    }

    /// Register a new principal
    ///
    /// # Errors
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    /// The store is left untouched in that case.
    pub fn create(&mut self, email: &str, secret: &str) -> Result<Principal, AuthError> {
        let principal = self.draft(email, secret)?;
        self.register(principal.clone());
        Ok(principal)
    }

    /// Build the principal `create` would add, without adding it
    ///
    /// Lets a caller finish work that can fail before committing the
    /// principal with [`CredentialStore::register`].
    ///
    /// # Errors
    /// Returns `AuthError::DuplicateEmail` if the email is already registered
    pub fn draft(&self, email: &str, secret: &str) -> Result<Principal, AuthError> {
        if self.find_by_email(email).is_some() {
            return Err(AuthError::DuplicateEmail);
        }
        Ok(Principal::new(self.next_id(), email, secret))
    }

    /// Add a drafted principal
    ///
    /// A principal whose id or email is already taken is ignored, so a stale
    /// draft can never shadow an existing record.
    pub fn register(&mut self, principal: Principal) {
        if self.find_by_id(principal.id).is_some() || self.find_by_email(&principal.email).is_some()
        {
            warn!("Ignoring stale draft for principal {}", principal.id);
            return;
        }
        debug!("Registered principal {}", principal.id);
        self.principals.push(principal);
    }

    fn next_id(&self) -> u64 {
        self.principals.iter().map(|p| p.id).max().map_or(1, |max| max + 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}
