//! Session data models
//!
//! Plain data carried between the credential store, the token issuer and the
//! session manager, plus the read model handed to the rendering layer.

pub mod auth;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered user record held by the credential store
///
/// The secret is kept in plaintext, matching the in-bundle user list this
/// store stands in for. It never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: u64,
    pub email: String,
    pub secret: String,
}

impl Principal {
    /// Create a new `Principal`
    pub fn new(id: u64, email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            secret: secret.into(),
        }
    }

    /// The `{id, email}` projection stored in the `user` slot
    #[must_use]
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// User projection persisted alongside the token and exposed to the UI
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub id: u64,
    pub email: String,
}

impl SessionUser {
    /// Serialize to the persisted `user` slot format: `{"id":1,"email":"..."}`
    ///
    /// # Errors
    /// Returns an error if JSON serialization fails
    pub fn to_slot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the persisted `user` slot
    ///
    /// # Errors
    /// Returns an error if the slot does not hold a `{id, email}` object
    pub fn from_slot(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Decoded token payload
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenClaims {
    pub id: u64,
    pub email: String,
    /// Absolute expiry in epoch milliseconds
    pub exp: i64,
}

impl TokenClaims {
    #[must_use]
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// Read model consumed by the rendering layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<SessionUser>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}
