//! Mock objects and fake implementations for testing

use crate::models::auth::AuthError;
use crate::routing::{Navigator, Redirect};
use crate::session::{PersistedSlots, SessionStorage, SocialProfile, SocialProvider};
use async_trait::async_trait;

/// Navigator that remembers every navigation it was asked to perform
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    pub visited: Vec<Redirect>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.visited.last().map(|r| r.target.as_str())
    }

    #[must_use]
    pub fn targets(&self) -> Vec<&str> {
        self.visited.iter().map(|r| r.target.as_str()).collect()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, redirect: &Redirect) {
        self.visited.push(redirect.clone());
    }
}

/// Social provider that always returns the same email
pub struct StaticProvider {
    name: String,
    email: String,
}

impl StaticProvider {
    #[must_use]
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[must_use]
    pub fn google(email: &str) -> Self {
        Self::new("google", email)
    }
}

#[async_trait]
impl SocialProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&self) -> Result<SocialProfile, AuthError> {
        Ok(SocialProfile::new(self.email.clone()))
    }
}

/// Social provider whose flow always fails
pub struct FailingProvider {
    name: String,
    reason: String,
}

impl FailingProvider {
    #[must_use]
    pub fn new(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl SocialProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&self) -> Result<SocialProfile, AuthError> {
        Err(AuthError::Provider(self.reason.clone()))
    }
}

/// Backend that cannot be written
///
/// Reads return the slots it was constructed with.
#[derive(Debug, Default, Clone)]
pub struct FailingStorage {
    slots: PersistedSlots,
}

impl FailingStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_slots(token: Option<&str>, user: Option<&str>) -> Self {
        Self {
            slots: PersistedSlots {
                token: token.map(ToString::to_string),
                user: user.map(ToString::to_string),
            },
        }
    }
}

impl SessionStorage for FailingStorage {
    fn load(&self) -> Result<PersistedSlots, AuthError> {
        Ok(self.slots.clone())
    }

    fn save(&mut self, _token: &str, _user: &str) -> Result<(), AuthError> {
        Err(AuthError::Storage("storage is read-only".to_string()))
    }

    fn clear(&mut self) -> Result<(), AuthError> {
        Err(AuthError::Storage("storage is read-only".to_string()))
    }
}
