//! Social login seam
//!
//! A provider runs whatever external flow it needs and hands back a verified
//! email. The session manager then finds or registers the principal for it.

use crate::models::auth::AuthError;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

/// Identity returned by a completed social login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    pub email: String,
}

impl SocialProfile {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// External identity provider used by `social_login`
#[async_trait]
pub trait SocialProvider: Send + Sync {
    /// Provider name for logging (e.g. "google", "apple")
    fn name(&self) -> &str;

    /// Run the provider flow to completion
    ///
    /// # Errors
    /// Returns `AuthError::Provider` if the flow fails or is abandoned
    async fn authenticate(&self) -> Result<SocialProfile, AuthError>;
}

/// Secret for principals created through social login
///
/// 32 random bytes, so a password login can never match it.
pub(crate) fn generate_unusable_secret() -> String {
    let mut secret = [0u8; 32];
    rand::rng().fill_bytes(&mut secret);
    format!("social:{}", URL_SAFE_NO_PAD.encode(secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secrets_differ() {
        let first = generate_unusable_secret();
        let second = generate_unusable_secret();

        assert!(first.starts_with("social:"));
        assert_ne!(first, second);
    }
}
