//! Authentication error types
//!
//! One closed enumeration covers every failure the credential store, token
//! validator and storage backends can raise. Interactive callers show
//! [`AuthError::user_message`] inline; the session manager folds token and
//! storage failures into "not authenticated" during restore and re-validation.

use thiserror::Error;

/// Common error type for session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Login with an unknown email or a wrong secret
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-up with an email already present in the credential store
    #[error("Email already registered")]
    DuplicateEmail,

    /// Email verification for an unknown email
    #[error("User not found")]
    UserNotFound,

    /// Token structure, encoding or signature is unusable
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token decoded but its expiry has passed
    #[error("Token expired")]
    ExpiredToken,

    /// Persistence backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Social login provider failure
    #[error("Social provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Message shown next to the form that triggered the error
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password",
            Self::DuplicateEmail => "User already exists",
            Self::UserNotFound => "User not found",
            Self::MalformedToken(_) | Self::ExpiredToken => {
                "Your session has ended. Please sign in again"
            }
            Self::Storage(_) => "Unable to save your session. Please try again",
            Self::Provider(_) => "Social login failed. Please try again",
        }
    }

    /// True for failures that mean "the stored session is unusable"
    #[must_use]
    pub const fn is_token_error(&self) -> bool {
        matches!(self, Self::MalformedToken(_) | Self::ExpiredToken)
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedToken(err.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
