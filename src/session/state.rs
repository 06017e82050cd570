use crate::models::{SessionSnapshot, SessionUser};

/// Authentication state held by the session manager
///
/// `Initializing` lasts until the startup restore has run. There is no way
/// back into it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Initializing,
    Unauthenticated,
    Authenticated(SessionUser),
}

impl AuthState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Initializing | Self::Unauthenticated => None,
        }
    }

    /// Read model for the rendering layer
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user().cloned(),
            is_authenticated: self.is_authenticated(),
            is_loading: self.is_loading(),
        }
    }
}
