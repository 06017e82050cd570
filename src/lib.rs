#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the sessionguard library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod credentials;
pub mod models;
pub mod routing;
pub mod session;
pub mod settings;
pub mod token;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use credentials::CredentialStore;
pub use models::auth::AuthError;
pub use models::{Principal, SessionSnapshot, SessionUser, TokenClaims};
pub use routing::{GuardOutcome, Navigator, Redirect, RouteClass, RouteDecision, RouteTable};
pub use session::{
    AuthState, FileStorage, MemoryStorage, SessionManager, SessionStorage, SharedSessionManager,
    SocialProvider,
};
pub use settings::SessionGuardSettings;
pub use token::TokenIssuer;
