//! Testing utilities for sessionguard
//!
//! Shared by the unit tests and, behind the `testing` feature, the
//! integration tests under `tests/`.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built settings, stores, clocks and tokens
//! - [`builders`] - Fluent builder for a session manager wired to test doubles
//! - [`assertions`] - Assertion helpers for session state and redirects
//! - [`mock`] - Recording navigator, canned social providers, failing storage
//!
//! ## Usage
//!
//! ```ignore
//! use sessionguard::testing::{constants::TEST_EMAIL, constants::TEST_SECRET, TestFixtures};
//!
//! let mut session = TestFixtures::session();
//! session.manager.restore("/login");
//! session.manager.login(TEST_EMAIL, TEST_SECRET).unwrap();
//! assert!(session.manager.is_authenticated());
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mock;

// Re-export commonly used items for convenience
pub use assertions::*;
pub use builders::{TestSession, TestSessionBuilder};
pub use fixtures::TestFixtures;
pub use mock::{FailingProvider, FailingStorage, RecordingNavigator, StaticProvider};

/// Common test constants
pub mod constants {
    /// Email of the seeded demo principal
    pub const TEST_EMAIL: &str = "user@example.com";

    /// Secret of the seeded demo principal
    pub const TEST_SECRET: &str = "password123";

    /// Id of the seeded demo principal
    pub const TEST_USER_ID: u64 = 1;

    /// Email not present in the seeded store
    pub const NEW_EMAIL: &str = "new@example.com";

    /// Fixed "now" for manual clocks (2023-11-14T22:13:20Z)
    pub const TEST_NOW_MS: i64 = 1_700_000_000_000;

    /// HMAC key for signed-token tests
    pub const TEST_SIGNING_SECRET: &str = "test_key_32_bytes_long_for_test_";

    /// Paths the default route table treats as protected
    pub const PROTECTED_PATHS: &[&str] = &[
        "/dashboard",
        "/verify-email",
        "/activate-2fa",
        "/activate-mfa",
        "/otp",
    ];

    /// Paths the default route table treats as public
    pub const PUBLIC_PATHS: &[&str] = &["/login", "/signup"];
}
