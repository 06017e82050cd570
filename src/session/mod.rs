//! Session Management Module
//!
//! Holds the authentication state machine, persists it to a key/value store
//! and answers route-guard questions against it.
//!
//! # Modules
//!
//! - [`manager`] - The session state machine and its operations
//! - [`state`] - `AuthState` and the snapshot handed to the rendering layer
//! - [`storage`] - Persisted record backends (memory, file)
//! - [`shared`] - Single-writer handle for concurrent hosts
//! - [`social`] - Social login provider seam

pub mod manager;
pub mod shared;
pub mod social;
pub mod state;
pub mod storage;

// Re-export commonly used items for convenience
pub use manager::SessionManager;
pub use shared::SharedSessionManager;
pub use social::{SocialProfile, SocialProvider};
pub use state::AuthState;
pub use storage::{FileStorage, MemoryStorage, PersistedSlots, SessionStorage, StorageKeys};
