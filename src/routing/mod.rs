//! Route classification and guard decisions
//!
//! # Modules
//!
//! - [`table`] - Static partition of known paths into public/protected/root
//! - [`guard`] - Pure redirect decision rule and guard wrapper outcomes
//! - [`path_validator`] - Same-origin checks for configured route paths

pub mod guard;
pub mod path_validator;
pub mod table;

pub use guard::{
    guard_outcome, redirect_decision, route_outcome, GuardOutcome, LogNavigator, Navigator,
    Redirect, RouteDecision,
};
pub use path_validator::{validate_route_path, InvalidRoutePath};
pub use table::{normalize_path, RouteClass, RouteTable};
