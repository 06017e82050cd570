//! Redirect decision rule and guard wrapper outcomes
//!
//! Decisions here are pure functions of the session flags and the route
//! classification. Performing the navigation is left to a [`Navigator`].

use super::table::{RouteClass, RouteTable};
use crate::utils::logging::SessionLog;
use log::info;
use serde::{Deserialize, Serialize};

/// A navigation the caller must perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub target: String,
}

impl Redirect {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    #[must_use]
    pub fn to_login(routes: &RouteTable) -> Self {
        Self::new(routes.login_path())
    }

    #[must_use]
    pub fn to_dashboard(routes: &RouteTable) -> Self {
        Self::new(routes.dashboard_path())
    }
}

/// Outcome of the redirect decision rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested content
    Allow,
    /// Navigate elsewhere instead
    Redirect(Redirect),
}

/// What a guarded view should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the guarded children
    Render,
    /// Session restore still running; render a neutral waiting indicator
    Waiting,
    /// Render the fallback while navigating to the redirect target
    Redirect(Redirect),
}

impl GuardOutcome {
    #[must_use]
    pub const fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirect(redirect) => Some(redirect),
            Self::Render | Self::Waiting => None,
        }
    }
}

impl From<RouteDecision> for GuardOutcome {
    fn from(decision: RouteDecision) -> Self {
        match decision {
            RouteDecision::Allow => Self::Render,
            RouteDecision::Redirect(redirect) => Self::Redirect(redirect),
        }
    }
}

/// The redirect decision rule
///
/// - Authenticated on a public path or the root: go to the dashboard
/// - Unauthenticated on a protected path or the root: go to login
/// - Anything else renders as requested
#[must_use]
pub fn redirect_decision(
    is_authenticated: bool,
    class: RouteClass,
    routes: &RouteTable,
) -> RouteDecision {
    match (is_authenticated, class) {
        (true, RouteClass::Public | RouteClass::Root) => {
            RouteDecision::Redirect(Redirect::to_dashboard(routes))
        }
        (false, RouteClass::Protected | RouteClass::Root) => {
            RouteDecision::Redirect(Redirect::to_login(routes))
        }
        _ => RouteDecision::Allow,
    }
}

/// Apply the decision rule to a path, suppressed while loading
#[must_use]
pub fn route_outcome(
    is_loading: bool,
    is_authenticated: bool,
    path: &str,
    routes: &RouteTable,
) -> GuardOutcome {
    if is_loading {
        return GuardOutcome::Waiting;
    }

    let outcome = GuardOutcome::from(redirect_decision(
        is_authenticated,
        routes.classify(path),
        routes,
    ));
    if let Some(redirect) = outcome.redirect() {
        SessionLog::log_redirect(path, &redirect.target);
    }
    outcome
}

/// Outcome for a guard wrapper around `path`
///
/// A wrapper with `require_auth` sends unauthenticated visitors to login; a
/// wrapper without it (login/signup screens) sends authenticated visitors to
/// the dashboard.
#[must_use]
pub fn guard_outcome(
    is_loading: bool,
    is_authenticated: bool,
    path: &str,
    require_auth: bool,
    routes: &RouteTable,
) -> GuardOutcome {
    if is_loading {
        return GuardOutcome::Waiting;
    }

    let redirect = match (require_auth, is_authenticated) {
        (true, false) => Redirect::to_login(routes),
        (false, true) => Redirect::to_dashboard(routes),
        _ => return GuardOutcome::Render,
    };

    SessionLog::log_redirect(path, &redirect.target);
    GuardOutcome::Redirect(redirect)
}

/// Performs navigation decided by the session manager or a guard
pub trait Navigator {
    fn navigate(&mut self, redirect: &Redirect);
}

/// Navigator that only records the navigation in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, redirect: &Redirect) {
        info!("➡️  Navigate to {}", redirect.target);
    }
}
