//! Static route classification
//!
//! Known paths are partitioned into routes that only make sense signed out
//! (login, signup), routes that require a session (dashboard and the
//! verification/2FA screens) and the root landing path whose destination
//! depends on the session.

use super::path_validator::{validate_route_path, InvalidRoutePath};
use crate::settings::RouteSettings;
use std::borrow::Cow;

/// Classification of a requested path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Accessible only while unauthenticated
    Public,
    /// Accessible only while authenticated
    Protected,
    /// Landing path, destination depends on auth state
    Root,
    /// No guard rule applies
    Unclassified,
}

/// Partition of known paths plus the two redirect targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    root: String,
    login_path: String,
    dashboard_path: String,
    public: Vec<String>,
    protected: Vec<String>,
}

impl RouteTable {
    /// Build a table from route settings, validating every path
    ///
    /// # Errors
    /// Returns `InvalidRoutePath` if any configured path is not a safe
    /// same-origin path, if the root appears in the public or protected list,
    /// or if a path is listed as both public and protected
    pub fn from_settings(settings: &RouteSettings) -> Result<Self, InvalidRoutePath> {
        let root = normalize_path(&validate_route_path(&settings.root)?);
        let login_path = normalize_path(&validate_route_path(&settings.login_path)?);
        let dashboard_path = normalize_path(&validate_route_path(&settings.dashboard_path)?);

        let public = Self::collect(&settings.public, &root)?;
        let protected = Self::collect(&settings.protected, &root)?;

        if let Some(overlap) = public.iter().find(|p| protected.contains(p)) {
            return Err(InvalidRoutePath {
                path: overlap.clone(),
                reason: "listed as both public and protected",
            });
        }

        Ok(Self {
            root,
            login_path,
            dashboard_path,
            public,
            protected,
        })
    }

    fn collect(paths: &[String], root: &str) -> Result<Vec<String>, InvalidRoutePath> {
        paths
            .iter()
            .map(|path| {
                let normalized = normalize_path(&validate_route_path(path)?);
                if normalized == root {
                    return Err(InvalidRoutePath {
                        path: path.clone(),
                        reason: "root path cannot be public or protected",
                    });
                }
                Ok(normalized)
            })
            .collect()
    }

    /// Classify a requested path
    ///
    /// Query strings and fragments are ignored, percent-encoding is decoded
    /// and a trailing slash is dropped. Entries match exactly or as a
    /// `/`-bounded prefix, so `/dashboard/web-integrations` is protected.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_path(path);

        if path == self.root {
            RouteClass::Root
        } else if self.public.iter().any(|entry| matches_entry(entry, &path)) {
            RouteClass::Public
        } else if self.protected.iter().any(|entry| matches_entry(entry, &path)) {
            RouteClass::Protected
        } else {
            RouteClass::Unclassified
        }
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }

    #[must_use]
    pub fn public_paths(&self) -> &[String] {
        &self.public
    }

    #[must_use]
    pub fn protected_paths(&self) -> &[String] {
        &self.protected
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        let settings = RouteSettings::default();
        Self {
            root: settings.root,
            login_path: settings.login_path,
            dashboard_path: settings.dashboard_path,
            public: settings.public,
            protected: settings.protected,
        }
    }
}

fn matches_entry(entry: &str, path: &str) -> bool {
    path.strip_prefix(entry)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Canonical form used for classification
///
/// Drops query and fragment, percent-decodes, then resolves the path as
/// segments: empty and `.` segments vanish and `..` removes the previous
/// segment (never climbing above the root). The result has a leading slash
/// and no trailing slash; the bare root stays `/`.
///
/// Query and fragment are split off before decoding, so an encoded `%3F` or
/// `%23` is part of a segment rather than a delimiter: `/login%3Fx` is the
/// path `/login?x`, not `/login`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.trim().split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let routes = RouteTable::default();

        assert_eq!(routes.classify("/"), RouteClass::Root);
        assert_eq!(routes.classify("/login"), RouteClass::Public);
        assert_eq!(routes.classify("/signup"), RouteClass::Public);
        assert_eq!(routes.classify("/dashboard"), RouteClass::Protected);
        assert_eq!(routes.classify("/verify-email"), RouteClass::Protected);
        assert_eq!(routes.classify("/activate-2fa"), RouteClass::Protected);
        assert_eq!(routes.classify("/activate-mfa"), RouteClass::Protected);
        assert_eq!(routes.classify("/otp"), RouteClass::Protected);
        assert_eq!(routes.classify("/pricing"), RouteClass::Unclassified);
    }

    #[test]
    fn test_dot_segments_resolved_before_matching() {
        let routes = RouteTable::default();

        assert_eq!(normalize_path("/dashboard/%2e%2e/login"), "/login");
        assert_eq!(routes.classify("/dashboard/%2e%2e/login"), RouteClass::Public);
        assert_eq!(routes.classify("/dashboard/../login"), RouteClass::Public);
        assert_eq!(routes.classify("/login/../dashboard"), RouteClass::Protected);
        assert_eq!(routes.classify("/./otp"), RouteClass::Protected);
        assert_eq!(routes.classify("/../../dashboard"), RouteClass::Protected);
        assert_eq!(routes.classify("/dashboard/.."), RouteClass::Root);
        assert_eq!(routes.classify("//dashboard//web"), RouteClass::Protected);
    }

    #[test]
    fn test_encoded_delimiters_stay_in_path() {
        let routes = RouteTable::default();

        assert_eq!(normalize_path("/login%3Fx"), "/login?x");
        assert_eq!(routes.classify("/login%3Fx"), RouteClass::Unclassified);
        assert_eq!(routes.classify("/login?next=%2Fdashboard"), RouteClass::Public);
    }

    #[test]
    fn test_nested_protected_paths() {
        let routes = RouteTable::default();

        assert_eq!(
            routes.classify("/dashboard/store-payments"),
            RouteClass::Protected
        );
        assert_eq!(
            routes.classify("/dashboard/web-integrations/"),
            RouteClass::Protected
        );
        assert_eq!(routes.classify("/dashboards"), RouteClass::Unclassified);
        assert_eq!(routes.classify("/loginx"), RouteClass::Unclassified);
    }

    #[test]
    fn test_classification_ignores_query_fragment_and_encoding() {
        let routes = RouteTable::default();

        assert_eq!(routes.classify("/login?next=/dashboard"), RouteClass::Public);
        assert_eq!(routes.classify("/dashboard#top"), RouteClass::Protected);
        assert_eq!(routes.classify("/%64ashboard"), RouteClass::Protected);
        assert_eq!(routes.classify(""), RouteClass::Root);
        assert_eq!(routes.classify("/?tab=1"), RouteClass::Root);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/dashboard/"), "/dashboard");
        assert_eq!(normalize_path("dashboard"), "/dashboard");
        assert_eq!(normalize_path("///"), "/");
        assert_eq!(normalize_path("/login?x=1#y"), "/login");
    }

    #[test]
    fn test_from_settings_matches_default() {
        let routes = RouteTable::from_settings(&RouteSettings::default()).unwrap();
        assert_eq!(routes, RouteTable::default());
    }

    #[test]
    fn test_from_settings_rejects_bad_paths() {
        let settings = RouteSettings {
            login_path: "https://evil.com/login".to_string(),
            ..RouteSettings::default()
        };
        assert!(RouteTable::from_settings(&settings).is_err());

        let settings = RouteSettings {
            public: vec!["/".to_string()],
            ..RouteSettings::default()
        };
        assert!(RouteTable::from_settings(&settings).is_err());

        let settings = RouteSettings {
            public: vec!["/login".to_string(), "/otp".to_string()],
            ..RouteSettings::default()
        };
        assert_eq!(
            RouteTable::from_settings(&settings).unwrap_err().reason,
            "listed as both public and protected"
        );
    }

    #[test]
    fn test_custom_routes() {
        let settings = RouteSettings {
            root: "/".to_string(),
            login_path: "/auth/login".to_string(),
            dashboard_path: "/app".to_string(),
            public: vec!["/auth".to_string()],
            protected: vec!["/app".to_string()],
        };
        let routes = RouteTable::from_settings(&settings).unwrap();

        assert_eq!(routes.classify("/auth/signup"), RouteClass::Public);
        assert_eq!(routes.classify("/app/settings"), RouteClass::Protected);
        assert_eq!(routes.classify("/dashboard"), RouteClass::Unclassified);
        assert_eq!(routes.login_path(), "/auth/login");
        assert_eq!(routes.dashboard_path(), "/app");
    }
}
