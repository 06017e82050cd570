use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// Route paths come from configuration and end up as navigation targets, so
// they must stay relative to the dashboard origin.

// Core path traversal pattern
static PATH_TRAVERSAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.").expect("static regex"));

// Scheme prefix or protocol-relative `//`
static PROTOCOL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:[a-z][a-z0-9+.-]*:)|(?:/{2,})").expect("static regex"));

// Control characters, backslashes and invisible direction/spacing marks
static SUSPICIOUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x1F\x7F-\x9F]|\\|[\u{200E}\u{200F}\u{2060}-\u{2064}\u{2000}-\u{200A}]")
        .expect("static regex")
});

const MAX_PATH_LEN: usize = 2048;

/// A configured route path that is not a safe same-origin path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid route path '{path}': {reason}")]
pub struct InvalidRoutePath {
    pub path: String,
    pub reason: &'static str,
}

impl InvalidRoutePath {
    fn new(path: &str, reason: &'static str) -> Self {
        warn!("Rejected route path {path:?}: {reason}");
        Self {
            path: path.to_string(),
            reason,
        }
    }
}

/// Validate a configured route path
///
/// Accepts absolute paths such as `/dashboard` or `/verify-email` and rejects
/// anything that could navigate off-origin or escape the path hierarchy,
/// including URL-encoded variants.
///
/// # Errors
/// Returns `InvalidRoutePath` naming the first failed check
pub fn validate_route_path(path: &str) -> Result<String, InvalidRoutePath> {
    if path.is_empty() {
        return Err(InvalidRoutePath::new(path, "empty path"));
    }
    if path.len() > MAX_PATH_LEN {
        return Err(InvalidRoutePath::new(path, "path too long"));
    }
    if !path.starts_with('/') {
        return Err(InvalidRoutePath::new(path, "path must start with '/'"));
    }
    if path.contains(['?', '#']) {
        return Err(InvalidRoutePath::new(path, "query or fragment not allowed"));
    }

    for variant in decoded_variants(path) {
        if PATH_TRAVERSAL_PATTERN.is_match(&variant) {
            return Err(InvalidRoutePath::new(path, "path traversal"));
        }
        if PROTOCOL_PATTERN.is_match(&variant) {
            return Err(InvalidRoutePath::new(path, "protocol injection"));
        }
        if SUSPICIOUS_PATTERN.is_match(&variant) {
            return Err(InvalidRoutePath::new(path, "suspicious characters"));
        }
    }

    debug!("Validated route path: {path}");
    Ok(path.to_string())
}

/// Original path plus single and double URL-decoded forms
fn decoded_variants(path: &str) -> Vec<String> {
    let mut variants = Vec::with_capacity(3);
    variants.push(path.to_string());

    if let Ok(decoded) = urlencoding::decode(path) {
        let decoded = decoded.into_owned();
        if decoded != path {
            if let Ok(double) = urlencoding::decode(&decoded) {
                let double = double.into_owned();
                if double != decoded {
                    variants.push(double);
                }
            }
            variants.push(decoded);
        }
    }

    variants
}
