//! Bearer token issuance and validation
//!
//! Tokens are JWT-shaped (`header.payload.signature`, each segment standard
//! base64) but by default carry a constant placeholder signature. Validity is
//! decided by decoding the payload and comparing `exp` with the clock. Treat a
//! token as a session hint, never as a security credential, unless HMAC
//! signing is enabled in settings.

mod issuer;
mod signing;

pub use issuer::{TokenIssuer, DEFAULT_TTL_MS};
pub use signing::{TokenSigning, PLACEHOLDER_SIGNATURE};
