use super::signing::Signer;
use crate::models::auth::AuthError;
use crate::models::{Principal, TokenClaims};
use crate::settings::TokenSettings;
use crate::utils::clock::{Clock, SystemClock};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use serde_json::json;
use std::sync::Arc;

/// Default token lifetime: one hour
pub const DEFAULT_TTL_MS: i64 = 3_600_000;

/// Builds and interprets session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    ttl_ms: i64,
    signer: Signer,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer from token settings
    #[must_use]
    pub fn new(settings: &TokenSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_ms: settings.ttl_ms,
            signer: Signer::new(settings.signing, &settings.signing_secret),
            clock,
        }
    }

    /// Unsigned issuer with the default lifetime on the wall clock
    #[must_use]
    pub fn unsigned() -> Self {
        Self::new(&TokenSettings::default(), Arc::new(SystemClock))
    }

    /// Issue a token for `principal` expiring `ttl_ms` from now
    ///
    /// # Errors
    /// Returns an error if JSON serialization or signing fails
    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });
        let claims = TokenClaims {
            id: principal.id,
            email: principal.email.clone(),
            exp: self.clock.now_millis().saturating_add(self.ttl_ms),
        };

        let header_b64 = STANDARD.encode(serde_json::to_string(&header)?);
        let payload_b64 = STANDARD.encode(serde_json::to_string(&claims)?);
        let message = format!("{header_b64}.{payload_b64}");
        let signature_b64 = self.signer.sign(&message)?;

        debug!("Issued token for principal {} (exp {})", claims.id, claims.exp);
        Ok(format!("{message}.{signature_b64}"))
    }

    /// Decode the payload segment without checking expiry
    ///
    /// The header segment is never inspected. The signature segment is only
    /// checked when HMAC signing is enabled.
    ///
    /// # Errors
    /// Returns `AuthError::MalformedToken` if:
    /// - The token is not exactly three `.`-separated segments
    /// - The payload is not valid base64, UTF-8 or `{id, email, exp}` JSON
    /// - HMAC signing is enabled and the signature does not match
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(AuthError::MalformedToken(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        self.signer
            .verify(&format!("{header}.{payload}"), signature)?;

        let decoded = STANDARD
            .decode(payload)
            .map_err(|e| AuthError::MalformedToken(format!("payload encoding: {e}")))?;
        let json = String::from_utf8(decoded)
            .map_err(|e| AuthError::MalformedToken(format!("payload utf-8: {e}")))?;
        let claims: TokenClaims = serde_json::from_str(&json)?;
        Ok(claims)
    }

    /// Decode and check expiry
    ///
    /// # Errors
    /// Returns `AuthError::MalformedToken` on decode failure and
    /// `AuthError::ExpiredToken` once the clock reaches `exp`
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = self.decode(token)?;
        if self.clock.now_millis() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }

    /// Fail-closed validity check; never panics, never errors
    #[must_use]
    pub fn validate(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(_) => true,
            Err(e) => {
                debug!("Token validation failed: {e}");
                false
            }
        }
    }

    #[must_use]
    pub const fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}
