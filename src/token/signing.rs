use crate::models::auth::AuthError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Constant written into the signature segment when signing is disabled
pub const PLACEHOLDER_SIGNATURE: &str = "dummy-signature";

/// Signature mode for issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TokenSigning {
    /// Placeholder signature, never checked
    #[default]
    None,
    /// HMAC-SHA256 over `header.payload`, checked on decode
    HmacSha256,
}

impl std::str::FromStr for TokenSigning {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "hmac-sha256" | "hs256" => Ok(Self::HmacSha256),
            other => Err(format!("unknown token signing mode '{other}'")),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Signer {
    Placeholder,
    Hmac(Vec<u8>),
}

impl Signer {
    pub(crate) fn new(mode: TokenSigning, secret: &str) -> Self {
        match mode {
            TokenSigning::None => Self::Placeholder,
            TokenSigning::HmacSha256 => Self::Hmac(secret.as_bytes().to_vec()),
        }
    }

    /// Produce the base64 signature segment for `header.payload`
    pub(crate) fn sign(&self, signing_input: &str) -> Result<String, AuthError> {
        match self {
            Self::Placeholder => Ok(STANDARD.encode(PLACEHOLDER_SIGNATURE)),
            Self::Hmac(key) => {
                let mut mac = Self::mac(key)?;
                mac.update(signing_input.as_bytes());
                Ok(STANDARD.encode(mac.finalize().into_bytes()))
            }
        }
    }

    /// Check the signature segment; the placeholder mode accepts anything
    pub(crate) fn verify(&self, signing_input: &str, signature: &str) -> Result<(), AuthError> {
        match self {
            Self::Placeholder => Ok(()),
            Self::Hmac(key) => {
                let expected = STANDARD
                    .decode(signature)
                    .map_err(|e| AuthError::MalformedToken(format!("signature encoding: {e}")))?;
                let mut mac = Self::mac(key)?;
                mac.update(signing_input.as_bytes());
                mac.verify_slice(&expected)
                    .map_err(|_| AuthError::MalformedToken("signature mismatch".to_string()))
            }
        }
    }

    fn mac(key: &[u8]) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(key)
            .map_err(|e| AuthError::MalformedToken(format!("signing key: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_signature() {
        let signer = Signer::new(TokenSigning::None, "");
        assert_eq!(
            signer.sign("anything").unwrap(),
            STANDARD.encode("dummy-signature")
        );
        assert!(signer.verify("anything", "garbage").is_ok());
    }

    #[test]
    fn test_hmac_signature_verifies() {
        let signer = Signer::new(TokenSigning::HmacSha256, "test_key_32_bytes_long_for_test_");
        let signature = signer.sign("a.b").unwrap();

        assert!(signer.verify("a.b", &signature).is_ok());
        assert!(matches!(
            signer.verify("a.c", &signature),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_hmac_rejects_other_key() {
        let signature = Signer::new(TokenSigning::HmacSha256, "key-one")
            .sign("a.b")
            .unwrap();
        let other = Signer::new(TokenSigning::HmacSha256, "key-two");

        assert!(other.verify("a.b", &signature).is_err());
    }

    #[test]
    fn test_signing_mode_from_str() {
        assert_eq!("none".parse::<TokenSigning>(), Ok(TokenSigning::None));
        assert_eq!(
            "HMAC-SHA256".parse::<TokenSigning>(),
            Ok(TokenSigning::HmacSha256)
        );
        assert!("rsa".parse::<TokenSigning>().is_err());
    }
}
