use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::config::CognitoConfig;
use super::error::{VerificationError, VerificationResult};
use super::key::KeySet;

/// `token_use` value carried by Cognito access tokens.
pub const ACCESS_TOKEN_USE: &str = "access";

/// Claims read before the signature has been checked. Only used to route
/// the token and reject it early.
#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    iss: Option<String>,
    token_use: Option<String>,
    iat: Option<u64>,
}

/// Checks access tokens of one user pool against a key set.
#[derive(Debug, Clone)]
pub struct JwkVerifier {
    issuer: String,
    max_token_age: Duration,
}

impl JwkVerifier {
    pub fn new(config: &CognitoConfig) -> JwkVerifier {
        JwkVerifier {
            issuer: config.issuer().to_owned(),
            max_token_age: config.max_token_age(),
        }
    }

    pub fn verify<T: DeserializeOwned>(
        &self,
        token: &str,
        keys: &KeySet,
    ) -> VerificationResult<T> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(VerificationError::MalformedToken);
        }

        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| VerificationError::MalformedToken)?;

        let payload = BASE64_URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| VerificationError::MalformedToken)?;
        let unverified: UnverifiedClaims = serde_json::from_slice(&payload)
            .map_err(|_| VerificationError::MalformedToken)?;

        if unverified.iss.as_deref() != Some(self.issuer.as_str()) {
            return Err(VerificationError::UntrustedIssuer {
                found: unverified.iss,
            });
        }

        if unverified.token_use.as_deref() != Some(ACCESS_TOKEN_USE) {
            return Err(VerificationError::WrongTokenUse {
                found: unverified.token_use,
            });
        }

        let key = match header.kid.as_deref().and_then(|kid| keys.get(kid)) {
            Some(key) => key,
            None => return Err(VerificationError::UnknownKeyId(header.kid)),
        };

        let mut validation = Validation::new(key.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Access tokens carry `client_id` instead of `aud`.
        validation.validate_aud = false;

        let claims = jsonwebtoken::decode::<T>(token, &key.decoding, &validation)
            .map_err(VerificationError::InvalidSignature)?
            .claims;

        self.check_age(unverified.iat)?;

        Ok(claims)
    }

    /// Rejects tokens issued more than `max_token_age` ago.
    fn check_age(&self, iat: Option<u64>) -> VerificationResult<()> {
        let Some(iat) = iat else {
            return Err(VerificationError::InvalidSignature(
                ErrorKind::MissingRequiredClaim("iat".to_owned()).into(),
            ));
        };

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());

        if now.saturating_sub(iat) > self.max_token_age.as_secs() {
            return Err(VerificationError::InvalidSignature(
                ErrorKind::ExpiredSignature.into(),
            ));
        }

        Ok(())
    }
}
