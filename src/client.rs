use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::*;

use crate::jwk::{CognitoConfig, JwkVerifier, KeySetCache};
use crate::CognitoAccessClaims;

/// CognitoAuth validates access tokens issued by one Cognito user pool.
///
/// Before each validation it asks its key cache for the pool's signing keys;
/// whether that triggers a network fetch depends on the configured
/// [`RefreshPolicy`](crate::RefreshPolicy). Clones share the same cache.
#[derive(Clone, Debug)]
pub struct CognitoAuth {
    config: Arc<CognitoConfig>,
    keys: Arc<KeySetCache>,
    verifier: JwkVerifier,
}

impl CognitoAuth {
    /// Create a new CognitoAuth instance. No keys are fetched until the
    /// first validation.
    pub fn new(config: CognitoConfig) -> crate::Result<Self> {
        let keys = Arc::new(KeySetCache::new(&config)?);
        let verifier = JwkVerifier::new(&config);
        debug!(issuer = config.issuer(), "Configured Cognito access token validation");

        Ok(Self {
            config: Arc::new(config),
            keys,
            verifier,
        })
    }

    /// Create a CognitoAuth instance configured from `COGNITO_REGION` and
    /// `COGNITO_USER_POOL_ID`.
    pub fn from_env() -> crate::Result<Self> {
        Self::new(CognitoConfig::from_env())
    }

    pub fn config(&self) -> &CognitoConfig {
        &self.config
    }

    /// Validates an access token and deserializes its payload into type `T`.
    ///
    /// Every rejection is logged with its [`FailureKind`](crate::FailureKind).
    pub async fn verify<T: DeserializeOwned>(&self, token: &str) -> crate::Result<T> {
        let result = self.try_verify(token).await;
        if let Err(err) = &result {
            warn!(kind = ?err.kind(), "Rejected access token: {err}");
        }
        result
    }

    /// Validates an access token, collapsing every failure into `None`.
    ///
    /// The reason for a rejection is only visible in the logs; use
    /// [`CognitoAuth::verify`] to inspect it.
    pub async fn validate_access_token(&self, token: &str) -> Option<CognitoAccessClaims> {
        self.verify(token).await.ok()
    }

    async fn try_verify<T: DeserializeOwned>(&self, token: &str) -> crate::Result<T> {
        let keys = self.keys.keys().await?;
        let claims = self.verifier.verify(token, &keys)?;
        Ok(claims)
    }
}
