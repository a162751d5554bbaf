use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use tracing::warn;

use super::error::KeyConversionError;

/// Body of the `/.well-known/jwks.json` document.
#[derive(Debug, Deserialize)]
pub struct KeyResponse {
    pub(crate) keys: Option<Vec<JwkKey>>,
}

/// A single published JSON Web Key.
#[derive(Clone, Debug, Deserialize)]
pub struct JwkKey {
    pub(crate) kty: String,
    #[serde(default)]
    pub(crate) kid: Option<String>,
    #[serde(default)]
    pub(crate) alg: Option<String>,
    #[serde(default, rename = "use")]
    pub(crate) key_use: Option<String>,
    #[serde(default)]
    pub(crate) n: Option<String>,
    #[serde(default)]
    pub(crate) e: Option<String>,
    #[serde(default)]
    pub(crate) crv: Option<String>,
    #[serde(default)]
    pub(crate) x: Option<String>,
    #[serde(default)]
    pub(crate) y: Option<String>,
}

/// A decoding key ready for signature checks, pinned to one algorithm.
#[derive(Clone)]
pub struct VerificationKey {
    pub(crate) decoding: DecodingKey,
    pub(crate) algorithm: Algorithm,
}

impl VerificationKey {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&JwkKey> for VerificationKey {
    type Error = KeyConversionError;

    fn try_from(jwk: &JwkKey) -> Result<Self, Self::Error> {
        if jwk.key_use.as_deref() == Some("enc") {
            return Err(KeyConversionError::NotASigningKey);
        }

        let explicit = jwk
            .alg
            .as_deref()
            .map(|alg| {
                Algorithm::from_str(alg)
                    .map_err(|_| KeyConversionError::UnsupportedAlgorithm(alg.to_owned()))
            })
            .transpose()?;

        match jwk.kty.as_str() {
            "RSA" => {
                let n = jwk.n.as_deref().ok_or(KeyConversionError::MissingComponent("n"))?;
                let e = jwk.e.as_deref().ok_or(KeyConversionError::MissingComponent("e"))?;
                let decoding = DecodingKey::from_rsa_components(n, e)
                    .map_err(KeyConversionError::InvalidComponents)?;
                let algorithm = explicit.unwrap_or(Algorithm::RS256);
                ensure_key_type("RSA", algorithm)?;
                Ok(VerificationKey { decoding, algorithm })
            }
            "EC" => {
                let x = jwk.x.as_deref().ok_or(KeyConversionError::MissingComponent("x"))?;
                let y = jwk.y.as_deref().ok_or(KeyConversionError::MissingComponent("y"))?;
                let algorithm = match (explicit, jwk.crv.as_deref()) {
                    (Some(alg), _) => alg,
                    (None, Some("P-256")) => Algorithm::ES256,
                    (None, Some("P-384")) => Algorithm::ES384,
                    (None, crv) => {
                        return Err(KeyConversionError::UnsupportedCurve(
                            crv.unwrap_or_default().to_owned(),
                        ))
                    }
                };
                ensure_key_type("EC", algorithm)?;
                let decoding = DecodingKey::from_ec_components(x, y)
                    .map_err(KeyConversionError::InvalidComponents)?;
                Ok(VerificationKey { decoding, algorithm })
            }
            other => Err(KeyConversionError::UnsupportedKeyType(other.to_owned())),
        }
    }
}

/// Rejects an `alg` that cannot be used with keys of type `kty`.
fn ensure_key_type(kty: &str, algorithm: Algorithm) -> Result<(), KeyConversionError> {
    let fits = match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => kty == "RSA",
        Algorithm::ES256 | Algorithm::ES384 => kty == "EC",
        _ => false,
    };
    if fits {
        Ok(())
    } else {
        Err(KeyConversionError::UnsupportedAlgorithm(format!(
            "{algorithm:?} for {kty} key"
        )))
    }
}

/// Verification keys of one user pool, indexed by key id.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, VerificationKey>,
}

impl KeySet {
    /// Converts every usable key. Keys without a `kid` or that cannot be
    /// turned into a verification key are skipped.
    pub fn from_jwks(jwks: &[JwkKey]) -> KeySet {
        let mut keys = HashMap::with_capacity(jwks.len());
        for jwk in jwks {
            let Some(kid) = jwk.kid.as_deref() else {
                warn!(kty = %jwk.kty, "Skipping published key without 'kid'");
                continue;
            };
            match VerificationKey::try_from(jwk) {
                Ok(key) => {
                    keys.insert(kid.to_owned(), key);
                }
                Err(err) => warn!(kid, "Skipping unusable published key: {err}"),
            }
        }
        KeySet { keys }
    }

    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
