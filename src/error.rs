use crate::jwk::{KeySetError, VerificationError};

/// A crate-wide result type alias using the custom [`Error`] enum.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Cognito access token validation failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The user pool's signing keys could not be fetched or parsed.
    #[error(transparent)]
    KeySetUnavailable(#[from] KeySetError),

    /// The token failed a structural, claim or signature check.
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

/// Coarse classification of why a token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Signing keys could not be obtained.
    KeySetUnavailable,
    /// The token could not be decoded.
    MalformedToken,
    /// The issuer is not the configured user pool.
    UntrustedIssuer,
    /// The token is not an access token.
    WrongTokenUse,
    /// The signing key is not published by the user pool.
    UnknownKeyId,
    /// Signature, expiry or age check failed.
    InvalidSignature,
}

impl Error {
    /// Returns the failure classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::KeySetUnavailable(_) => FailureKind::KeySetUnavailable,
            Error::Verification(err) => match err {
                VerificationError::MalformedToken => FailureKind::MalformedToken,
                VerificationError::UntrustedIssuer { .. } => FailureKind::UntrustedIssuer,
                VerificationError::WrongTokenUse { .. } => FailureKind::WrongTokenUse,
                VerificationError::UnknownKeyId(_) => FailureKind::UnknownKeyId,
                VerificationError::InvalidSignature(_) => FailureKind::InvalidSignature,
            },
        }
    }
}
