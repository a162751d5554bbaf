use thiserror::Error;

pub(crate) type VerificationResult<T> = std::result::Result<T, VerificationError>;

/// Reasons a structurally present token is rejected.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The token is not a decodable compact JWT.
    #[error("Invalid token: malformed JWT")]
    MalformedToken,

    /// The `iss` claim does not name the configured user pool.
    #[error("Token is not from this user pool (iss: {found:?})")]
    UntrustedIssuer {
        /// The issuer found in the token, if any.
        found: Option<String>,
    },

    /// The `token_use` claim is not `access`.
    #[error("Not an access token (token_use: {found:?})")]
    WrongTokenUse {
        /// The token use found in the token, if any.
        found: Option<String>,
    },

    /// The `kid` header is absent or names no key in the current key set.
    #[error("No matching public key found for 'kid' {0:?}")]
    UnknownKeyId(Option<String>),

    /// Signature, algorithm, expiry or maximum age check failed.
    #[error("Invalid access token: {0}")]
    InvalidSignature(#[source] jsonwebtoken::errors::Error),
}

/// Reasons the user pool's key set could not be obtained.
#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("failed to build the HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("failed to fetch public keys from the identity provider: {0}")]
    Fetch(reqwest::Error),

    #[error("the identity provider answered with status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("failed to parse the key set: {0}")]
    Parse(reqwest::Error),

    #[error("the key set has no 'keys' field")]
    MissingKeys,

    #[error("missing 'Cache-Control' header in the response")]
    MissingCacheControlHeader,

    #[error("the 'max-age' directive is not a valid number")]
    InvalidMaxAgeValue,

    #[error("no 'max-age' directive found in 'Cache-Control' header")]
    MissingMaxAgeDirective,
}

/// Reasons a published key cannot be used for verification.
#[derive(Debug, Error)]
pub enum KeyConversionError {
    #[error("unsupported key type '{0}'")]
    UnsupportedKeyType(String),

    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("unsupported curve '{0}'")]
    UnsupportedCurve(String),

    #[error("missing '{0}' component")]
    MissingComponent(&'static str),

    #[error("key is published for encryption, not signing")]
    NotASigningKey,

    #[error("invalid key components: {0}")]
    InvalidComponents(#[source] jsonwebtoken::errors::Error),
}
