use std::env;
use std::ops::Deref;
use std::time::Duration;

/// Environment variable holding the AWS region of the user pool.
pub const REGION_ENV: &str = "COGNITO_REGION";

/// Environment variable holding the Cognito user pool id.
pub const USER_POOL_ID_ENV: &str = "COGNITO_USER_POOL_ID";

/// Default maximum age of an access token, measured from its `iat` claim.
pub const DEFAULT_MAX_TOKEN_AGE: Duration = Duration::from_secs(3600);

/// The trust authority of a Cognito user pool.
///
/// This is both the expected `iss` claim and the base URL of the pool's
/// published key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority(String);

impl Authority {
    /// Builds `https://cognito-idp.<region>.amazonaws.com/<pool_id>`.
    ///
    /// Empty inputs are not rejected; they produce an authority that no
    /// token will ever match.
    pub fn new(region: impl AsRef<str>, user_pool_id: impl AsRef<str>) -> Authority {
        Authority(format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            region.as_ref(),
            user_pool_id.as_ref()
        ))
    }

    /// URL of the key set published for this authority.
    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.0)
    }
}

impl Deref for Authority {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

/// Controls how long a fetched key set may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Fetch the key set before every validation.
    ///
    /// Rotated keys are picked up immediately at the cost of one round trip
    /// to the identity provider per validated token.
    #[default]
    Always,

    /// Reuse a successful fetch for a fixed window.
    Fixed(Duration),

    /// Reuse a successful fetch for the `max-age` advertised in the
    /// response's `Cache-Control` header, or `fallback` when it has none.
    CacheControl {
        /// Window used when the header is missing or unparseable.
        fallback: Duration,
    },
}

/// Settings for validating access tokens issued by one Cognito user pool.
#[derive(Debug, Clone)]
pub struct CognitoConfig {
    region: String,
    user_pool_id: String,
    authority: Authority,
    jwks_url: String,
    max_token_age: Duration,
    refresh_policy: RefreshPolicy,
    fetch_timeout: Option<Duration>,
}

impl CognitoConfig {
    /// Creates a config for the pool `user_pool_id` in `region`.
    pub fn new(region: impl AsRef<str>, user_pool_id: impl AsRef<str>) -> CognitoConfig {
        let authority = Authority::new(&region, &user_pool_id);
        CognitoConfig {
            region: region.as_ref().to_owned(),
            user_pool_id: user_pool_id.as_ref().to_owned(),
            jwks_url: authority.jwks_url(),
            authority,
            max_token_age: DEFAULT_MAX_TOKEN_AGE,
            refresh_policy: RefreshPolicy::default(),
            fetch_timeout: None,
        }
    }

    /// Reads the region and pool id from [`REGION_ENV`] and [`USER_POOL_ID_ENV`].
    ///
    /// Unset variables are treated as empty strings.
    pub fn from_env() -> CognitoConfig {
        let region = env::var(REGION_ENV).unwrap_or_default();
        let user_pool_id = env::var(USER_POOL_ID_ENV).unwrap_or_default();
        Self::new(region, user_pool_id)
    }

    /// Fetches keys from `url` instead of the authority's well-known
    /// location. The expected issuer is unchanged.
    #[must_use]
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    /// Sets the maximum accepted age of a token, measured from `iat`.
    #[must_use]
    pub fn with_max_token_age(mut self, max_age: Duration) -> Self {
        self.max_token_age = max_age;
        self
    }

    /// Sets the key set refresh policy.
    #[must_use]
    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Bounds each key set request. Without it a hung upstream blocks the
    /// validation indefinitely.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }

    pub fn issuer(&self) -> &str {
        &self.authority
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    pub fn max_token_age(&self) -> Duration {
        self.max_token_age
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_policy
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_authority_from_region_and_pool() {
        let config = CognitoConfig::new("us-east-1", "pool123");
        assert_eq!(
            config.issuer(),
            "https://cognito-idp.us-east-1.amazonaws.com/pool123"
        );
        assert_eq!(
            config.jwks_url(),
            "https://cognito-idp.us-east-1.amazonaws.com/pool123/.well-known/jwks.json"
        );
    }

    #[test]
    fn empty_inputs_still_form_an_authority() {
        let config = CognitoConfig::new("", "");
        assert_eq!(config.issuer(), "https://cognito-idp..amazonaws.com/");
    }

    #[test]
    fn jwks_override_keeps_issuer() {
        let config = CognitoConfig::new("eu-west-1", "pool")
            .with_jwks_url("http://127.0.0.1:9999/keys");
        assert_eq!(config.jwks_url(), "http://127.0.0.1:9999/keys");
        assert_eq!(
            config.issuer(),
            "https://cognito-idp.eu-west-1.amazonaws.com/pool"
        );
    }

    #[test]
    fn defaults() {
        let config = CognitoConfig::new("us-east-1", "pool");
        assert_eq!(config.max_token_age(), Duration::from_secs(3600));
        assert_eq!(config.refresh_policy(), RefreshPolicy::Always);
        assert!(config.fetch_timeout().is_none());
    }
}
