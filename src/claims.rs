use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents the decoded claims of a Cognito user pool access token.
///
/// See: <https://docs.aws.amazon.com/cognito/latest/developerguide/amazon-cognito-user-pools-using-the-access-token.html>
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CognitoAccessClaims {
    /// Issuer of the token (the user pool URL)
    pub iss: String,

    /// Subject — the unique identifier of the user in the pool
    pub sub: String,

    /// Token use, always `access` for tokens that pass validation
    pub token_use: String,

    /// Issued-at time (epoch seconds)
    pub iat: u64,

    /// Expiration time (epoch seconds)
    pub exp: u64,

    /// Time the user authenticated (epoch seconds)
    pub auth_time: Option<u64>,

    /// App client the token was issued to
    pub client_id: Option<String>,

    /// User name of the authenticated user
    pub username: Option<String>,

    /// Space separated OAuth scopes
    pub scope: Option<String>,

    /// Groups the user belongs to
    #[serde(rename = "cognito:groups")]
    pub groups: Option<Vec<String>>,

    /// Unique token identifier
    pub jti: Option<String>,

    /// Identifier of the authentication event that produced the token chain
    pub origin_jti: Option<String>,

    /// Identifier of the sign-in event
    pub event_id: Option<String>,

    /// Version of the token format
    pub version: Option<u32>,

    /// Claims not covered above, e.g. added by a pre token generation trigger
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl CognitoAccessClaims {
    /// Groups of the user, empty when the claim is absent.
    pub fn groups(&self) -> &[String] {
        self.groups.as_deref().unwrap_or_default()
    }

    /// Iterates the granted OAuth scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }

    /// Whether `scope` was granted.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().any(|granted| granted == scope)
    }
}
