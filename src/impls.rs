use actix_web::error::InternalError;
use actix_web::http::{header, StatusCode};
use actix_web::{dev, http::header::Header, web, FromRequest, HttpRequest};
use actix_web::{HttpResponse, ResponseError};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use futures::future::{err, LocalBoxFuture};
use futures::FutureExt;
use serde::Deserialize;

use crate::{CognitoAccessClaims, CognitoAuth, Error, FailureKind};

/// Query string of a connection handshake. WebSocket clients in browsers
/// cannot set an `Authorization` header, so they pass the token here.
#[derive(Debug, Deserialize)]
struct HandshakeQuery {
    token: Option<String>,
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self.kind() {
            // The identity provider could not be reached or answered garbage
            FailureKind::KeySetUnavailable => StatusCode::BAD_GATEWAY,
            FailureKind::MalformedToken
            | FailureKind::UntrustedIssuer
            | FailureKind::WrongTokenUse
            | FailureKind::UnknownKeyId
            | FailureKind::InvalidSignature => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Reads the bearer token of a request: the `Authorization` header first,
/// then the `token` query parameter.
pub(crate) fn handshake_token(req: &HttpRequest) -> Option<String> {
    if let Ok(header) = Authorization::<Bearer>::parse(req) {
        return Some(header.into_scheme().token().to_owned());
    }

    web::Query::<HandshakeQuery>::from_query(req.query_string())
        .ok()
        .and_then(|query| query.into_inner().token)
        .filter(|token| !token.is_empty())
}

impl FromRequest for CognitoAccessClaims {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let Some(cognito_auth) = req.app_data::<web::Data<CognitoAuth>>().cloned() else {
            tracing::error!("CognitoAuth is not registered in application data");
            return err(internal_token_verification_error()).boxed_local();
        };

        // Per RFC 6750, a request without credentials is answered with 401
        // and a `WWW-Authenticate` challenge rather than actix's default 400.
        let Some(token) = handshake_token(req) else {
            return err(missing_or_malformed_auth_header()).boxed_local();
        };

        async move {
            match cognito_auth.verify::<CognitoAccessClaims>(&token).await {
                Ok(claims) => Ok(claims),
                Err(unavailable @ Error::KeySetUnavailable(_)) => {
                    Err(key_set_unavailable_error(&unavailable))
                }
                Err(other) => Err(invalid_token_error(&other)),
            }
        }
        .boxed_local()
    }
}

fn internal_token_verification_error() -> actix_web::Error {
    let response =
        HttpResponse::InternalServerError().body("Internal error during token verification");

    InternalError::from_response("token_verification_failure", response).into()
}

fn key_set_unavailable_error(err: &Error) -> actix_web::Error {
    let response = HttpResponse::build(err.status_code())
        .body("Signing keys of the identity provider are unavailable");

    InternalError::from_response("key_set_unavailable", response).into()
}

fn missing_or_malformed_auth_header() -> actix_web::Error {
    unauthorized_with_www_authenticate(
        "invalid_request",
        "Access token missing from Authorization header and query string",
        "Access token is missing",
    )
}

fn invalid_token_error(err: &Error) -> actix_web::Error {
    unauthorized_with_www_authenticate(
        "invalid_token",
        &err.to_string(),
        format!("Failed to verify Cognito access token: {}", err),
    )
}

/// Constructs a generic `actix_web::Error` with a `WWW-Authenticate` header.
fn unauthorized_with_www_authenticate(
    www_error_code: &str,
    www_error_description: &str,
    body: impl Into<String>,
) -> actix_web::Error {
    let header_value = format!(
        r#"Bearer realm="cognito", error="{}", error_description="{}""#,
        www_error_code,
        www_error_description.replace('"', "'")
    );

    let response = HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, header_value))
        .body(body.into());

    InternalError::from_response("auth_error", response).into()
}
