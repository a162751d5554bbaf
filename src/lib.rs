//! # actix-cognito-auth
//!
//! This crate validates AWS Cognito user pool access tokens for the `actix-web`
//! framework, using the pool's published JWKs to check signatures.
//!
//! A token is accepted only when its issuer is the configured pool, its
//! `token_use` is `access`, its `kid` names a published key, its signature
//! verifies against that key and it is not older than the configured maximum age.
//!
//! ## Example
//!
//! ```no_run
//! use actix_web::{web, App, HttpServer, HttpResponse};
//! use actix_cognito_auth::{CognitoAccessClaims, CognitoAuth, CognitoConfig};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = CognitoConfig::new("us-east-1", "us-east-1_example");
//!     let auth = CognitoAuth::new(config).expect("valid HTTP client configuration");
//!
//!     HttpServer::new(move || {
//!         App::new()
//!             .app_data(web::Data::new(auth.clone()))
//!             .route("/profile", web::get().to(get_profile))
//!     })
//!     .bind(("127.0.0.1", 8080))?
//!     .run()
//!     .await
//! }
//!
//! async fn get_profile(claims: CognitoAccessClaims) -> HttpResponse {
//!     HttpResponse::Ok().json(claims)
//! }
//! ```

mod claims;
mod client;
mod error;
mod impls;
mod jwk;
#[cfg(test)]
mod test_support;

pub use claims::*;
pub use client::*;
pub use error::*;
pub use jwk::{
    Authority, CognitoConfig, JwkKey, KeyConversionError, KeySet, KeySetCache, KeySetError,
    RefreshPolicy, VerificationError, VerificationKey, ACCESS_TOKEN_USE, DEFAULT_MAX_TOKEN_AGE,
    REGION_ENV, USER_POOL_ID_ENV,
};
