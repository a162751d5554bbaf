//! Minimal Actix Web example demonstrating the [`CognitoAccessClaims`] extractor.
//!
//! This server exposes two endpoints:
//! - `/socket`: Connection handshake. Requires a valid Cognito access token, passed
//!   either as `Authorization: Bearer <token>` or as `?token=<token>`.
//! - `/whoami`: Returns the token's claims if authenticated, or `"Anonymous"` otherwise.
//!
//! The user pool is read from `COGNITO_REGION` and `COGNITO_USER_POOL_ID`.
//! Set `RUST_LOG=actix_cognito_auth=debug` to see key fetches and rejections.

use actix_cognito_auth::{CognitoAccessClaims, CognitoAuth, CognitoConfig, RefreshPolicy};
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CognitoConfig::from_env()
        .with_refresh_policy(RefreshPolicy::CacheControl {
            fallback: Duration::from_secs(300),
        })
        .with_fetch_timeout(Duration::from_secs(5));

    let auth = match CognitoAuth::new(config) {
        Ok(auth) => auth,
        Err(e) => {
            eprintln!("Failed to initialize CognitoAuth: {e}");
            std::process::exit(1);
        }
    };

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(auth.clone()))
            .service(socket)
            .service(whoami)
    })
    .bind(("127.0.0.1", 3333))?
    .run()
    .await
}

// Handshake route — the connection is refused unless the token validates
#[get("/socket")]
async fn socket(claims: CognitoAccessClaims) -> impl Responder {
    tracing::info!(user_id = %claims.sub, "user connected");
    HttpResponse::Ok().json(claims)
}

// Returns the caller's claims, or "Anonymous" if unauthenticated
#[get("/whoami")]
async fn whoami(claims: Option<CognitoAccessClaims>) -> impl Responder {
    match claims {
        Some(c) => HttpResponse::Ok().json(c),
        None => HttpResponse::Ok().body("Anonymous"),
    }
}
