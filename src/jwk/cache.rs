use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use reqwest::header::CACHE_CONTROL;
use tracing::*;

use super::config::{CognitoConfig, RefreshPolicy};
use super::error::KeySetError;
use super::key::{KeyResponse, KeySet};

/// Key set currently served to validations.
#[derive(Debug, Default)]
struct Snapshot {
    keys: Arc<KeySet>,
    valid_until: Option<Instant>,
}

impl Snapshot {
    fn fresh_keys(&self) -> Option<Arc<KeySet>> {
        match self.valid_until {
            Some(deadline) if Instant::now() < deadline => Some(Arc::clone(&self.keys)),
            _ => None,
        }
    }
}

/// Fetches a user pool's published keys and holds the latest successful result.
///
/// Each fetch replaces the whole snapshot behind a lock, so readers see
/// either the previous key set or the new one, never a partial mapping.
#[derive(Debug)]
pub struct KeySetCache {
    http: reqwest::Client,
    jwks_url: String,
    policy: RefreshPolicy,
    snapshot: RwLock<Snapshot>,
}

impl KeySetCache {
    pub fn new(config: &CognitoConfig) -> Result<KeySetCache, KeySetError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.fetch_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(KeySetError::Client)?;

        Ok(KeySetCache {
            http,
            jwks_url: config.jwks_url().to_owned(),
            policy: config.refresh_policy(),
            snapshot: RwLock::new(Snapshot::default()),
        })
    }

    /// Returns the keys to validate against, fetching them when the refresh
    /// policy says the current snapshot cannot be reused.
    ///
    /// A failed fetch empties the cache.
    pub async fn keys(&self) -> Result<Arc<KeySet>, KeySetError> {
        let fresh = self.read().fresh_keys();
        if let Some(keys) = fresh {
            trace!("Reusing cached key set");
            return Ok(keys);
        }

        match self.fetch().await {
            Ok((keys, valid_until)) => {
                let keys = Arc::new(keys);
                *self.write() = Snapshot {
                    keys: Arc::clone(&keys),
                    valid_until,
                };
                Ok(keys)
            }
            Err(err) => {
                error!(url = %self.jwks_url, "Failed to fetch user pool keys: {err}");
                *self.write() = Snapshot::default();
                Err(err)
            }
        }
    }

    /// Keys from the last successful fetch, regardless of freshness.
    pub fn current(&self) -> Arc<KeySet> {
        Arc::clone(&self.read().keys)
    }

    async fn fetch(&self) -> Result<(KeySet, Option<Instant>), KeySetError> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(KeySetError::Fetch)?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::UnexpectedStatus(status));
        }

        let reuse_for = self.reuse_window(response.headers());

        let body = response
            .json::<KeyResponse>()
            .await
            .map_err(KeySetError::Parse)?;
        let jwks = body.keys.ok_or(KeySetError::MissingKeys)?;

        let keys = KeySet::from_jwks(&jwks);
        debug!(
            published = jwks.len(),
            usable = keys.len(),
            "Fetched user pool keys. Reusable for {:?}",
            reuse_for
        );

        Ok((keys, reuse_for.map(|window| Instant::now() + window)))
    }

    fn reuse_window(&self, headers: &reqwest::header::HeaderMap) -> Option<Duration> {
        match self.policy {
            RefreshPolicy::Always => None,
            RefreshPolicy::Fixed(window) => Some(window),
            RefreshPolicy::CacheControl { fallback } => {
                let max_age = headers
                    .get(CACHE_CONTROL)
                    .ok_or(KeySetError::MissingCacheControlHeader)
                    .and_then(|value| {
                        value
                            .to_str()
                            .map_err(|_| KeySetError::InvalidMaxAgeValue)
                    })
                    .and_then(Self::parse_max_age_value);
                match max_age {
                    Ok(max_age) => Some(max_age),
                    Err(err) => {
                        debug!("Using fallback reuse window {fallback:?}: {err}");
                        Some(fallback)
                    }
                }
            }
        }
    }

    /// Parses the `max-age` directive from a Cache-Control header string.
    pub(crate) fn parse_max_age_value(value: &str) -> Result<Duration, KeySetError> {
        for directive in value.split(',') {
            let mut parts = directive.trim().splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let val = parts.next().unwrap_or("").trim();

            if key.eq_ignore_ascii_case("max-age") {
                let secs = val
                    .parse::<u64>()
                    .map_err(|_| KeySetError::InvalidMaxAgeValue)?;
                return Ok(Duration::from_secs(secs));
            }
        }

        Err(KeySetError::MissingMaxAgeDirective)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }
}
