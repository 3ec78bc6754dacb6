//! Client-credentials token exchange and the cached-token provider
//!
//! `TokenProvider::access_token` returns a cached bearer token while it is
//! valid and otherwise performs exactly one exchange against
//! `{auth_endpoint}/oauth2/token`. The in-memory slot is guarded by a tokio
//! Mutex held across the check-then-refresh, so concurrent callers near
//! expiry wait for the in-flight exchange instead of starting their own.
//! Each exchange is bounded by the provider's timeout so a hung auth endpoint
//! cannot hold the slot forever.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::Secret;

use crate::cache::{CachedToken, TokenCache};
use crate::clock::{Clock, SystemClock};
use crate::constants::TOKEN_PATH;
use crate::credentials::ClientCredentials;
use crate::error::{Error, Result};

/// Bound on one token exchange unless overridden.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Token endpoint response. `expires_in` is a delta in seconds.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// Full token URL for an auth endpoint given with or without a scheme.
pub fn token_url(auth_endpoint: &str) -> String {
    let base = auth_endpoint.trim().trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{base}{TOKEN_PATH}")
    } else {
        format!("https://{base}{TOKEN_PATH}")
    }
}

/// Exchange client credentials for a bearer token (HTTP Basic auth).
pub async fn exchange_client_credentials(
    http: &reqwest::Client,
    url: &str,
    client_id: &str,
    client_secret: &Secret<String>,
    timeout: Duration,
) -> Result<TokenResponse> {
    let response = http
        .post(url)
        .basic_auth(client_id, Some(client_secret.expose()))
        .form(&[("grant_type", "client_credentials")])
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}

/// Supplies valid bearer tokens for one set of client credentials.
pub struct TokenProvider {
    http: reqwest::Client,
    url: String,
    client_id: String,
    client_secret: Secret<String>,
    cache: Option<(TokenCache, String)>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    current: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Provider for `credentials`. When the credentials name a cache profile,
    /// tokens are shared through `~/.lucidtech/token-cache.json`.
    pub fn new(credentials: &ClientCredentials, http: reqwest::Client) -> Self {
        let cache = credentials
            .cached_profile
            .clone()
            .and_then(|profile| TokenCache::default_path().map(|p| (TokenCache::new(p), profile)));
        Self {
            http,
            url: token_url(&credentials.auth_endpoint),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            cache,
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
            current: Mutex::new(None),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Bound each token exchange by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Persist tokens to `cache` under `profile`.
    pub fn with_cache(mut self, cache: TokenCache, profile: impl Into<String>) -> Self {
        self.cache = Some((cache, profile.into()));
        self
    }

    /// Keep tokens in memory only.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Token endpoint this provider exchanges against.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// A token valid at the time of the call.
    pub async fn access_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;
        let now = self.clock.now_secs();

        if let Some(token) = current.as_ref()
            && token.is_valid_at(now)
        {
            return Ok(token.access_token.clone());
        }

        if let Some((cache, profile)) = &self.cache
            && let Some(token) = cache.load(profile).await
            && token.is_valid_at(now)
        {
            debug!(profile = %profile, expires_at = token.expires_at, "using token from disk cache");
            let access_token = token.access_token.clone();
            *current = Some(token);
            return Ok(access_token);
        }

        let response = exchange_client_credentials(
            &self.http,
            &self.url,
            &self.client_id,
            &self.client_secret,
            self.timeout,
        )
        .await?;
        let token = CachedToken {
            access_token: response.access_token,
            expires_at: now.saturating_add(response.expires_in),
        };
        info!(client_id = %self.client_id, expires_at = token.expires_at, "obtained access token");

        if let Some((cache, profile)) = &self.cache
            && let Err(e) = cache.store(profile, &token).await
        {
            warn!(profile = %profile, error = %e, "failed to persist token cache");
        }

        let access_token = token.access_token.clone();
        *current = Some(token);
        Ok(access_token)
    }

    /// Drop the in-memory token so the next call re-checks the cache or exchanges.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("timeout", &self.timeout)
            .field("cache", &self.cache.as_ref().map(|(_, profile)| profile))
            .finish()
    }
}
