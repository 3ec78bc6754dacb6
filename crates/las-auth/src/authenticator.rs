//! Authentication strategies for outgoing API requests
//!
//! The executor delegates every auth concern to an `Authenticator`:
//! - `ApiKeyAuth` attaches the static `x-api-key`
//! - `BearerAuth` attaches `Authorization: Bearer <token>` from a `TokenProvider`
//!   plus `x-api-key` when one is configured
//! - `SigV4Auth` signs method, url and body and attaches the signature headers
//!
//! `authorize` runs once per HTTP attempt, so a retried request is re-signed
//! and picks up a refreshed token.
//!
//! Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn Authenticator>`).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use common::Secret;

use crate::constants::API_KEY_HEADER;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::signing::SigV4Signer;
use crate::token::TokenProvider;

/// The parts of a request an authenticator may inspect.
#[derive(Debug, Clone, Copy)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub url: &'a Url,
    pub body: &'a [u8],
}

/// Adds authentication headers to one outgoing request.
pub trait Authenticator: Send + Sync {
    /// Strategy name for logging (`api_key`, `bearer`, `sigv4`).
    fn id(&self) -> &str;

    /// Insert the headers that authenticate `request`.
    fn authorize<'a>(
        &'a self,
        request: SignableRequest<'a>,
        headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Pick the strategy matching a credentials variant. `timeout` bounds any
/// token exchange the strategy performs.
pub fn authenticator_for(
    credentials: &Credentials,
    http: reqwest::Client,
    timeout: Duration,
) -> Arc<dyn Authenticator> {
    match credentials {
        Credentials::ApiKey(c) => Arc::new(ApiKeyAuth::new(c.api_key.clone())),
        Credentials::AccessKey(c) => Arc::new(SigV4Auth::new(SigV4Signer::new(c))),
        Credentials::ClientCredentials(c) => Arc::new(BearerAuth::new(
            Arc::new(TokenProvider::new(c, http).with_timeout(timeout)),
            c.api_key.clone(),
        )),
    }
}

/// Static API key only.
#[derive(Debug)]
pub struct ApiKeyAuth {
    api_key: Secret<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Secret<String>) -> Self {
        Self { api_key }
    }
}

impl Authenticator for ApiKeyAuth {
    fn id(&self) -> &str {
        "api_key"
    }

    fn authorize<'a>(
        &'a self,
        _request: SignableRequest<'a>,
        headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            insert_sensitive(headers, HeaderName::from_static(API_KEY_HEADER), self.api_key.expose())
        })
    }
}

/// OAuth2 bearer token with an optional static API key.
#[derive(Debug)]
pub struct BearerAuth {
    tokens: Arc<TokenProvider>,
    api_key: Option<Secret<String>>,
}

impl BearerAuth {
    pub fn new(tokens: Arc<TokenProvider>, api_key: Option<Secret<String>>) -> Self {
        Self { tokens, api_key }
    }

    pub fn token_provider(&self) -> &Arc<TokenProvider> {
        &self.tokens
    }
}

impl Authenticator for BearerAuth {
    fn id(&self) -> &str {
        "bearer"
    }

    fn authorize<'a>(
        &'a self,
        _request: SignableRequest<'a>,
        headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let token = self.tokens.access_token().await?;
            insert_sensitive(headers, AUTHORIZATION, &format!("Bearer {token}"))?;
            if let Some(api_key) = &self.api_key {
                insert_sensitive(headers, HeaderName::from_static(API_KEY_HEADER), api_key.expose())?;
            }
            Ok(())
        })
    }
}

/// Per-request HMAC signature.
#[derive(Debug)]
pub struct SigV4Auth {
    signer: SigV4Signer,
}

impl SigV4Auth {
    pub fn new(signer: SigV4Signer) -> Self {
        Self { signer }
    }
}

impl Authenticator for SigV4Auth {
    fn id(&self) -> &str {
        "sigv4"
    }

    fn authorize<'a>(
        &'a self,
        request: SignableRequest<'a>,
        headers: &'a mut HeaderMap,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let signed = self
                .signer
                .sign_headers(request.url, request.method, request.body)?;
            for (name, value) in signed.pairs() {
                insert_sensitive(headers, HeaderName::from_static(name), value)?;
            }
            Ok(())
        })
    }
}

fn insert_sensitive(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
    value.set_sensitive(true);
    headers.insert(name, value);
    Ok(())
}
