//! Resilient request executor
//!
//! `Client::execute` performs one logical API call:
//! 1. empty values are stripped from body and query
//! 2. the authenticator adds headers (re-run on every attempt)
//! 3. the response is classified and decoded
//!
//! Retries are layered. The outer loop repeats `Too Many Requests` up to the
//! rate-limit budget; inside it, the inner loop repeats transport failures and
//! 5xx up to the transient budget. Any other 4xx surfaces on the first attempt.
//! Each HTTP attempt is bounded by the per-attempt timeout; dropping the
//! returned future abandons the remaining attempts.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use las_auth::{Authenticator, Credentials, CredentialsResolver, SignableRequest, authenticator_for};

use crate::classify::{Classification, classify};
use crate::error::{Error, Result};
use crate::metrics;
use crate::retry::RetryPolicy;
use crate::strip::{strip, strip_map};

/// Default bound on a single HTTP attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Key of the placeholder payload returned for an empty 204.
pub const NO_CONTENT_KEY: &str = "Your request executed successfully";

/// Query parameters. Strings, numbers, booleans and lists of those.
pub type Params = Map<String, Value>;

/// API client bound to one endpoint and one authentication strategy.
///
/// Cheap to clone; clones share the HTTP connection pool and the token cache.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
    authenticator: Arc<dyn Authenticator>,
    timeout: Duration,
    rate_limit: RetryPolicy,
    transient: RetryPolicy,
}

impl Client {
    /// Client for already-resolved credentials, default tunables.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder().credentials(credentials).build()
    }

    /// Client for credentials from the standard sources (environment, then
    /// `~/.lucidtech/credentials.cfg`).
    pub fn from_default_credentials() -> Result<Self> {
        Self::new(CredentialsResolver::new().resolve()?)
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Base URL paths are appended to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Strategy used to authenticate requests.
    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Perform one API call and return the decoded JSON response.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        params: Option<Params>,
    ) -> Result<Value> {
        let url = self.url_for(path, params)?;
        let body = body
            .map(|b| serde_json::to_vec(&strip(b)))
            .transpose()
            .map_err(|e| Error::InvalidRequest(format!("serializing body: {e}")))?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.execute_transient(&method, &url, body.as_deref()).await {
                Err(Error::TooManyRequests(message)) if self.rate_limit.allows_retry(attempt) => {
                    let delay = self.rate_limit.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        classification = Classification::RateLimited.as_str(),
                        message = %message,
                        "rate limited, retrying"
                    );
                    metrics::record_retry(Classification::RateLimited.as_str());
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    pub(crate) async fn get(&self, path: &str, params: Option<Params>) -> Result<Value> {
        self.execute(Method::GET, path, None, params).await
    }

    pub(crate) async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.execute(Method::POST, path, Some(body), None).await
    }

    pub(crate) async fn patch(&self, path: &str, body: Value) -> Result<Value> {
        self.execute(Method::PATCH, path, Some(body), None).await
    }

    pub(crate) async fn delete(&self, path: &str, params: Option<Params>) -> Result<Value> {
        self.execute(Method::DELETE, path, None, params).await
    }

    /// Inner loop: repeat transport failures and 5xx.
    async fn execute_transient(&self, method: &Method, url: &Url, body: Option<&[u8]>) -> Result<Value> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(method, url, body).await {
                Err(e) if e.is_transient() && self.transient.allows_retry(attempt) => {
                    let delay = self.transient.delay_for(attempt);
                    let reason = match &e {
                        Error::Transport(_) => "transport",
                        _ => Classification::TransientServerError.as_str(),
                    };
                    warn!(attempt, delay_ms = delay.as_millis() as u64, classification = reason, error = %e, "transient failure, retrying");
                    metrics::record_retry(reason);
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn send_once(&self, method: &Method, url: &Url, body: Option<&[u8]>) -> Result<Value> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.authenticator
            .authorize(
                SignableRequest {
                    method: method.as_str(),
                    url,
                    body: body.unwrap_or_default(),
                },
                &mut headers,
            )
            .await?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers)
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_transport_error();
                return Err(Error::Transport(describe_transport_error(&e)));
            }
        };

        let status = response.status().as_u16();
        metrics::record_request(status);
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("reading response body: {e}")))?;

        debug!(status, bytes = text.len(), "response received");
        decode_response(status, &text)
    }

    fn url_for(&self, path: &str, params: Option<Params>) -> Result<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.endpoint)
        } else {
            format!("{}/{path}", self.endpoint)
        };
        let mut url = Url::parse(&joined)
            .map_err(|e| Error::InvalidRequest(format!("invalid url {joined}: {e}")))?;

        if let Some(params) = params.map(strip_map)
            && !params.is_empty()
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                match value {
                    Value::Array(items) => {
                        for item in items {
                            pairs.append_pair(key, &query_value(item));
                        }
                    }
                    other => {
                        pairs.append_pair(key, &query_value(other));
                    }
                }
            }
        }
        Ok(url)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("authenticator", &self.authenticator.id())
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("transient", &self.transient)
            .finish()
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

/// Map one response onto a decoded value or a typed error.
pub fn decode_response(status: u16, body: &str) -> Result<Value> {
    match classify(status, body) {
        Classification::Success => match serde_json::from_str(body) {
            Ok(value) => Ok(value),
            Err(_) if status == 204 => Ok(no_content_payload()),
            Err(e) => Err(Error::Decode(format!("status {status}: {e}"))),
        },
        Classification::ClientInvalidCredentials => Err(Error::InvalidCredentials(body.to_string())),
        Classification::RateLimited => Err(Error::TooManyRequests(body.to_string())),
        Classification::QuotaExceeded => Err(Error::LimitExceeded(body.to_string())),
        Classification::TransientServerError | Classification::PermanentClientError => {
            Err(Error::Http {
                status,
                body: body.to_string(),
            })
        }
    }
}

fn no_content_payload() -> Value {
    let mut map = Map::new();
    map.insert(NO_CONTENT_KEY.to_string(), Value::String("204".into()));
    Value::Object(map)
}

/// Builder for `Client`.
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    authenticator: Option<Arc<dyn Authenticator>>,
    endpoint: Option<String>,
    http: Option<reqwest::Client>,
    timeout: Duration,
    rate_limit: RetryPolicy,
    transient: RetryPolicy,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            credentials: None,
            authenticator: None,
            endpoint: None,
            http: None,
            timeout: DEFAULT_TIMEOUT,
            rate_limit: RetryPolicy::rate_limited(),
            transient: RetryPolicy::transient(),
        }
    }
}

impl ClientBuilder {
    /// Credentials supply the endpoint and, unless overridden, the authenticator.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use a specific authentication strategy.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Override the API endpoint from the credentials.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Share an existing HTTP client.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Bound on each HTTP attempt, not on the whole call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Outer budget for `Too Many Requests`.
    pub fn rate_limit_policy(mut self, policy: RetryPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    /// Inner budget for transport failures and 5xx.
    pub fn transient_policy(mut self, policy: RetryPolicy) -> Self {
        self.transient = policy;
        self
    }

    pub fn build(self) -> Result<Client> {
        let http = self.http.unwrap_or_default();

        let endpoint = self
            .endpoint
            .or_else(|| self.credentials.as_ref().map(|c| c.api_endpoint().to_string()))
            .ok_or_else(|| {
                las_auth::Error::MissingCredentials("no api endpoint configured".into())
            })?;
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        Url::parse(&endpoint)
            .map_err(|e| Error::InvalidRequest(format!("invalid api endpoint {endpoint}: {e}")))?;

        let authenticator = match (self.authenticator, &self.credentials) {
            (Some(authenticator), _) => authenticator,
            (None, Some(credentials)) => authenticator_for(credentials, http.clone(), self.timeout),
            (None, None) => {
                return Err(
                    las_auth::Error::MissingCredentials("no credentials or authenticator".into())
                        .into(),
                );
            }
        };

        debug!(endpoint = %endpoint, auth = authenticator.id(), timeout_ms = self.timeout.as_millis() as u64, "built client");
        Ok(Client {
            http,
            endpoint,
            authenticator,
            timeout: self.timeout,
            rate_limit: self.rate_limit,
            transient: self.transient,
        })
    }
}
