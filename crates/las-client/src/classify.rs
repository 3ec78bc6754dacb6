//! Response classification
//!
//! Maps status code plus body sentinel onto the class that drives retry and
//! the error raised. Sentinels are matched against the top-level values of a
//! JSON error body (`{"message": "Forbidden"}`); a body that is not a JSON
//! object falls back to a substring match.

use serde_json::Value;

pub const FORBIDDEN: &str = "Forbidden";
pub const TOO_MANY_REQUESTS: &str = "Too Many Requests";
pub const LIMIT_EXCEEDED: &str = "Limit Exceeded";

/// Outcome class of one HTTP attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    /// 403 + `Forbidden`
    ClientInvalidCredentials,
    /// 429 + `Too Many Requests`, retried by the outer loop
    RateLimited,
    /// 429 + `Limit Exceeded`
    QuotaExceeded,
    /// 5xx, retried by the inner loop
    TransientServerError,
    /// Everything else, surfaced immediately
    PermanentClientError,
}

impl Classification {
    /// Label used for log fields and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::ClientInvalidCredentials => "invalid_credentials",
            Classification::RateLimited => "rate_limited",
            Classification::QuotaExceeded => "quota_exceeded",
            Classification::TransientServerError => "server_error",
            Classification::PermanentClientError => "client_error",
        }
    }
}

/// Classify a response by status and body.
pub fn classify(status: u16, body: &str) -> Classification {
    match status {
        200..=299 => Classification::Success,
        403 if has_sentinel(body, FORBIDDEN) => Classification::ClientInvalidCredentials,
        429 if has_sentinel(body, TOO_MANY_REQUESTS) => Classification::RateLimited,
        429 if has_sentinel(body, LIMIT_EXCEEDED) => Classification::QuotaExceeded,
        500..=599 => Classification::TransientServerError,
        _ => Classification::PermanentClientError,
    }
}

fn has_sentinel(body: &str, sentinel: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .values()
            .any(|v| v.as_str().is_some_and(|s| s == sentinel)),
        _ => body.contains(sentinel),
    }
}
