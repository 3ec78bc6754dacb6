//! Error taxonomy surfaced to API callers
//!
//! Callers never see raw HTTP responses. Every failed call ends as one of these
//! variants after the retry budget for its class is spent.

/// Errors from API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credential resolution, token exchange or signing failed.
    #[error(transparent)]
    Auth(#[from] las_auth::Error),

    /// 403 with the `Forbidden` sentinel. Never retried.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// 429 with the `Too Many Requests` sentinel, after the rate-limit budget.
    #[error("too many requests: {0}")]
    TooManyRequests(String),

    /// 429 with the `Limit Exceeded` sentinel. Hard quota, never retried.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Connection failure or per-attempt timeout, after the transient budget.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other non-success response.
    #[error("API returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Success status with an undecodable body.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Document content could not be read or encoded.
    #[error("content error: {0}")]
    Content(String),

    /// Request could not be built (bad endpoint or path).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// True for the credential-resolution failure raised at construction.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, Error::Auth(las_auth::Error::MissingCredentials(_)))
    }

    /// Failures the inner retry loop may repeat: transport errors and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status behind the error, when there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::InvalidCredentials(_) => Some(403),
            Error::TooManyRequests(_) | Error::LimitExceeded(_) => Some(429),
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_covers_transport_and_server_errors() {
        assert!(Error::Transport("reset".into()).is_transient());
        assert!(Error::Http { status: 503, body: String::new() }.is_transient());
        assert!(!Error::Http { status: 404, body: String::new() }.is_transient());
        assert!(!Error::TooManyRequests("x".into()).is_transient());
        assert!(!Error::InvalidCredentials("x".into()).is_transient());
    }

    #[test]
    fn missing_credentials_is_detectable() {
        let err: Error = las_auth::Error::MissingCredentials("none".into()).into();
        assert!(err.is_missing_credentials());
        assert!(err.to_string().contains("missing credentials"));
        assert!(!Error::Decode("x".into()).is_missing_credentials());
    }

    #[test]
    fn status_for_classified_errors() {
        assert_eq!(Error::InvalidCredentials("x".into()).status(), Some(403));
        assert_eq!(Error::LimitExceeded("x".into()).status(), Some(429));
        assert_eq!(Error::Http { status: 418, body: "tea".into() }.status(), Some(418));
        assert_eq!(Error::Transport("x".into()).status(), None);
    }
}
