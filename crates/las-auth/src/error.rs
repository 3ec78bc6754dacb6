//! Error types for credential resolution, token exchange and request signing

/// Errors from authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("credential parse error: {0}")]
    CredentialParse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
