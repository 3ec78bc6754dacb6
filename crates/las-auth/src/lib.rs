//! Credentials and request authentication for Lucidtech AI Services
//!
//! Resolves identity material from explicit values, a credentials file or the
//! environment, then turns it into per-request auth headers: a static API key,
//! a cached OAuth2 bearer token, or an HMAC request signature.

pub mod authenticator;
pub mod cache;
pub mod clock;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod profile;
pub mod signing;
pub mod token;

pub use authenticator::{
    ApiKeyAuth, Authenticator, BearerAuth, SigV4Auth, SignableRequest, authenticator_for,
};
pub use cache::{CachedToken, TokenCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{
    AccessKeyCredentials, ApiKeyCredentials, ClientCredentials, Credentials, CredentialsResolver,
    RawCredentials, default_credentials_path,
};
pub use error::{Error, Result};
pub use signing::{SigV4Signer, SignedHeaders};
pub use token::{
    DEFAULT_EXCHANGE_TIMEOUT, TokenProvider, TokenResponse, exchange_client_credentials, token_url,
};
