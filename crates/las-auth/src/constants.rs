//! Lucidtech AI Services constants
//!
//! Environment variable names, default file locations, and the fixed
//! parameters of the request-signing scheme. None of these are secrets.

/// Environment variable holding the OAuth client id
pub const ENV_CLIENT_ID: &str = "LAS_CLIENT_ID";

/// Environment variable holding the OAuth client secret
pub const ENV_CLIENT_SECRET: &str = "LAS_CLIENT_SECRET";

/// Environment variable holding the static API key
pub const ENV_API_KEY: &str = "LAS_API_KEY";

/// Environment variable holding the token (auth) endpoint
pub const ENV_AUTH_ENDPOINT: &str = "LAS_AUTH_ENDPOINT";

/// Environment variable holding the API base endpoint
pub const ENV_API_ENDPOINT: &str = "LAS_API_ENDPOINT";

/// Directory under the user's home holding credentials and the token cache
pub const CONFIG_DIR: &str = ".lucidtech";

/// Credentials file name inside `CONFIG_DIR`
pub const CREDENTIALS_FILE: &str = "credentials.cfg";

/// Token cache file name inside `CONFIG_DIR`
pub const TOKEN_CACHE_FILE: &str = "token-cache.json";

/// Profile section used when none is requested explicitly
pub const DEFAULT_PROFILE: &str = "default";

/// Path of the client-credentials token endpoint, relative to the auth endpoint
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Header carrying the static API key on every call
pub const API_KEY_HEADER: &str = "x-api-key";

/// Request-signing algorithm name (legacy HMAC credentials)
pub const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Region baked into the signing scope
pub const SIGNING_REGION: &str = "eu-west-1";

/// Service baked into the signing scope
pub const SIGNING_SERVICE: &str = "execute-api";

/// Terminator of the signing scope and the final key-derivation step
pub const SIGNING_SCOPE_SUFFIX: &str = "aws4_request";
