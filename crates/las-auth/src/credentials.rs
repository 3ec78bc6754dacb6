//! Credential resolution
//!
//! Identity material comes in three shapes:
//! - a static API key (`api_key` + `api_endpoint`)
//! - legacy access keys used for HMAC request signing
//!   (`access_key_id` + `secret_access_key` + `api_key` + `api_endpoint`)
//! - OAuth2 client credentials exchanged for bearer tokens
//!   (`client_id` + `client_secret` + `auth_endpoint` + `api_endpoint`)
//!
//! `CredentialsResolver` tries its sources in a fixed order and the first
//! source that yields a complete set wins:
//! 1. explicit values
//! 2. an explicit credentials file (section `default`)
//! 3. `LAS_*` environment variables, as a full client-credentials set
//! 4. `~/.lucidtech/credentials.cfg` (section `default`)
//!
//! Requesting a named profile reads only that section of the credentials file;
//! the environment is not consulted. A source that names a variant (any
//! client-credential or access-key field) must complete that variant; it never
//! degrades to a weaker one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use common::Secret;
use tracing::{debug, info};

use crate::constants::{
    CONFIG_DIR, CREDENTIALS_FILE, DEFAULT_PROFILE, ENV_API_ENDPOINT, ENV_API_KEY,
    ENV_AUTH_ENDPOINT, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
};
use crate::error::{Error, Result};
use crate::profile::{ProfileFile, parse_bool};

/// Static API key credentials.
#[derive(Debug, Clone)]
pub struct ApiKeyCredentials {
    pub api_key: Secret<String>,
    pub api_endpoint: String,
}

/// Legacy access-key credentials, used to sign each request.
#[derive(Debug, Clone)]
pub struct AccessKeyCredentials {
    pub access_key_id: String,
    pub secret_access_key: Secret<String>,
    pub session_token: Option<Secret<String>>,
    pub api_key: Secret<String>,
    pub api_endpoint: String,
}

/// OAuth2 client credentials, exchanged for short-lived bearer tokens.
///
/// `cached_profile` names the entry in the shared token cache file. When it is
/// `None` tokens live only in memory.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub auth_endpoint: String,
    pub api_endpoint: String,
    pub api_key: Option<Secret<String>>,
    pub cached_profile: Option<String>,
}

/// Complete identity material for one client instance.
#[derive(Debug, Clone)]
pub enum Credentials {
    ApiKey(ApiKeyCredentials),
    AccessKey(AccessKeyCredentials),
    ClientCredentials(ClientCredentials),
}

impl Credentials {
    /// OAuth2 client credentials from explicit values.
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_endpoint: impl Into<String>,
        api_endpoint: impl Into<String>,
    ) -> Result<Self> {
        let raw = RawCredentials {
            client_id: Some(client_id.into()),
            client_secret: Some(Secret::new(client_secret.into())),
            auth_endpoint: Some(auth_endpoint.into()),
            api_endpoint: Some(api_endpoint.into()),
            ..Default::default()
        };
        raw.client_credentials()
            .map(Credentials::ClientCredentials)
            .ok_or_else(|| missing("explicit client credentials"))
    }

    /// Legacy access-key credentials from explicit values.
    pub fn access_key(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        api_key: impl Into<String>,
        api_endpoint: impl Into<String>,
    ) -> Result<Self> {
        let raw = RawCredentials {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(Secret::new(secret_access_key.into())),
            api_key: Some(Secret::new(api_key.into())),
            api_endpoint: Some(api_endpoint.into()),
            ..Default::default()
        };
        raw.access_keys()
            .map(Credentials::AccessKey)
            .ok_or_else(|| missing("explicit access keys"))
    }

    /// Static API key credentials from explicit values.
    pub fn api_key(api_key: impl Into<String>, api_endpoint: impl Into<String>) -> Result<Self> {
        let raw = RawCredentials {
            api_key: Some(Secret::new(api_key.into())),
            api_endpoint: Some(api_endpoint.into()),
            ..Default::default()
        };
        raw.api_key_only()
            .map(Credentials::ApiKey)
            .ok_or_else(|| missing("explicit api key"))
    }

    /// Base URL every API path is appended to.
    pub fn api_endpoint(&self) -> &str {
        match self {
            Credentials::ApiKey(c) => &c.api_endpoint,
            Credentials::AccessKey(c) => &c.api_endpoint,
            Credentials::ClientCredentials(c) => &c.api_endpoint,
        }
    }

    /// Static API key, if this variant carries one.
    pub fn api_key_secret(&self) -> Option<&Secret<String>> {
        match self {
            Credentials::ApiKey(c) => Some(&c.api_key),
            Credentials::AccessKey(c) => Some(&c.api_key),
            Credentials::ClientCredentials(c) => c.api_key.as_ref(),
        }
    }

    /// Variant label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::ApiKey(_) => "api_key",
            Credentials::AccessKey(_) => "access_key",
            Credentials::ClientCredentials(_) => "client_credentials",
        }
    }
}

/// Possibly incomplete identity material gathered from a single source.
#[derive(Debug, Clone, Default)]
pub struct RawCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
    pub api_key: Option<Secret<String>>,
    pub auth_endpoint: Option<String>,
    pub api_endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<Secret<String>>,
    pub session_token: Option<Secret<String>>,
    pub cached_profile: Option<String>,
}

impl RawCredentials {
    /// Gather the `LAS_*` variables through `lookup`.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            client_id: lookup(ENV_CLIENT_ID),
            client_secret: lookup(ENV_CLIENT_SECRET).map(Secret::new),
            api_key: lookup(ENV_API_KEY).map(Secret::new),
            auth_endpoint: lookup(ENV_AUTH_ENDPOINT),
            api_endpoint: lookup(ENV_API_ENDPOINT),
            ..Default::default()
        }
    }

    /// Gather a profile section of the credentials file.
    ///
    /// `use_cache = true` enables the token cache under the profile's name.
    pub fn from_section(profile: &str, section: &HashMap<String, String>) -> Self {
        let get = |key: &str| section.get(key).cloned();
        let use_cache = section
            .get("use_cache")
            .and_then(|v| parse_bool(v))
            .unwrap_or(false);
        Self {
            client_id: get("client_id"),
            client_secret: get("client_secret").map(Secret::new),
            api_key: get("api_key").map(Secret::new),
            auth_endpoint: get("auth_endpoint"),
            api_endpoint: get("api_endpoint"),
            access_key_id: get("access_key_id"),
            secret_access_key: get("secret_access_key").map(Secret::new),
            session_token: get("session_token").map(Secret::new),
            cached_profile: use_cache.then(|| profile.to_string()),
        }
    }

    /// The variant these fields name, if all of its required fields are non-empty.
    ///
    /// Any client-credential field selects client credentials; otherwise any
    /// access-key field selects access keys; otherwise a bare API key. A
    /// selected variant that is incomplete yields `None`.
    pub fn complete(self) -> Option<Credentials> {
        if self.names_client_credentials() {
            self.client_credentials().map(Credentials::ClientCredentials)
        } else if self.names_access_keys() {
            self.access_keys().map(Credentials::AccessKey)
        } else {
            self.api_key_only().map(Credentials::ApiKey)
        }
    }

    fn names_client_credentials(&self) -> bool {
        present(&self.client_id) || present_secret(&self.client_secret) || present(&self.auth_endpoint)
    }

    fn names_access_keys(&self) -> bool {
        present(&self.access_key_id) || present_secret(&self.secret_access_key)
    }

    fn client_credentials(self) -> Option<ClientCredentials> {
        if !(present(&self.client_id)
            && present_secret(&self.client_secret)
            && present(&self.auth_endpoint)
            && present(&self.api_endpoint))
        {
            return None;
        }
        Some(ClientCredentials {
            client_id: self.client_id?,
            client_secret: self.client_secret?,
            auth_endpoint: self.auth_endpoint?,
            api_endpoint: self.api_endpoint?,
            api_key: self.api_key.filter(|k| !k.is_blank()),
            cached_profile: self.cached_profile,
        })
    }

    fn access_keys(self) -> Option<AccessKeyCredentials> {
        if !(present(&self.access_key_id)
            && present_secret(&self.secret_access_key)
            && present_secret(&self.api_key)
            && present(&self.api_endpoint))
        {
            return None;
        }
        Some(AccessKeyCredentials {
            access_key_id: self.access_key_id?,
            secret_access_key: self.secret_access_key?,
            session_token: self.session_token.filter(|t| !t.is_blank()),
            api_key: self.api_key?,
            api_endpoint: self.api_endpoint?,
        })
    }

    fn api_key_only(self) -> Option<ApiKeyCredentials> {
        if !(present_secret(&self.api_key) && present(&self.api_endpoint)) {
            return None;
        }
        Some(ApiKeyCredentials {
            api_key: self.api_key?,
            api_endpoint: self.api_endpoint?,
        })
    }
}

fn missing(source: &str) -> Error {
    Error::MissingCredentials(format!("{source}: required fields missing or empty"))
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn present_secret(value: &Option<Secret<String>>) -> bool {
    value.as_ref().is_some_and(|v| !v.is_blank())
}

/// `~/.lucidtech/credentials.cfg`, if a home directory is known.
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CREDENTIALS_FILE))
}

/// Read one profile section. Missing file or section is `Ok(None)`.
pub fn read_profile(path: &Path, profile: &str) -> Result<Option<RawCredentials>> {
    let Some(file) = ProfileFile::load(path)? else {
        return Ok(None);
    };
    Ok(file
        .section(profile)
        .map(|section| RawCredentials::from_section(profile, section)))
}

/// Resolves credentials from the configured sources in precedence order.
#[derive(Debug, Default, Clone)]
pub struct CredentialsResolver {
    explicit: Option<RawCredentials>,
    credentials_path: Option<PathBuf>,
    profile: Option<String>,
    default_path: Option<PathBuf>,
}

impl CredentialsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values passed directly by the caller.
    pub fn explicit(mut self, raw: RawCredentials) -> Self {
        self.explicit = Some(raw);
        self
    }

    /// Credentials file to consult before the environment.
    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Read only this profile section of the credentials file.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Override the fallback file (normally `~/.lucidtech/credentials.cfg`).
    pub fn default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    /// Resolve using the process environment.
    pub fn resolve(&self) -> Result<Credentials> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using `env` for environment lookups.
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        if let Some(raw) = &self.explicit
            && let Some(credentials) = raw.clone().complete()
        {
            info!(source = "explicit", kind = credentials.kind(), "resolved credentials");
            return Ok(credentials);
        }

        if let Some(profile) = &self.profile {
            let path = self.file_for_profile().ok_or_else(|| {
                Error::MissingCredentials("no credentials file for named profile".into())
            })?;
            return read_profile(&path, profile)?
                .and_then(RawCredentials::complete)
                .inspect(|c| {
                    info!(source = "profile", profile = %profile, kind = c.kind(), "resolved credentials")
                })
                .ok_or_else(|| {
                    Error::MissingCredentials(format!(
                        "profile `{profile}` missing or incomplete in {}",
                        path.display()
                    ))
                });
        }

        if let Some(path) = &self.credentials_path
            && let Some(credentials) = complete_from_file(path)?
        {
            info!(source = "file", path = %path.display(), kind = credentials.kind(), "resolved credentials");
            return Ok(credentials);
        }

        if let Some(credentials) = RawCredentials::from_env(&env).client_credentials() {
            info!(source = "environment", kind = "client_credentials", "resolved credentials");
            return Ok(Credentials::ClientCredentials(credentials));
        }
        debug!("environment credentials absent or incomplete");

        if let Some(path) = self.default_path.clone().or_else(default_credentials_path)
            && let Some(credentials) = complete_from_file(&path)?
        {
            info!(source = "default_file", path = %path.display(), kind = credentials.kind(), "resolved credentials");
            return Ok(credentials);
        }

        Err(Error::MissingCredentials(
            "no complete credentials in explicit values, credentials file, LAS_* environment or ~/.lucidtech/credentials.cfg".into(),
        ))
    }

    fn file_for_profile(&self) -> Option<PathBuf> {
        self.credentials_path
            .clone()
            .or_else(|| self.default_path.clone())
            .or_else(default_credentials_path)
    }
}

fn complete_from_file(path: &Path) -> Result<Option<Credentials>> {
    Ok(read_profile(path, DEFAULT_PROFILE)?.and_then(RawCredentials::complete))
}
