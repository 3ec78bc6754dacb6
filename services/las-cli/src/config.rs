//! Client settings
//!
//! Precedence for the file location: `--config` > `LAS_CONFIG_PATH` > `las.toml`.
//! A missing file at the default location means defaults; a file named
//! explicitly must exist. Credentials never live here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use las_client::RetryPolicy;
use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "LAS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "las.toml";

/// Tunables for the request executor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_rate_limit_attempts")]
    pub rate_limit_attempts: u32,
    #[serde(default = "default_transient_attempts")]
    pub transient_attempts: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Overrides the endpoint from the credentials.
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

fn default_rate_limit_attempts() -> u32 {
    RetryPolicy::rate_limited().max_attempts
}

fn default_transient_attempts() -> u32 {
    RetryPolicy::transient().max_attempts
}

fn default_base_delay() -> u64 {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            rate_limit_attempts: default_rate_limit_attempts(),
            transient_attempts: default_transient_attempts(),
            base_delay_ms: default_base_delay(),
            api_endpoint: None,
        }
    }
}

impl Settings {
    /// Parse and validate a TOML settings file.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> common::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> common::Result<()> {
        if self.timeout_secs == 0 {
            return Err(common::Error::Config("timeout_secs must be greater than 0".into()));
        }
        if self.rate_limit_attempts == 0 {
            return Err(common::Error::Config(
                "rate_limit_attempts must be greater than 0".into(),
            ));
        }
        if self.transient_attempts == 0 {
            return Err(common::Error::Config(
                "transient_attempts must be greater than 0".into(),
            ));
        }
        if let Some(endpoint) = &self.api_endpoint
            && !endpoint.starts_with("http://")
            && !endpoint.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "api_endpoint must start with http:// or https://, got: {endpoint}"
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::rate_limited();
        RetryPolicy::new(
            self.rate_limit_attempts,
            Duration::from_millis(self.base_delay_ms),
            defaults.max_delay,
        )
    }

    pub fn transient_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::transient();
        RetryPolicy::new(
            self.transient_attempts,
            Duration::from_millis(self.base_delay_ms),
            defaults.max_delay,
        )
    }

    /// Resolve the settings path from the CLI flag or `LAS_CONFIG_PATH`.
    /// The boolean is true when the path was named explicitly.
    pub fn resolve_path(cli_path: Option<&str>) -> (PathBuf, bool) {
        if let Some(p) = cli_path {
            return (PathBuf::from(p), true);
        }
        if let Ok(p) = std::env::var(CONFIG_PATH_ENV) {
            return (PathBuf::from(p), true);
        }
        (PathBuf::from(DEFAULT_CONFIG_PATH), false)
    }
}
