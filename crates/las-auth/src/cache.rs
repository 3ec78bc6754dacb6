//! On-disk token cache shared across process invocations
//!
//! A JSON object keyed by profile name:
//!
//! ```json
//! { "default": { "access_token": "...", "expires_in": 1735500000 } }
//! ```
//!
//! `expires_in` holds the absolute expiry in unix seconds so an entry written
//! by one process is still meaningful to the next. Writes replace the whole
//! file atomically (unique temp file + rename) with 0600 permissions, and
//! writers within a process are serialized so no profile's entry is lost.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::constants::{CONFIG_DIR, TOKEN_CACHE_FILE};
use crate::error::{Error, Result};

/// Held across every read-modify-write of a cache file.
static STORE_LOCK: Mutex<()> = Mutex::const_new(());

/// A bearer token and the unix second at which it stops being usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    #[serde(rename = "expires_in")]
    pub expires_at: u64,
}

impl CachedToken {
    /// Usable iff the token is non-empty and `now < expires_at`.
    pub fn is_valid_at(&self, now_secs: u64) -> bool {
        !self.access_token.is_empty() && now_secs < self.expires_at
    }
}

/// Handle to the cache file. Holds no state beyond the path.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.lucidtech/token-cache.json`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(TOKEN_CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry for `profile`. A missing or unreadable file is a cache miss.
    pub async fn load(&self, profile: &str) -> Option<CachedToken> {
        let mut entries = self.read_all().await;
        let token = entries.remove(profile);
        debug!(path = %self.path.display(), profile, hit = token.is_some(), "token cache lookup");
        token
    }

    /// Insert or replace the entry for `profile`, keeping other profiles.
    pub async fn store(&self, profile: &str, token: &CachedToken) -> Result<()> {
        let _guard = STORE_LOCK.lock().await;
        let mut entries = self.read_all().await;
        entries.insert(profile.to_string(), token.clone());
        write_atomic(&self.path, &entries).await
    }

    async fn read_all(&self) -> HashMap<String, CachedToken> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "token cache unreadable, ignoring");
                return HashMap::new();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "token cache corrupt, ignoring");
                HashMap::new()
            }
        }
    }
}

/// Write the cache atomically, creating parent directories as needed.
async fn write_atomic(path: &Path, entries: &HashMap<String, CachedToken>) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| Error::Io(format!("serializing token cache: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("token cache path has no parent directory".into()))?
        .to_path_buf();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::Io(format!("creating token cache directory: {e}")))?;

    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || persist(&dir, &target, json.as_bytes()))
        .await
        .map_err(|e| Error::Io(format!("token cache writer panicked: {e}")))??;

    debug!(path = %path.display(), profiles = entries.len(), "persisted token cache");
    Ok(())
}

fn persist(dir: &Path, target: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::Io(format!("creating temp token cache: {e}")))?;
    tmp.write_all(contents)
        .map_err(|e| Error::Io(format!("writing temp token cache: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(|e| Error::Io(format!("setting token cache permissions: {e}")))?;
    }

    tmp.persist(target)
        .map_err(|e| Error::Io(format!("renaming temp token cache: {e}")))?;
    Ok(())
}
