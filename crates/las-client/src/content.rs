//! Document content normalization
//!
//! Every input shape ends up as a standard base64 string for the JSON body.
//! Bytes that already decode as strict base64 are decoded first so they are
//! not encoded twice.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Document content in one of the accepted shapes.
pub enum Content {
    /// File on disk.
    Path(PathBuf),
    /// Raw bytes, or bytes that are already base64.
    Bytes(Vec<u8>),
    /// Any reader, consumed to the end.
    Reader(Box<dyn Read + Send>),
}

impl Content {
    /// Read the content and encode it as base64.
    pub async fn into_base64(self) -> Result<String> {
        match self {
            Content::Path(path) => {
                let raw = tokio::fs::read(&path)
                    .await
                    .map_err(|e| Error::Content(format!("reading {}: {e}", path.display())))?;
                Ok(STANDARD.encode(raw))
            }
            Content::Bytes(bytes) => {
                let raw = STANDARD.decode(&bytes).unwrap_or(bytes);
                Ok(STANDARD.encode(raw))
            }
            Content::Reader(mut reader) => {
                // Readers may block, keep them off the runtime workers.
                let raw = tokio::task::spawn_blocking(move || {
                    let mut raw = Vec::new();
                    reader.read_to_end(&mut raw).map(|_| raw)
                })
                .await
                .map_err(|e| Error::Content(format!("reader task failed: {e}")))?
                .map_err(|e| Error::Content(format!("reading stream: {e}")))?;
                Ok(STANDARD.encode(raw))
            }
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Content::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Content::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<PathBuf> for Content {
    fn from(path: PathBuf) -> Self {
        Content::Path(path)
    }
}

impl From<&Path> for Content {
    fn from(path: &Path) -> Self {
        Content::Path(path.to_path_buf())
    }
}

/// A string is a file path.
impl From<&str> for Content {
    fn from(path: &str) -> Self {
        Content::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Content::Bytes(bytes.to_vec())
    }
}

impl From<Box<dyn Read + Send>> for Content {
    fn from(reader: Box<dyn Read + Send>) -> Self {
        Content::Reader(reader)
    }
}
