//! INI-style credentials file
//!
//! ```text
//! [default]
//! client_id = ...
//! client_secret = ...
//! auth_endpoint = auth.lucidtech.ai
//! api_endpoint = https://api.lucidtech.ai/v1
//! use_cache = true
//! ```
//!
//! Sections are profiles. Keys are case-insensitive, values are trimmed.
//! Lines starting with `#` or `;` are comments.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Parsed credentials file: profile name -> key -> value.
#[derive(Debug, Default)]
pub struct ProfileFile {
    sections: HashMap<String, HashMap<String, String>>,
}

impl ProfileFile {
    /// Parse file contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some((key, value)) = line.split_once(['=', ':']) else {
                return Err(Error::CredentialParse(format!(
                    "line {}: expected `key = value`",
                    index + 1
                )));
            };

            let Some(section) = current.as_ref() else {
                return Err(Error::CredentialParse(format!(
                    "line {}: key `{}` outside of a [section]",
                    index + 1,
                    key.trim()
                )));
            };

            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_lowercase(), value.trim().to_string());
        }

        Ok(Self { sections })
    }

    /// Load and parse a credentials file. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!(path = %path.display(), "credentials file not found");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("reading credentials file {}: {e}", path.display())))?;
        Self::parse(&contents).map(Some)
    }

    /// Key/value pairs of a profile section.
    pub fn section(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(name)
    }

    /// Names of all sections.
    pub fn profiles(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }
}

/// Interpret an INI boolean (`true/yes/on/1`, case-insensitive).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
