//! Session cookie jar.
//!
//! The backend authenticates with a `jwt` cookie. Every request carries the
//! jar's cookies and every `Set-Cookie` on a response updates it, which is
//! what a browser does for `credentials: include`. The jar can be persisted
//! so a later invocation stays signed in.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CookieJar {
    #[serde(default)]
    cookies: BTreeMap<String, String>,
    #[serde(skip)]
    dirty: bool,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for the `Cookie` request header, if any cookie is stored
    pub fn header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(pairs.join("; "))
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Apply one `Set-Cookie` header value.
    ///
    /// An empty value or a non-positive `Max-Age` deletes the cookie, which is
    /// how the backend signs a user out.
    pub fn absorb(&mut self, set_cookie: &str) {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let name = name.trim();
        let value = value.trim().trim_matches('"');
        if name.is_empty() {
            return;
        }

        let expired = parts.any(|attr| {
            let Some((key, val)) = attr.split_once('=') else {
                return false;
            };
            key.trim().eq_ignore_ascii_case("max-age")
                && val.trim().parse::<i64>().map(|n| n <= 0).unwrap_or(false)
        });

        if value.is_empty() || expired {
            if self.cookies.remove(name).is_some() {
                self.dirty = true;
            }
        } else if self.cookies.get(name).map(String::as_str) != Some(value) {
            self.cookies.insert(name.to_string(), value.to_string());
            self.dirty = true;
        }
    }

    pub fn clear(&mut self) {
        if !self.cookies.is_empty() {
            self.cookies.clear();
            self.dirty = true;
        }
    }

    /// Returns true once after the jar changed
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// On-disk location of the persisted jar
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub path: PathBuf,
}

impl SessionFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Load the jar, or an empty jar when no session was saved yet
    pub fn load(&self) -> Result<CookieJar> {
        if !self.path.exists() {
            return Ok(CookieJar::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        let jar: CookieJar = serde_json::from_str(&content)
            .with_context(|| format!("Invalid session file {}", self.path.display()))?;
        Ok(jar)
    }

    pub fn save(&self, jar: &CookieJar) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(jar)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        // A file saved before the mode was set keeps its old permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        Ok(())
    }
}
