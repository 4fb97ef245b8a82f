use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Activity journal settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct JournalConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Main configuration structure. Every field is optional so layered files
/// only override what they set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-request timeout
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// How long the shell waits for a page to finish loading before printing
    #[serde(default)]
    pub settle_timeout_ms: Option<u64>,
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    #[serde(default)]
    pub journal: JournalConfig,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_settle_timeout_ms() -> u64 {
    15_000
}

/// `~/.tutsville`, or `.tutsville` when there is no home directory
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".tutsville"))
        .unwrap_or_else(|| PathBuf::from(".tutsville"))
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.tutsville/config.local.toml) > project
    /// (.tutsville/config.toml) > user (~/.tutsville/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        let user_config = home_dir().join("config.toml");
        if user_config.exists() {
            config.merge(Self::load_from(&user_config)?);
        }

        let project_config = Path::new(".tutsville").join("config.toml");
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        let local_config = Path::new(".tutsville").join("config.local.toml");
        if local_config.exists() {
            config.merge(Self::load_from(&local_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Config) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.timeout_ms.is_some() {
            self.timeout_ms = other.timeout_ms;
        }
        if other.settle_timeout_ms.is_some() {
            self.settle_timeout_ms = other.settle_timeout_ms;
        }
        if other.session_file.is_some() {
            self.session_file = other.session_file;
        }
        if other.journal.enabled.is_some() {
            self.journal.enabled = other.journal.enabled;
        }
        if other.journal.dir.is_some() {
            self.journal.dir = other.journal.dir;
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or_else(default_timeout_ms)
    }

    pub fn settle_timeout_ms(&self) -> u64 {
        self.settle_timeout_ms.unwrap_or_else(default_settle_timeout_ms)
    }

    pub fn session_file(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| home_dir().join("session.json"))
    }

    pub fn journal_enabled(&self) -> bool {
        self.journal.enabled.unwrap_or(true)
    }

    pub fn journal_dir(&self) -> PathBuf {
        self.journal
            .dir
            .clone()
            .unwrap_or_else(|| home_dir().join("journal"))
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let base_url = self.base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(ValidationError {
                field: "base_url".to_string(),
                message: format!("Expected an http(s) URL, got '{}'", base_url),
            });
        }

        if self.timeout_ms() == 0 {
            errors.push(ValidationError {
                field: "timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.settle_timeout_ms() == 0 {
            errors.push(ValidationError {
                field: "settle_timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
