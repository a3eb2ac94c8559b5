use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Template catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the curated templates live. The root is read-only for the whole
/// process; identifiers resolve to `<root>/<identifier>.xml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "d_catalog_root")]
    pub root: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: d_catalog_root(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store (management API)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "d_scheme")]
    pub scheme: String,
    /// Management-API port used when the server spec carries none.
    #[serde(default = "d_port")]
    pub port: u16,
    /// Name of the environment variable holding the API key, if any.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    /// Retry budget for read-only calls. Session creation is never
    /// retried: the management API does not guarantee idempotent
    /// definition.
    #[serde(default = "d_3")]
    pub max_read_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            scheme: d_scheme(),
            port: d_port(),
            api_key_env: d_api_key_env(),
            timeout_ms: 8000,
            max_read_retries: 3,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_catalog_root() -> PathBuf {
    PathBuf::from("templates")
}

fn d_scheme() -> String {
    "http".into()
}

fn d_port() -> u16 {
    9433
}

fn d_api_key_env() -> String {
    "XE_STORE_API_KEY".into()
}

fn d_8000() -> u64 {
    8000
}

fn d_3() -> u32 {
    3
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.store.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.store.scheme != "http" && self.store.scheme != "https" {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.scheme".into(),
                message: format!("unknown scheme {:?}, expected http or https", self.store.scheme),
            });
        }

        if self.store.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        if self.catalog.root.as_os_str().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "catalog.root".into(),
                message: "catalog root must not be empty".into(),
            });
        } else if !self.catalog.root.is_dir() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "catalog.root".into(),
                message: format!(
                    "{} does not exist; catalog templates will not resolve",
                    self.catalog.root.display()
                ),
            });
        }

        errors
    }
}
