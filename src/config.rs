//! Process configuration
//!
//! Built once at startup and shared read-only with the request handlers.
//! Each field is resolved from the environment first, then from a local
//! `config.yaml`, then from its default.
//!
//! ```yaml
//! insta:
//!   api_key: "..."
//!   base_url: "https://instafinancials.com/api/InstaBasic/v1/json"
//!   webhook_url: "https://example.org/webhook/insta"
//!   strip_prefixes: ["InstaBasic", "InstaFinancials"]
//! app:
//!   host: "0.0.0.0"
//!   port: 8000
//! webhook:
//!   output_dir: "data/webhook_payloads"
//! ```

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::provider::DEFAULT_BASE_URL;
use crate::transform::FlattenOptions;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_WEBHOOK_DIR: &str = "data/webhook_payloads";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid {name} value '{value}'")]
    Invalid { name: &'static str, value: String },
}

// ============================================================================
// File layer
// ============================================================================

/// Contents of the optional YAML config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub insta: InstaSection,
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub webhook: WebhookSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstaSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub webhook_url: Option<String>,
    pub strip_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookSection {
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Load the config file. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub webhook_url: Option<String>,
    pub strip_prefixes: Vec<String>,
    pub webhook_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

// Hand-written so the API key never reaches the logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("webhook_url", &self.webhook_url)
            .field("strip_prefixes", &self.strip_prefixes)
            .field("webhook_dir", &self.webhook_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            webhook_url: None,
            strip_prefixes: Vec::new(),
            webhook_dir: PathBuf::from(DEFAULT_WEBHOOK_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Resolve from the process environment and `CONFIG_PATH` (default `config.yaml`)
    pub fn load() -> Result<Self, ConfigError> {
        let path = non_empty(std::env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let file = FileConfig::load(Path::new(&path))?;
        if file.is_some() {
            tracing::info!("Loaded local config fallback from {}", path);
        }
        Self::resolve(|name| std::env::var(name).ok(), file.unwrap_or_default())
    }

    /// Resolve from an environment lookup and a file layer. Empty strings count as unset.
    pub fn resolve<F>(env: F, file: FileConfig) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(env(name));
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => file.app.port.unwrap_or(defaults.port),
        };

        let strip_prefixes = match var("INSTA_STRIP_PREFIXES") {
            Some(raw) => parse_list(&raw),
            None => file
                .insta
                .strip_prefixes
                .map(|list| list.into_iter().filter(|p| !p.trim().is_empty()).collect::<Vec<_>>())
                .unwrap_or(defaults.strip_prefixes),
        };

        Ok(Self {
            api_key: var("INSTA_API_KEY").or(non_empty(file.insta.api_key)),
            base_url: var("INSTA_BASE_URL")
                .or(non_empty(file.insta.base_url))
                .unwrap_or(defaults.base_url),
            webhook_url: var("WEBHOOK_URL").or(non_empty(file.insta.webhook_url)),
            strip_prefixes,
            webhook_dir: var("WEBHOOK_DIR")
                .map(PathBuf::from)
                .or(file.webhook.output_dir)
                .unwrap_or(defaults.webhook_dir),
            host: var("HOST")
                .or(non_empty(file.app.host))
                .unwrap_or(defaults.host),
            port,
        })
    }

    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions::with_strip_prefixes(self.strip_prefixes.iter().cloned())
    }

    /// Resolve `host:port` to a listen address. Hostnames such as `localhost` go through DNS.
    pub async fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::Invalid {
            name: "HOST",
            value: format!("{}:{}", self.host, self.port),
        };
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| invalid())?;
        addrs.next().ok_or_else(invalid)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
