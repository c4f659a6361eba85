//! Server configuration.
//!
//! Settings are read from a YAML file (`EASY_WWW_CONFIG`, default
//! `easy-www.yaml`). A missing file means defaults. `LISTEN=host:port`
//! overrides the bind address.
//!
//! ```yaml
//! server:
//!   address: 127.0.0.1
//!   port: 8866
//! site:
//!   default_root: ./html
//!   hostname: example.test
//!   subdomain_root:
//!     images: ./img
//!     images.other: ../other/img
//!   redirect_to_matched_subdomain: true
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::server::backoff::Backoff;

pub const CONFIG_PATH_ENV: &str = "EASY_WWW_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "easy-www.yaml";

/// Key names understood by [`ConfigSource`].
pub mod keys {
    pub const ADDRESS: &str = "address";
    pub const PORT: &str = "port";
    pub const DEFAULT_ROOT: &str = "defaultRoot";
    pub const HOSTNAME: &str = "hostname";
    pub const SUBDOMAIN_ROOT: &str = "subdomainRoot";
    pub const REDIRECT_TO_MATCHED_SUBDOMAIN: &str = "redirectToMatchedSubdomain";
}

/// Key/value view over persisted settings.
///
/// Lookups have no side effects. Unknown keys yield `None` (or an empty map).
pub trait ConfigSource: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
    fn get_int(&self, key: &str) -> Option<i64>;
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_map(&self, key: &str) -> HashMap<String, String>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Upper bound on concurrently handled connections.
    pub max_connections: usize,
    /// Bytes read per request before input is cut off.
    pub max_request_bytes: usize,
    pub wait_initial_ms: u64,
    pub wait_factor: f64,
    /// Total time a silent client is given before the socket is closed.
    pub wait_cap_ms: u64,
    /// Deadline for building and writing one response.
    pub response_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub default_root: Option<String>,
    pub hostname: Option<String>,
    pub subdomain_root: HashMap<String, String>,
    pub redirect_to_matched_subdomain: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8866,
            max_connections: 256,
            max_request_bytes: 1024 * 1024,
            wait_initial_ms: 20,
            wait_factor: 1.5,
            wait_cap_ms: 10_000,
            response_timeout_ms: 30_000,
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            default_root: Some("./".to_string()),
            hostname: Some("localhost".to_string()),
            subdomain_root: HashMap::new(),
            redirect_to_matched_subdomain: true,
        }
    }
}

impl Config {
    /// Loads the config file named by `EASY_WWW_CONFIG`, then applies `LISTEN`.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut cfg = Self::from_file(Path::new(&path))?;
        if let Ok(listen) = std::env::var("LISTEN") {
            cfg.apply_listen(&listen)?;
        }

        Ok(cfg)
    }

    /// Reads `path`, falling back to defaults when it does not exist.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overrides address and port from a `host:port` string.
    pub fn apply_listen(&mut self, listen: &str) -> anyhow::Result<()> {
        let (address, port) = listen
            .rsplit_once(':')
            .with_context(|| format!("LISTEN must be host:port, got {:?}", listen))?;
        self.server.port = port
            .parse()
            .with_context(|| format!("invalid port in LISTEN: {:?}", port))?;
        self.server.address = address.to_string();
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.server.response_timeout_ms)
    }

    pub fn wait_backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.server.wait_initial_ms),
            self.server.wait_factor,
            Duration::from_millis(self.server.wait_cap_ms),
        )
    }
}

impl ConfigSource for Config {
    fn get_string(&self, key: &str) -> Option<String> {
        match key {
            keys::ADDRESS => Some(self.server.address.clone()),
            keys::PORT => Some(self.server.port.to_string()),
            keys::DEFAULT_ROOT => self.site.default_root.clone(),
            keys::HOSTNAME => self.site.hostname.clone(),
            keys::REDIRECT_TO_MATCHED_SUBDOMAIN => {
                Some(self.site.redirect_to_matched_subdomain.to_string())
            }
            _ => None,
        }
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.parse().ok()
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_string(key)?.parse().ok()
    }

    fn get_map(&self, key: &str) -> HashMap<String, String> {
        match key {
            keys::SUBDOMAIN_ROOT => self.site.subdomain_root.clone(),
            _ => HashMap::new(),
        }
    }
}

/// Read-only routing settings taken once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfig {
    pub default_root: Option<PathBuf>,
    /// Canonical domain; `None` disables subdomain matching.
    pub hostname: Option<String>,
    pub subdomain_roots: HashMap<String, PathBuf>,
    pub redirect_to_matched_subdomain: bool,
}

impl SiteConfig {
    /// Copies the routing keys out of `source`. Empty strings count as unset.
    pub fn snapshot(source: &dyn ConfigSource) -> Self {
        let non_empty = |key: &str| source.get_string(key).filter(|v| !v.trim().is_empty());

        Self {
            default_root: non_empty(keys::DEFAULT_ROOT).map(PathBuf::from),
            hostname: non_empty(keys::HOSTNAME),
            subdomain_roots: source
                .get_map(keys::SUBDOMAIN_ROOT)
                .into_iter()
                .map(|(label, root)| (label, PathBuf::from(root)))
                .collect(),
            redirect_to_matched_subdomain: source
                .get_bool(keys::REDIRECT_TO_MATCHED_SUBDOMAIN)
                .unwrap_or(false),
        }
    }
}
