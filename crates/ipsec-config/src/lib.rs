//! Configuration for the IPsec exporter.
//!
//! Layers, lowest to highest: built-in defaults, an optional TOML file, and
//! `IPSEC_EXPORTER_*` environment variables (`__` separates nesting levels,
//! e.g. `IPSEC_EXPORTER_VICI__HOST`). The binary merges CLI flags on top of
//! the returned [`Figment`] before extracting. The result is translated into
//! the runtime types of `ipsec-core` and `ipsec-vici`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ipsec_core::CollectorConfig;
use ipsec_vici::{Address, SocketConnector};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "IPSEC_EXPORTER_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("config file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub vici: ViciConfig,
    pub collector: CollectorSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `ipsec_core=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8079 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Tcp,
    Unix,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViciConfig {
    pub network: Network,
    /// Used when `network = "tcp"`.
    pub host: String,
    pub port: u16,
    /// Used when `network = "unix"`.
    pub socket: PathBuf,
    /// Per-operation socket timeout.
    pub timeout_secs: u64,
}

impl Default for ViciConfig {
    fn default() -> Self {
        Self {
            network: Network::Tcp,
            host: "localhost".into(),
            port: 4502,
            socket: PathBuf::from("/var/run/charon.vici"),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorSection {
    /// Prepended to every metric name.
    pub prefix: String,
    /// Export certificate metrics.
    pub certificates: bool,
}

impl Default for CollectorSection {
    fn default() -> Self {
        let runtime = CollectorConfig::default();
        Self {
            prefix: runtime.prefix,
            certificates: runtime.certificates,
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Defaults, then `path` (which must exist when given), then environment.
pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }
        figment = figment.merge(Toml::file(path));
    }
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

impl Config {
    /// Load and validate without any CLI overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&figment(path)?)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging.level", "must not be empty"));
        }
        if self.server.port == 0 {
            return Err(invalid("server.port", "must be between 1 and 65535"));
        }
        match self.vici.network {
            Network::Tcp => {
                if self.vici.host.trim().is_empty() {
                    return Err(invalid("vici.host", "must not be empty"));
                }
                if self.vici.port == 0 {
                    return Err(invalid("vici.port", "must be between 1 and 65535"));
                }
            }
            Network::Unix => {
                if self.vici.socket.as_os_str().is_empty() {
                    return Err(invalid("vici.socket", "must not be empty"));
                }
            }
        }
        if self.vici.timeout_secs == 0 {
            return Err(invalid("vici.timeout_secs", "must be at least 1"));
        }
        if !is_valid_prefix(&self.collector.prefix) {
            return Err(invalid(
                "collector.prefix",
                format!(
                    "'{}' is not a valid metric name prefix ([a-zA-Z_:][a-zA-Z0-9_:]*)",
                    self.collector.prefix
                ),
            ));
        }
        Ok(())
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    // ── Translation to runtime types ────────────────────────────────

    pub fn vici_address(&self) -> Address {
        match self.vici.network {
            Network::Tcp => Address::Tcp {
                host: self.vici.host.clone(),
                port: self.vici.port,
            },
            Network::Unix => Address::Unix(self.vici.socket.clone()),
        }
    }

    pub fn vici_timeout(&self) -> Duration {
        Duration::from_secs(self.vici.timeout_secs)
    }

    /// Connector for the configured daemon endpoint.
    pub fn connector(&self) -> SocketConnector {
        SocketConnector::new(self.vici_address(), self.vici_timeout())
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            prefix: self.collector.prefix.clone(),
            certificates: self.collector.certificates,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field,
        reason: reason.into(),
    }
}

/// Empty is allowed; otherwise it must start a valid Prometheus metric name.
fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        None => true,
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == ':')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
    }
}
