//! Clap derive structures for the `ipsec-exporter` binary.
//!
//! Every flag is optional: an absent flag leaves the value from the lower
//! configuration layers untouched.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use figment::{Figment, providers::Serialized};

use ipsec_config::{LogFormat, Network};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// Export strongSwan tunnel and certificate state as Prometheus metrics
#[derive(Debug, Parser)]
#[command(
    name = "ipsec-exporter",
    version,
    about = "Prometheus exporter for strongSwan/charon over the VICI protocol",
    long_about = "Serves /metrics and /healthcheck over HTTP.\n\n\
        Configuration is layered: built-in defaults, then the TOML file given\n\
        with --config, then IPSEC_EXPORTER_* environment variables (use '__'\n\
        between section and key, e.g. IPSEC_EXPORTER_VICI__HOST), then flags."
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', env = "IPSEC_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub dump_config: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// Log filter directive (RUST_LOG takes precedence)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormatArg>,

    // ── Server ───────────────────────────────────────────────────────

    /// HTTP port for /metrics and /healthcheck
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    // ── VICI ─────────────────────────────────────────────────────────

    /// Transport to the daemon
    #[arg(long, value_name = "NETWORK")]
    pub vici_network: Option<NetworkArg>,

    /// Daemon host (tcp)
    #[arg(long, value_name = "HOST")]
    pub vici_host: Option<String>,

    /// Daemon port (tcp)
    #[arg(long, value_name = "PORT")]
    pub vici_port: Option<u16>,

    /// Daemon socket path (unix)
    #[arg(long, value_name = "PATH")]
    pub vici_socket: Option<PathBuf>,

    /// Per-operation socket timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub vici_timeout: Option<u64>,

    // ── Collector ────────────────────────────────────────────────────

    /// Metric name prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Do not export certificate metrics
    #[arg(long)]
    pub no_certificates: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NetworkArg {
    Tcp,
    Unix,
}

impl From<NetworkArg> for Network {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Tcp => Self::Tcp,
            NetworkArg::Unix => Self::Unix,
        }
    }
}

// ── Overrides ────────────────────────────────────────────────────────

impl Cli {
    /// Merge the flags that were given on top of `figment`.
    pub fn apply(&self, mut figment: Figment) -> Figment {
        if let Some(level) = &self.log_level {
            figment = figment.merge(Serialized::default("logging.level", level));
        }
        if let Some(format) = self.log_format {
            figment = figment.merge(Serialized::default("logging.format", LogFormat::from(format)));
        }
        if let Some(port) = self.port {
            figment = figment.merge(Serialized::default("server.port", port));
        }
        if let Some(network) = self.vici_network {
            figment = figment.merge(Serialized::default("vici.network", Network::from(network)));
        }
        if let Some(host) = &self.vici_host {
            figment = figment.merge(Serialized::default("vici.host", host));
        }
        if let Some(port) = self.vici_port {
            figment = figment.merge(Serialized::default("vici.port", port));
        }
        if let Some(socket) = &self.vici_socket {
            figment = figment.merge(Serialized::default("vici.socket", socket));
        }
        if let Some(secs) = self.vici_timeout {
            figment = figment.merge(Serialized::default("vici.timeout_secs", secs));
        }
        if let Some(prefix) = &self.prefix {
            figment = figment.merge(Serialized::default("collector.prefix", prefix));
        }
        if self.no_certificates {
            figment = figment.merge(Serialized::default("collector.certificates", false));
        }
        figment
    }
}
