//! Startup and runtime errors of the exporter binary, with miette diagnostics.
//!
//! Scrape failures never surface here: the collector degrades them to zero
//! counts. Only things that stop the process do.

use miette::Diagnostic;
use thiserror::Error;

use ipsec_config::ConfigError;

#[derive(Debug, Error, Diagnostic)]
pub enum ExporterError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid configuration")]
    #[diagnostic(
        code(ipsec_exporter::config),
        help(
            "Check the file passed with --config and any IPSEC_EXPORTER_* variables.\n\
             Run with --dump-config to print the effective configuration."
        )
    )]
    Config(#[from] ConfigError),

    #[error("Invalid log filter '{directive}'")]
    #[diagnostic(
        code(ipsec_exporter::log_filter),
        help("Use a tracing filter such as 'info' or 'ipsec_core=debug,warn'.")
    )]
    LogFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    // ── Server ───────────────────────────────────────────────────────

    #[error("Cannot listen on port {port}")]
    #[diagnostic(
        code(ipsec_exporter::bind),
        help("Is another process already using this port? Change it with --port.")
    )]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed")]
    #[diagnostic(code(ipsec_exporter::serve))]
    Serve(#[source] std::io::Error),

    #[error("Cannot render configuration")]
    #[diagnostic(code(ipsec_exporter::io))]
    Io(#[from] std::io::Error),
}
