// ── Core error types ──
//
// Every variant here is recoverable at the scrape level: the collector logs
// it and falls back to a zero count or a skipped record. None of them ever
// fail a scrape on their own.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// No session could be acquired from the daemon.
    #[error("Cannot open VICI session: {0}")]
    Connection(#[source] ipsec_vici::Error),

    // ── Listing errors ───────────────────────────────────────────────
    /// The daemon flagged a record as failed, or the request broke off.
    #[error("Listing '{command}' failed: {reason}")]
    Listing {
        command: &'static str,
        reason: String,
    },

    // ── Record errors ────────────────────────────────────────────────
    /// A field had a different shape than its declared type.
    #[error("Unexpected shape at '{path}': expected {expected}, found {found}")]
    Decode {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Certificate bytes were not valid X.509.
    #[error("Cannot parse certificate: {0}")]
    Parse(String),

    // ── Exposition errors ────────────────────────────────────────────
    #[error("Cannot encode metrics: {0}")]
    Exposition(#[from] prometheus::Error),
}

impl CoreError {
    /// Prefix a decode error's path with the key of the enclosing node.
    #[must_use]
    pub fn within(self, key: &str) -> Self {
        match self {
            Self::Decode {
                path,
                expected,
                found,
            } => Self::Decode {
                path: format!("{key}.{path}"),
                expected,
                found,
            },
            other => other,
        }
    }
}
