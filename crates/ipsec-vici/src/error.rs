use thiserror::Error;

/// Top-level error type for the `ipsec-vici` crate.
///
/// Covers every failure mode of a VICI session: connecting, socket I/O,
/// timeouts, and protocol violations by either side. `ipsec-core` maps
/// these into connection or listing failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The daemon socket could not be reached.
    #[error("Cannot connect to VICI socket at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Read or write failure on an established session.
    #[error("VICI I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single socket operation exceeded the session timeout.
    #[error("VICI operation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The configured network type is not supported on this platform.
    #[error("Unsupported VICI network: {0}")]
    UnsupportedNetwork(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The peer sent something that is not valid VICI.
    #[error("VICI protocol error: {0}")]
    Protocol(String),

    /// A packet announced a length above the protocol limit.
    #[error("VICI packet of {size} bytes exceeds the {max} byte limit")]
    PacketTooLarge { size: usize, max: usize },

    /// A message could not be encoded (key or value too long).
    #[error("Cannot encode VICI message: {0}")]
    Encode(String),

    /// The daemon does not know the requested command.
    #[error("Unknown VICI command: {0}")]
    UnknownCommand(String),

    /// The daemon refused to register the requested event.
    #[error("Unknown VICI event: {0}")]
    UnknownEvent(String),
}
