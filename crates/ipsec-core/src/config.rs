// ── Runtime collector configuration ──
//
// Describes what a scrape collects. Built by the binary from the loaded
// configuration; the core never reads config files itself.

/// Metric name prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "ipsec_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Prepended to every metric name.
    pub prefix: String,
    /// Whether the certificate listing runs at all.
    pub certificates: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            certificates: true,
        }
    }
}
