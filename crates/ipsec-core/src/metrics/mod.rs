// ── Metric samples ──
//
// The projector turns domain records into plain `Sample`s. Nothing here
// touches a registry; `exposition` renders samples on demand.

pub mod catalog;
mod project;

pub use catalog::Desc;
pub use project::Projector;

/// One gauge observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Full metric name, prefix included.
    pub name: String,
    pub help: &'static str,
    /// Label pairs in catalog order.
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Sample {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(label, _)| *label == name)
            .map(|(_, value)| value.as_str())
    }
}

// ── Gauge conversions ───────────────────────────────────────────────
//
// Gauges are f64. Counters above 2^53 lose precision, as they do in every
// Prometheus client.

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub(crate) fn from_count(n: usize) -> f64 {
    n as f64
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub(crate) fn from_u64(n: u64) -> f64 {
    n as f64
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub(crate) fn from_i64(n: i64) -> f64 {
    n as f64
}

pub(crate) fn from_flag(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}
