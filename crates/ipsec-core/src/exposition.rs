// ── Prometheus text exposition ──
//
// Samples are loaded into a throwaway registry per scrape so no state leaks
// between scrapes; a tunnel that disappears also disappears from the output.

use indexmap::IndexMap;
use indexmap::map::Entry;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::error::CoreError;
use crate::metrics::Sample;

/// Content type of the rendered output.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Render samples in the Prometheus text format.
pub fn encode(samples: &[Sample]) -> Result<String, CoreError> {
    let registry = Registry::new();
    let mut families: IndexMap<&str, GaugeVec> = IndexMap::new();

    for sample in samples {
        let gauge = match families.entry(sample.name.as_str()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let names: Vec<&str> = sample.labels.iter().map(|(name, _)| *name).collect();
                let gauge = GaugeVec::new(Opts::new(sample.name.as_str(), sample.help), &names)?;
                registry.register(Box::new(gauge.clone()))?;
                entry.insert(gauge)
            }
        };
        let values: Vec<&str> = sample.labels.iter().map(|(_, value)| value.as_str()).collect();
        gauge.get_metric_with_label_values(&values)?.set(sample.value);
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| CoreError::Exposition(prometheus::Error::Msg(e.to_string())))
}
