// ── Tracing setup ──
//
// `RUST_LOG` wins over `logging.level` when it is set and parses.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ipsec_config::{LogFormat, LoggingConfig};

use crate::error::ExporterError;

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ExporterError> {
    let filter = build_filter(&config.level, std::env::var("RUST_LOG").ok().as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false).with_span_list(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).init(),
    }
    Ok(())
}

fn build_filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter, ExporterError> {
    if let Some(directive) = rust_log.filter(|d| !d.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(level).map_err(|source| ExporterError::LogFilter {
        directive: level.to_owned(),
        source,
    })
}
