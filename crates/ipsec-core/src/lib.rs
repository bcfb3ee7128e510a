//! Decode-and-project engine between `ipsec-vici` and the exporter binary.
//!
//! This crate turns raw VICI listings into Prometheus samples:
//!
//! - **[`decode`]**: table-driven coercion of untyped VICI trees into typed
//!   records (`yes` flags, zero-defaulted integers, nested collections).
//!
//! - **Domain model** ([`model`]): [`Tunnel`], [`ChildAssociation`] and
//!   [`Certificate`], rebuilt on every scrape.
//!
//! - **[`Projector`]**: pure mapping from records to named, labeled gauge
//!   [`Sample`]s in a stable order. [`exposition`] renders them.
//!
//! - **[`Collector`]**: drives one scrape over any [`ipsec_vici::Connector`],
//!   isolating failures per category so a broken certificate listing never
//!   hides tunnel metrics.

pub mod clock;
pub mod collector;
pub mod config;
pub mod decode;
pub mod error;
pub mod exposition;
pub mod listing;
pub mod metrics;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, FixedClock, SystemClock};
pub use collector::Collector;
pub use config::CollectorConfig;
pub use error::CoreError;
pub use metrics::{Projector, Sample};
pub use model::{
    AlternateNames, Certificate, CertificateRecord, ChildAssociation, ConnectionStatus, Endpoint,
    Proposal, SerialNumber, Tunnel, format_serial_number,
};
