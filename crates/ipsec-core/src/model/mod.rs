// ── Domain model ──
//
// Records are rebuilt from scratch on every scrape and never cached.

pub mod certificate;
pub mod tunnel;

pub use certificate::{
    AlternateNames, Certificate, CertificateRecord, SerialNumber, X509, format_serial_number,
};
pub use tunnel::{ChildAssociation, ConnectionStatus, Endpoint, Proposal, Tunnel};
