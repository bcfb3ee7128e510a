use chrono::{DateTime, SecondsFormat, Utc};

use super::catalog::{self, Desc};
use super::{Sample, from_count, from_flag, from_i64, from_u64};
use crate::model::{Certificate, ChildAssociation, Tunnel, format_serial_number};

/// Maps domain records to samples under a fixed name prefix.
///
/// Output order follows input order and catalog order, so projecting the
/// same snapshot twice gives identical samples.
#[derive(Debug, Clone)]
pub struct Projector {
    prefix: String,
}

impl Projector {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn sample(&self, desc: &Desc, values: Vec<String>, value: f64) -> Sample {
        debug_assert_eq!(desc.labels.len(), values.len(), "{}", desc.suffix);
        Sample {
            name: format!("{}{}", self.prefix, desc.suffix),
            help: desc.help,
            labels: desc.labels.iter().copied().zip(values).collect(),
            value,
        }
    }

    // ── Tunnels ─────────────────────────────────────────────────────

    pub fn tunnel_count(&self, count: usize) -> Sample {
        self.sample(&catalog::TUNNEL_COUNT, Vec::new(), from_count(count))
    }

    /// Per-tunnel and per-child samples. The count is separate.
    pub fn tunnels(&self, tunnels: &[Tunnel]) -> Vec<Sample> {
        let mut samples = Vec::new();
        for tunnel in tunnels {
            self.tunnel(tunnel, &mut samples);
            for child in tunnel.children.values() {
                self.child(tunnel, child, &mut samples);
            }
        }
        samples
    }

    fn tunnel(&self, t: &Tunnel, out: &mut Vec<Sample>) {
        let ids = || vec![t.name.clone(), t.unique_id.clone()];
        let with_algorithm = |algorithm: &str| {
            vec![
                t.name.clone(),
                t.unique_id.clone(),
                algorithm.to_owned(),
                t.proposal.dh_group.clone(),
            ]
        };

        out.extend([
            self.sample(&catalog::TUNNEL_VERSION, ids(), f64::from(t.version)),
            self.sample(&catalog::TUNNEL_STATUS, ids(), t.status().value()),
            self.sample(&catalog::TUNNEL_INITIATOR, ids(), from_flag(t.initiator)),
            self.sample(&catalog::TUNNEL_NAT_LOCAL, ids(), from_flag(t.nat_local)),
            self.sample(&catalog::TUNNEL_NAT_REMOTE, ids(), from_flag(t.nat_remote)),
            self.sample(&catalog::TUNNEL_NAT_FAKE, ids(), from_flag(t.nat_fake)),
            self.sample(&catalog::TUNNEL_NAT_ANY, ids(), from_flag(t.nat_any)),
            self.sample(
                &catalog::TUNNEL_ENCRYPTION_KEY_SIZE,
                with_algorithm(&t.proposal.encryption_algorithm),
                f64::from(t.proposal.encryption_key_size),
            ),
            self.sample(
                &catalog::TUNNEL_INTEGRITY_KEY_SIZE,
                with_algorithm(&t.proposal.integrity_algorithm),
                f64::from(t.proposal.integrity_key_size),
            ),
            self.sample(
                &catalog::TUNNEL_ESTABLISHED_SECONDS,
                ids(),
                from_i64(t.established_seconds),
            ),
            self.sample(&catalog::TUNNEL_REKEY_SECONDS, ids(), from_i64(t.rekey_seconds)),
            self.sample(&catalog::TUNNEL_REAUTH_SECONDS, ids(), from_i64(t.reauth_seconds)),
            self.sample(
                &catalog::TUNNEL_CHILDREN_SIZE,
                ids(),
                from_count(t.children.len()),
            ),
        ]);
    }

    fn child(&self, t: &Tunnel, c: &ChildAssociation, out: &mut Vec<Sample>) {
        let local_ts = c.local_selectors.join(";");
        let remote_ts = c.remote_selectors.join(";");

        let ids = || {
            vec![
                t.name.clone(),
                t.unique_id.clone(),
                c.name.clone(),
                c.unique_id.clone(),
            ]
        };
        let with_selectors = || {
            let mut labels = ids();
            labels.extend([local_ts.clone(), remote_ts.clone()]);
            labels
        };
        let with_algorithm = |algorithm: &str| {
            let mut labels = ids();
            labels.extend([algorithm.to_owned(), c.proposal.dh_group.clone()]);
            labels
        };

        out.extend([
            self.sample(&catalog::CHILD_STATUS, with_selectors(), c.status().value()),
            self.sample(&catalog::CHILD_ENCAP, ids(), from_flag(c.encapsulated)),
            self.sample(
                &catalog::CHILD_ENCRYPTION_KEY_SIZE,
                with_algorithm(&c.proposal.encryption_algorithm),
                f64::from(c.proposal.encryption_key_size),
            ),
            self.sample(
                &catalog::CHILD_INTEGRITY_KEY_SIZE,
                with_algorithm(&c.proposal.integrity_algorithm),
                f64::from(c.proposal.integrity_key_size),
            ),
            self.sample(
                &catalog::CHILD_INBOUND_BYTES,
                with_selectors(),
                from_u64(c.bytes_in),
            ),
            self.sample(
                &catalog::CHILD_INBOUND_PACKETS,
                with_selectors(),
                from_u64(c.packets_in),
            ),
            self.sample(
                &catalog::CHILD_LAST_INBOUND_SECONDS,
                with_selectors(),
                from_i64(c.last_in_seconds),
            ),
            self.sample(
                &catalog::CHILD_OUTBOUND_BYTES,
                with_selectors(),
                from_u64(c.bytes_out),
            ),
            self.sample(
                &catalog::CHILD_OUTBOUND_PACKETS,
                with_selectors(),
                from_u64(c.packets_out),
            ),
            self.sample(
                &catalog::CHILD_LAST_OUTBOUND_SECONDS,
                with_selectors(),
                from_i64(c.last_out_seconds),
            ),
            self.sample(
                &catalog::CHILD_ESTABLISHED_SECONDS,
                ids(),
                from_i64(c.installed_seconds),
            ),
            self.sample(&catalog::CHILD_REKEY_SECONDS, ids(), from_i64(c.rekey_seconds)),
            self.sample(
                &catalog::CHILD_LIFETIME_SECONDS,
                ids(),
                from_i64(c.lifetime_seconds),
            ),
        ]);
    }

    // ── Certificates ────────────────────────────────────────────────

    pub fn certificate_count(&self, count: usize) -> Sample {
        self.sample(&catalog::CERT_COUNT, Vec::new(), from_count(count))
    }

    /// Validity and expiry per certificate, both measured against `now`.
    pub fn certificates(&self, certificates: &[Certificate], now: DateTime<Utc>) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(certificates.len() * 2);
        for cert in certificates {
            let labels = vec![
                format_serial_number(cert.serial.as_ref()),
                cert.subject.clone(),
                cert.alternate_names.to_string(),
                rfc3339(cert.not_before),
                rfc3339(cert.not_after),
            ];
            samples.push(self.sample(
                &catalog::CERT_VALID,
                labels.clone(),
                from_flag(cert.is_valid_at(now)),
            ));
            samples.push(self.sample(
                &catalog::CERT_EXPIRE_SECONDS,
                labels,
                cert.seconds_until_expiry(now),
            ));
        }
        samples
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
