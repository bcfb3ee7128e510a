// ── Scrape orchestration ──
//
// One scrape = tunnels, then certificates. Each category opens its own
// session and releases it before the next one starts. A failing category
// degrades to its zero count; it never fails the scrape.

use ipsec_vici::{Client, Connector};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CollectorConfig;
use crate::error::CoreError;
use crate::exposition;
use crate::listing;
use crate::metrics::{Projector, Sample};
use crate::model::{Certificate, CertificateRecord, Tunnel};

/// Stateless scrape driver. Holds only configuration, so one instance can be
/// shared behind an `Arc` and scraped concurrently.
#[derive(Debug)]
pub struct Collector<K, C = SystemClock> {
    connector: K,
    clock: C,
    config: CollectorConfig,
    projector: Projector,
}

impl<K: Connector> Collector<K> {
    pub fn new(connector: K, config: CollectorConfig) -> Self {
        Self::with_clock(connector, config, SystemClock)
    }
}

impl<K: Connector, C: Clock> Collector<K, C> {
    pub fn with_clock(connector: K, config: CollectorConfig, clock: C) -> Self {
        let projector = Projector::new(config.prefix.clone());
        Self {
            connector,
            clock,
            config,
            projector,
        }
    }

    // ── Scrape ──────────────────────────────────────────────────────

    /// Run one full scrape and return every sample it produced.
    pub async fn scrape(&self) -> Vec<Sample> {
        let now = self.clock.now();
        let mut samples = Vec::new();

        match self.fetch_tunnels().await {
            Ok(tunnels) => {
                debug!(count = tunnels.len(), "tunnels listed");
                samples.push(self.projector.tunnel_count(tunnels.len()));
                samples.extend(self.projector.tunnels(&tunnels));
            }
            Err(e) => {
                warn!(error = %e, "tunnel collection failed");
                samples.push(self.projector.tunnel_count(0));
            }
        }

        if !self.config.certificates {
            return samples;
        }

        match self.fetch_certificates().await {
            Ok(records) => {
                debug!(count = records.len(), "certificates listed");
                let certificates = parse_certificates(&records);
                samples.push(self.projector.certificate_count(records.len()));
                samples.extend(self.projector.certificates(&certificates, now));
            }
            Err(e) => {
                warn!(error = %e, "certificate collection failed");
                samples.push(self.projector.certificate_count(0));
            }
        }

        samples
    }

    /// Scrape and render in the Prometheus text format.
    pub async fn gather(&self) -> Result<String, CoreError> {
        let samples = self.scrape().await;
        exposition::encode(&samples)
    }

    /// Health check: open a session and release it, nothing else.
    pub async fn check(&self) -> Result<(), CoreError> {
        let client = self.connect().await?;
        release(client).await;
        Ok(())
    }

    // ── Fetch steps ─────────────────────────────────────────────────

    async fn connect(&self) -> Result<K::Client, CoreError> {
        self.connector.connect().await.map_err(CoreError::Connection)
    }

    async fn fetch_tunnels(&self) -> Result<Vec<Tunnel>, CoreError> {
        let mut client = self.connect().await?;
        let result = listing::list_tunnels(&mut client).await;
        release(client).await;
        result
    }

    async fn fetch_certificates(&self) -> Result<Vec<CertificateRecord>, CoreError> {
        let mut client = self.connect().await?;
        let result = listing::list_certificates(&mut client).await;
        release(client).await;
        result
    }
}

async fn release<T: Client>(client: T) {
    if let Err(e) = client.close().await {
        warn!(error = %e, "failed to close VICI session (non-fatal)");
    }
}

fn parse_certificates(records: &[CertificateRecord]) -> Vec<Certificate> {
    records
        .iter()
        .filter_map(|record| match record.parse() {
            Ok(cert) => Some(cert),
            Err(e) => {
                warn!(error = %e, flag = %record.flag, "skipping unparsable certificate");
                None
            }
        })
        .collect()
}
