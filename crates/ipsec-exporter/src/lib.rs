//! Prometheus exporter for strongSwan over VICI.
//!
//! Wires the layers together: [`cli`] and `ipsec-config` resolve the
//! configuration, [`logging`] installs the subscriber, and [`server`] exposes
//! an [`ipsec_core::Collector`] over HTTP.

pub mod cli;
pub mod error;
pub mod logging;
pub mod server;

use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ipsec_config::Config;
use ipsec_core::Collector;

pub use cli::Cli;
pub use error::ExporterError;

/// Resolve the configuration layers, with flags on top.
pub fn load_config(cli: &Cli) -> Result<Config, ExporterError> {
    let figment = ipsec_config::figment(cli.config.as_deref())?;
    Ok(Config::from_figment(&cli.apply(figment))?)
}

/// Run the exporter until a shutdown signal arrives.
pub async fn run(cli: Cli) -> Result<(), ExporterError> {
    let config = load_config(&cli)?;

    if cli.dump_config {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(config.to_toml()?.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    logging::init_tracing(&config.logging)?;
    info!(
        vici = %config.vici_address(),
        port = config.server.port,
        prefix = %config.collector.prefix,
        certificates = config.collector.certificates,
        "starting ipsec-exporter"
    );

    let collector = Arc::new(Collector::new(config.connector(), config.collector_config()));

    let port = config.server.port;
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .map_err(|source| ExporterError::Bind { port, source })?;

    let shutdown = CancellationToken::new();
    tokio::spawn(server::shutdown_signal(shutdown.clone()));

    server::serve(listener, server::router(collector), shutdown).await?;
    info!("stopped");
    Ok(())
}
