// ── HTTP server ──
//
// Two routes over one shared collector. Every request runs its own scrape or
// health check; nothing is cached between requests.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ipsec_core::{Clock, Collector, exposition};
use ipsec_vici::Connector;

use crate::error::ExporterError;

/// Upper bound for answering one request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the router for `collector`.
pub fn router<K, C>(collector: Arc<Collector<K, C>>) -> Router
where
    K: Connector + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/metrics", get(metrics::<K, C>))
        .route("/healthcheck", get(healthcheck::<K, C>))
        .with_state(collector)
}

/// Serve `router` on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), ExporterError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "serving /metrics and /healthcheck");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(ExporterError::Serve)
}

/// Cancel `token` on SIGINT or SIGTERM.
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
    token.cancel();
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn metrics<K, C>(State(collector): State<Arc<Collector<K, C>>>) -> Response
where
    K: Connector + 'static,
    C: Clock + 'static,
{
    match tokio::time::timeout(REQUEST_TIMEOUT, collector.gather()).await {
        Ok(Ok(body)) => {
            debug!(bytes = body.len(), "scrape rendered");
            ([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "cannot render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(_) => {
            warn!(timeout_secs = REQUEST_TIMEOUT.as_secs(), "scrape timed out");
            (StatusCode::SERVICE_UNAVAILABLE, "scrape timed out").into_response()
        }
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<HealthErrors>,
}

#[derive(Debug, Serialize)]
struct HealthErrors {
    vici: String,
}

impl Health {
    fn ok() -> Self {
        Self {
            status: "OK",
            errors: None,
        }
    }

    fn unavailable(reason: String) -> Self {
        Self {
            status: "Service Unavailable",
            errors: Some(HealthErrors { vici: reason }),
        }
    }
}

async fn healthcheck<K, C>(State(collector): State<Arc<Collector<K, C>>>) -> Response
where
    K: Connector + 'static,
    C: Clock + 'static,
{
    let reason = match tokio::time::timeout(REQUEST_TIMEOUT, collector.check()).await {
        Ok(Ok(())) => return (StatusCode::OK, Json(Health::ok())).into_response(),
        Ok(Err(e)) => e.to_string(),
        Err(_) => "health check timed out".to_owned(),
    };
    warn!(reason = %reason, "health check failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(Health::unavailable(reason)),
    )
        .into_response()
}
