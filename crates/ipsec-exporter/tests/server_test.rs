//! HTTP-level tests: a real listener on an ephemeral port in front of a
//! collector whose daemon is an in-memory fake.
#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use ipsec_core::{Collector, CollectorConfig};
use ipsec_exporter::server;
use ipsec_vici::{Client, Connector, Error, Message};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

// ── Fake daemon ─────────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct FakeDaemon {
    up: bool,
}

impl Connector for FakeDaemon {
    type Client = FakeSession;

    async fn connect(&self) -> Result<FakeSession, Error> {
        if self.up {
            Ok(FakeSession)
        } else {
            Err(Error::Connect {
                address: "unix:///var/run/charon.vici".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }
}

struct FakeSession;

impl Client for FakeSession {
    async fn streamed_command_request(
        &mut self,
        command: &str,
        _event: &str,
        _message: Option<&Message>,
    ) -> Result<Vec<Message>, Error> {
        match command {
            "list-sas" => Ok(vec![Message::new().with(
                "gw-east",
                Message::new()
                    .with("uniqueid", "7")
                    .with("version", "2")
                    .with("state", "ESTABLISHED"),
            )]),
            _ => Ok(Vec::new()),
        }
    }

    async fn close(self) -> Result<(), Error> {
        Ok(())
    }
}

// ── Harness ─────────────────────────────────────────────────────────

struct Running {
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<Result<(), ipsec_exporter::ExporterError>>,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap().unwrap();
    }
}

async fn start(daemon: FakeDaemon) -> Running {
    let collector = Arc::new(Collector::new(daemon, CollectorConfig::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server::serve(
        listener,
        server::router(collector),
        shutdown.clone(),
    ));
    Running {
        addr,
        shutdown,
        handle,
    }
}

// ── /metrics ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_metrics_endpoint() {
    let running = start(FakeDaemon { up: true }).await;

    let response = reqwest::get(running.url("/metrics")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let content_type = response.headers()[reqwest::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.starts_with("text/plain"), "got {content_type}");

    let body = response.text().await.unwrap();
    assert!(body.contains("ipsec_tunnel_count 1"));
    assert!(body.lines().any(|line| {
        line.starts_with("ipsec_tunnel_status{")
            && line.contains(r#"tunnel_name="gw-east""#)
            && line.ends_with(" 1")
    }));
    assert!(body.contains("ipsec_cert_count 0"));

    running.stop().await;
}

#[tokio::test]
async fn test_metrics_when_daemon_is_down() {
    let running = start(FakeDaemon { up: false }).await;

    let response = reqwest::get(running.url("/metrics")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("ipsec_tunnel_count 0"));
    assert!(!body.contains("ipsec_tunnel_status"));

    running.stop().await;
}

// ── /healthcheck ────────────────────────────────────────────────────

#[tokio::test]
async fn test_healthcheck_ok() {
    let running = start(FakeDaemon { up: true }).await;

    let response = reqwest::get(running.url("/healthcheck")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "status": "OK" }));

    running.stop().await;
}

#[tokio::test]
async fn test_healthcheck_unavailable() {
    let running = start(FakeDaemon { up: false }).await;

    let response = reqwest::get(running.url("/healthcheck")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "Service Unavailable");
    let reason = body["errors"]["vici"].as_str().unwrap();
    assert!(reason.contains("charon.vici"), "got {reason}");

    running.stop().await;
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let running = start(FakeDaemon { up: true }).await;

    let response = reqwest::get(running.url("/")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    running.stop().await;
}
