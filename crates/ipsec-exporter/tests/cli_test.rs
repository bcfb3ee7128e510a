//! Integration tests for the `ipsec-exporter` binary.
//!
//! Only paths that exit on their own are exercised here: argument parsing,
//! configuration errors and `--dump-config`. None of them open a socket.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// The binary with an empty environment, so no `IPSEC_EXPORTER_*` or
/// `RUST_LOG` from the caller leaks in.
fn exporter_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ipsec-exporter");
    cmd.env_clear();
    cmd
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    exporter_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("--config")
            .and(predicate::str::contains("--vici-network"))
            .and(predicate::str::contains("--dump-config")),
    );
}

#[test]
fn test_version_flag() {
    exporter_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ipsec-exporter"));
}

#[test]
fn test_unknown_network_flag_is_a_usage_error() {
    exporter_cmd()
        .args(["--vici-network", "udp"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("udp"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_dump_config_prints_defaults() {
    exporter_cmd()
        .arg("--dump-config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[vici]")
                .and(predicate::str::contains("port = 4502"))
                .and(predicate::str::contains("prefix = \"ipsec_\"")),
        );
}

#[test]
fn test_layers_are_merged_in_order() {
    let file = config_file("[server]\nport = 9100\n\n[vici]\nhost = \"from-file\"\n");

    exporter_cmd()
        .arg("--config")
        .arg(file.path())
        .env("IPSEC_EXPORTER_VICI__HOST", "from-env")
        .args(["--prefix", "vpn_", "--dump-config"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("port = 9100")
                .and(predicate::str::contains("host = \"from-env\""))
                .and(predicate::str::contains("prefix = \"vpn_\"")),
        );
}

#[test]
fn test_missing_config_file_fails() {
    exporter_cmd()
        .args(["--config", "/nonexistent/ipsec-exporter.toml", "--dump-config"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_unknown_network_in_environment_fails() {
    exporter_cmd()
        .env("IPSEC_EXPORTER_VICI__NETWORK", "udp")
        .arg("--dump-config")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_invalid_prefix_fails() {
    let file = config_file("[collector]\nprefix = \"ipsec-\"\n");

    exporter_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("--dump-config")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("collector.prefix"));
}
