// ── Daemon listings ──
//
// One function per listing command. The request half talks to a `Client`;
// the record half is a pure function over the returned messages so it can
// be tested without a session.

use ipsec_vici::message::{ERRMSG_KEY, SUCCESS_KEY};
use ipsec_vici::{Client, Element, Message};
use tracing::{debug, warn};

use crate::decode::{Decode, Fields, decode_section};
use crate::error::CoreError;
use crate::model::{CertificateRecord, Tunnel, X509};

pub const LIST_SAS: &str = "list-sas";
pub const LIST_SA_EVENT: &str = "list-sa";
pub const LIST_CERTS: &str = "list-certs";
pub const LIST_CERT_EVENT: &str = "list-cert";

// ── Tunnels ─────────────────────────────────────────────────────────

/// List every IKE SA the daemon knows about.
pub async fn list_tunnels<C: Client>(client: &mut C) -> Result<Vec<Tunnel>, CoreError> {
    let messages = client
        .streamed_command_request(LIST_SAS, LIST_SA_EVENT, None)
        .await
        .map_err(|e| listing_failed(LIST_SAS, &e))?;
    tunnels_from_messages(&messages)
}

/// Decode `list-sa` records. A flagged record fails the whole listing; a
/// malformed tunnel is skipped on its own.
pub fn tunnels_from_messages(messages: &[Message]) -> Result<Vec<Tunnel>, CoreError> {
    let mut tunnels = Vec::new();
    for message in messages {
        check_record(LIST_SAS, message)?;
        for (name, element) in message.iter() {
            if is_status_key(name, element) {
                continue;
            }
            match decode_section::<Tunnel>(name, element) {
                Ok(tunnel) => tunnels.push(tunnel),
                Err(e) => warn!(tunnel = name, error = %e, "skipping malformed tunnel record"),
            }
        }
    }
    Ok(tunnels)
}

// ── Certificates ────────────────────────────────────────────────────

/// List X.509 certificates loaded into the daemon.
pub async fn list_certificates<C: Client>(
    client: &mut C,
) -> Result<Vec<CertificateRecord>, CoreError> {
    let filter = Message::new().with("type", X509);
    let messages = client
        .streamed_command_request(LIST_CERTS, LIST_CERT_EVENT, Some(&filter))
        .await
        .map_err(|e| listing_failed(LIST_CERTS, &e))?;
    certificates_from_messages(&messages)
}

/// Decode `list-cert` records, keeping only X.509 certificates. Each event
/// carries one certificate at the top level; the trailing empty response
/// yields nothing.
pub fn certificates_from_messages(
    messages: &[Message],
) -> Result<Vec<CertificateRecord>, CoreError> {
    let mut records = Vec::new();
    for message in messages {
        check_record(LIST_CERTS, message)?;
        if message.get("type").is_none() {
            continue;
        }

        let record = match CertificateRecord::decode("", &Fields::new(message)) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed certificate record");
                continue;
            }
        };
        if !record.is_x509() {
            debug!(cert_type = %record.cert_type, "skipping non-X509 certificate");
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

// ── Helpers ─────────────────────────────────────────────────────────

fn check_record(command: &'static str, message: &Message) -> Result<(), CoreError> {
    match message.err() {
        Some(reason) => {
            warn!(command, %reason, "daemon reported a failed record");
            Err(CoreError::Listing { command, reason })
        }
        None => Ok(()),
    }
}

fn listing_failed(command: &'static str, error: &ipsec_vici::Error) -> CoreError {
    CoreError::Listing {
        command,
        reason: error.to_string(),
    }
}

/// Command responses may carry a scalar `success`/`errmsg` pair next to the
/// listed sections.
fn is_status_key(name: &str, element: &Element) -> bool {
    (name == SUCCESS_KEY || name == ERRMSG_KEY) && matches!(element, Element::Scalar(_))
}
