#![allow(clippy::unwrap_used)]
// Integration tests for `Session` against an in-memory VICI daemon.

use std::time::Duration;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use ipsec_vici::codec::{Packet, PacketType};
use ipsec_vici::{Client, Element, Error, Message, Session};

// ── Helpers ─────────────────────────────────────────────────────────

const TIMEOUT: Duration = Duration::from_secs(5);

/// What the fake daemon knows how to answer.
#[derive(Clone, Default)]
struct Script {
    events: Vec<&'static str>,
    /// command -> (event name, streamed records, final response)
    commands: Vec<(&'static str, &'static str, Vec<Message>, Message)>,
}

async fn read_packet(io: &mut DuplexStream) -> Option<Packet> {
    let mut prefix = [0_u8; 4];
    io.read_exact(&mut prefix).await.ok()?;
    let mut payload = vec![0_u8; u32::from_be_bytes(prefix) as usize];
    io.read_exact(&mut payload).await.ok()?;
    Some(Packet::decode(Bytes::from(payload)).unwrap())
}

async fn send(io: &mut DuplexStream, kind: PacketType, name: Option<&str>, message: Message) {
    let packet = Packet::new(kind, name, message);
    io.write_all(&packet.encode().unwrap()).await.unwrap();
}

/// Spawn the daemon; the handle resolves to every packet it received once
/// the client side closes.
fn daemon(mut io: DuplexStream, script: Script) -> JoinHandle<Vec<(PacketType, Option<String>)>> {
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(packet) = read_packet(&mut io).await {
            seen.push((packet.kind, packet.name.clone()));
            let name = packet.name.as_deref().unwrap_or_default();
            match packet.kind {
                PacketType::EventRegister if script.events.iter().any(|e| *e == name) => {
                    send(&mut io, PacketType::EventConfirm, None, Message::new()).await;
                }
                PacketType::EventRegister => {
                    send(&mut io, PacketType::EventUnknown, None, Message::new()).await;
                }
                PacketType::EventUnregister => {
                    send(&mut io, PacketType::EventConfirm, None, Message::new()).await;
                }
                PacketType::CmdRequest => {
                    match script.commands.iter().find(|(cmd, ..)| *cmd == name) {
                        Some((_, event, records, response)) => {
                            send(&mut io, PacketType::Event, Some("log"), Message::new()).await;
                            for record in records {
                                send(&mut io, PacketType::Event, Some(*event), record.clone())
                                    .await;
                            }
                            send(&mut io, PacketType::CmdResponse, None, response.clone()).await;
                        }
                        None => {
                            send(&mut io, PacketType::CmdUnknown, None, Message::new()).await;
                        }
                    }
                }
                _ => {}
            }
        }
        seen
    })
}

fn sa(name: &str, state: &str) -> Message {
    Message::new().with(
        name,
        Message::new()
            .with("uniqueid", "1")
            .with("state", state)
            .with("child-sas", Message::new().with("net-1", Message::new().with("mode", "TUNNEL"))),
    )
}

// ── Streamed requests ───────────────────────────────────────────────

#[tokio::test]
async fn test_streamed_request_protocol_order() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let script = Script {
        events: vec!["list-sa"],
        commands: vec![(
            "list-sas",
            "list-sa",
            vec![sa("gw-1", "ESTABLISHED"), sa("gw-2", "CONNECTING")],
            Message::new(),
        )],
    };
    let handle = daemon(server_io, script);

    let mut session = Session::new(client_io, TIMEOUT);
    let records = session
        .streamed_command_request("list-sas", "list-sa", None)
        .await
        .unwrap();
    session.close().await.unwrap();

    // two events plus the (empty) final response; the "log" event is dropped
    assert_eq!(records.len(), 3);
    assert_eq!(records[0], sa("gw-1", "ESTABLISHED"));
    assert_eq!(records[1], sa("gw-2", "CONNECTING"));
    assert!(records[2].is_empty());

    let seen = handle.await.unwrap();
    assert_eq!(
        seen,
        vec![
            (PacketType::EventRegister, Some("list-sa".to_owned())),
            (PacketType::CmdRequest, Some("list-sas".to_owned())),
            (PacketType::EventUnregister, Some("list-sa".to_owned())),
        ]
    );
}

#[tokio::test]
async fn test_streamed_request_sends_filter_payload() {
    let (client_io, mut server_io) = tokio::io::duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let _register = read_packet(&mut server_io).await.unwrap();
        send(&mut server_io, PacketType::EventConfirm, None, Message::new()).await;
        let request = read_packet(&mut server_io).await.unwrap();
        send(&mut server_io, PacketType::CmdResponse, None, Message::new()).await;
        let _unregister = read_packet(&mut server_io).await.unwrap();
        send(&mut server_io, PacketType::EventConfirm, None, Message::new()).await;
        request
    });

    let mut session = Session::new(client_io, TIMEOUT);
    let filter = Message::new().with("type", "X509");
    session
        .streamed_command_request("list-certs", "list-cert", Some(&filter))
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert_eq!(request.name.as_deref(), Some("list-certs"));
    assert_eq!(request.message, filter);
}

#[tokio::test]
async fn test_failed_response_is_returned_as_record() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let failure = Message::new().with("success", "no").with("errmsg", "busy");
    let script = Script {
        events: vec!["list-sa"],
        commands: vec![("list-sas", "list-sa", vec![], failure.clone())],
    };
    let _handle = daemon(server_io, script);

    let mut session = Session::new(client_io, TIMEOUT);
    let records = session
        .streamed_command_request("list-sas", "list-sa", None)
        .await
        .unwrap();

    assert_eq!(records, vec![failure]);
    assert_eq!(records[0].err().as_deref(), Some("busy"));
}

// ── Protocol errors ─────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_command() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let script = Script {
        events: vec!["list-sa"],
        commands: vec![],
    };
    let handle = daemon(server_io, script);

    let mut session = Session::new(client_io, TIMEOUT);
    let result = session
        .streamed_command_request("list-everything", "list-sa", None)
        .await;
    assert!(
        matches!(result, Err(Error::UnknownCommand(ref cmd)) if cmd == "list-everything"),
        "expected UnknownCommand, got: {result:?}"
    );
    session.close().await.unwrap();

    // the event is still unregistered afterwards
    let seen = handle.await.unwrap();
    assert_eq!(seen.last().map(|(kind, _)| *kind), Some(PacketType::EventUnregister));
}

#[tokio::test]
async fn test_unknown_event() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let handle = daemon(server_io, Script::default());

    let mut session = Session::new(client_io, TIMEOUT);
    let result = session
        .streamed_command_request("list-sas", "list-sa", None)
        .await;
    assert!(
        matches!(result, Err(Error::UnknownEvent(ref event)) if event == "list-sa"),
        "expected UnknownEvent, got: {result:?}"
    );
    session.close().await.unwrap();

    // no command is sent after a refused registration
    let seen = handle.await.unwrap();
    assert_eq!(seen, vec![(PacketType::EventRegister, Some("list-sa".to_owned()))]);
}

#[tokio::test]
async fn test_oversized_packet_rejected() {
    let (client_io, mut server_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        let _register = read_packet(&mut server_io).await;
        server_io.write_all(&(1_u32 << 20).to_be_bytes()).await.unwrap();
        // hold the stream open until the client gives up
        let _ = read_packet(&mut server_io).await;
    });

    let mut session = Session::new(client_io, TIMEOUT);
    let result = session
        .streamed_command_request("list-sas", "list-sa", None)
        .await;
    assert!(
        matches!(result, Err(Error::PacketTooLarge { size: 1_048_576, .. })),
        "expected PacketTooLarge, got: {result:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_silent_daemon_times_out() {
    let (client_io, _server_io) = tokio::io::duplex(64 * 1024);

    let mut session = Session::new(client_io, Duration::from_secs(3));
    let result = session
        .streamed_command_request("list-sas", "list-sa", None)
        .await;
    assert!(
        matches!(result, Err(Error::Timeout { timeout_secs: 3 })),
        "expected Timeout, got: {result:?}"
    );
}

// ── Codec over the wire ─────────────────────────────────────────────

#[tokio::test]
async fn test_nested_message_survives_the_wire() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let nested = Message::new()
        .with(
            "gw-1",
            Message::new()
                .with("local-ts", vec!["10.0.0.0/24", "10.0.1.0/24"])
                .with("child-sas", Message::new().with("b", Message::new()).with("a", Message::new())),
        )
        .with("cert", Element::from(vec![0x30_u8, 0x82, 0x00, 0xff]));
    let script = Script {
        events: vec!["list-sa"],
        commands: vec![("list-sas", "list-sa", vec![nested.clone()], Message::new())],
    };
    let _handle = daemon(server_io, script);

    let mut session = Session::new(client_io, TIMEOUT);
    let records = session
        .streamed_command_request("list-sas", "list-sa", None)
        .await
        .unwrap();

    let received = &records[0];
    assert_eq!(received, &nested);
    let children = received
        .get("gw-1")
        .and_then(Element::as_section)
        .and_then(|sa| sa.get("child-sas"))
        .and_then(Element::as_section)
        .unwrap();
    assert_eq!(children.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(
        received.get("cert").and_then(Element::as_bytes),
        Some(&[0x30_u8, 0x82, 0x00, 0xff][..])
    );
}
