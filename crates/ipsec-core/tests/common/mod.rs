// Shared fakes for collector tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use ipsec_vici::{Client, Connector, Error, Message};

/// What the fake daemon answers for one command.
#[derive(Clone)]
pub enum Reply {
    Records(Vec<Message>),
    Fail(String),
}

#[derive(Default)]
struct State {
    /// Per-connect outcome, consumed front to back; empty means accept.
    refusals: VecDeque<bool>,
    replies: HashMap<String, Reply>,
    connects: usize,
    closes: usize,
    requests: Vec<(String, String, Option<Message>)>,
}

/// In-memory connector whose sessions share one scripted state.
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<Mutex<State>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, command: &str, reply: Reply) -> Self {
        self.state
            .lock()
            .unwrap()
            .replies
            .insert(command.to_owned(), reply);
        self
    }

    /// Script connect outcomes in order: `true` refuses that attempt.
    pub fn refuse(self, pattern: &[bool]) -> Self {
        self.state.lock().unwrap().refusals.extend(pattern);
        self
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn requests(&self) -> Vec<(String, String, Option<Message>)> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Connector for FakeConnector {
    type Client = FakeClient;

    async fn connect(&self) -> Result<FakeClient, Error> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if state.refusals.pop_front().unwrap_or(false) {
            return Err(Error::Connect {
                address: "tcp://fake:4502".into(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            });
        }
        Ok(FakeClient {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeClient {
    state: Arc<Mutex<State>>,
}

impl Client for FakeClient {
    async fn streamed_command_request(
        &mut self,
        command: &str,
        event: &str,
        message: Option<&Message>,
    ) -> Result<Vec<Message>, Error> {
        let mut state = self.state.lock().unwrap();
        state
            .requests
            .push((command.to_owned(), event.to_owned(), message.cloned()));
        match state.replies.get(command) {
            Some(Reply::Records(records)) => Ok(records.clone()),
            Some(Reply::Fail(reason)) => Err(Error::Protocol(reason.clone())),
            None => Err(Error::UnknownCommand(command.to_owned())),
        }
    }

    async fn close(self) -> Result<(), Error> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

pub fn tunnel(state: &str, children: Message) -> Message {
    Message::new()
        .with("uniqueid", "1")
        .with("version", "2")
        .with("state", state)
        .with("encr-alg", "AES_CBC")
        .with("encr-keysize", "256")
        .with("child-sas", children)
}

pub fn child(name: &str, state: &str) -> Message {
    Message::new()
        .with("name", name)
        .with("uniqueid", "10")
        .with("state", state)
        .with("bytes-in", "4096")
        .with("local-ts", vec!["10.0.0.0/24"])
        .with("remote-ts", vec!["10.1.0.0/24", "10.2.0.0/24"])
}

pub fn certificate(pem: &str) -> Message {
    Message::new()
        .with("type", "X509")
        .with("flag", "NONE")
        .with("data", pem.as_bytes().to_vec())
}

pub const VALID_PEM: &str = include_str!("../testdata/cert-valid.pem");
pub const EXPIRED_PEM: &str = include_str!("../testdata/cert-expired.pem");
pub const MULTI_RDN_PEM: &str = include_str!("../testdata/cert-multi-rdn.pem");
