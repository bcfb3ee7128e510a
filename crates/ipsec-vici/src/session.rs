// ── VICI session ──
//
// A session owns one socket to the daemon and runs requests on it strictly
// one at a time. Every read and write is bounded by the session timeout.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::client::{Client, Connector};
use crate::codec::{MAX_PACKET_SIZE, Packet, PacketType};
use crate::error::Error;
use crate::message::Message;

/// Default per-operation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Any byte stream a session can run over.
pub trait Io: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Io for T {}

// ── Address ─────────────────────────────────────────────────────────

/// Where the daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

// ── Session ─────────────────────────────────────────────────────────

pub struct Session {
    io: Box<dyn Io>,
    timeout: Duration,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap an already-connected stream.
    pub fn new(io: impl Io + 'static, timeout: Duration) -> Self {
        Self {
            io: Box::new(io),
            timeout,
        }
    }

    /// Open a socket to `address`. The connect itself is bounded by `timeout`.
    pub async fn connect(address: &Address, timeout: Duration) -> Result<Self, Error> {
        debug!(%address, "connecting to VICI socket");
        let connect_err = |source| Error::Connect {
            address: address.to_string(),
            source,
        };

        match address {
            Address::Tcp { host, port } => {
                let stream = bounded(timeout, tokio::net::TcpStream::connect((host.as_str(), *port)))
                    .await?
                    .map_err(connect_err)?;
                Ok(Self::new(stream, timeout))
            }
            #[cfg(unix)]
            Address::Unix(path) => {
                let stream = bounded(timeout, tokio::net::UnixStream::connect(path))
                    .await?
                    .map_err(connect_err)?;
                Ok(Self::new(stream, timeout))
            }
            #[cfg(not(unix))]
            Address::Unix(_) => Err(Error::UnsupportedNetwork("unix".into())),
        }
    }

    // ── Framing ─────────────────────────────────────────────────────

    async fn write_packet(&mut self, packet: &Packet) -> Result<(), Error> {
        let encoded = packet.encode()?;
        trace!(kind = ?packet.kind, name = ?packet.name, "sending packet");
        bounded(self.timeout, self.io.write_all(&encoded)).await??;
        bounded(self.timeout, self.io.flush()).await??;
        Ok(())
    }

    async fn read_packet(&mut self) -> Result<Packet, Error> {
        let mut prefix = [0_u8; 4];
        bounded(self.timeout, self.io.read_exact(&mut prefix)).await??;

        let size = usize::try_from(u32::from_be_bytes(prefix)).unwrap_or(usize::MAX);
        if size == 0 {
            return Err(Error::Protocol("zero-length packet".into()));
        }
        if size > MAX_PACKET_SIZE {
            return Err(Error::PacketTooLarge {
                size,
                max: MAX_PACKET_SIZE,
            });
        }

        let mut payload = vec![0_u8; size];
        bounded(self.timeout, self.io.read_exact(&mut payload)).await??;
        let packet = Packet::decode(Bytes::from(payload))?;
        trace!(kind = ?packet.kind, name = ?packet.name, "received packet");
        Ok(packet)
    }

    // ── Event registration ──────────────────────────────────────────

    async fn register(&mut self, event: &str) -> Result<(), Error> {
        self.write_packet(&Packet::new(PacketType::EventRegister, Some(event), Message::new()))
            .await?;
        self.await_confirm(event).await
    }

    async fn unregister(&mut self, event: &str) -> Result<(), Error> {
        self.write_packet(&Packet::new(
            PacketType::EventUnregister,
            Some(event),
            Message::new(),
        ))
        .await?;
        self.await_confirm(event).await
    }

    async fn await_confirm(&mut self, event: &str) -> Result<(), Error> {
        loop {
            let packet = self.read_packet().await?;
            match packet.kind {
                PacketType::EventConfirm => return Ok(()),
                PacketType::EventUnknown => return Err(Error::UnknownEvent(event.to_owned())),
                PacketType::Event => {
                    trace!(name = ?packet.name, "dropping event while awaiting confirmation");
                }
                other => {
                    return Err(Error::Protocol(format!(
                        "expected event confirmation for '{event}', got {other:?}"
                    )));
                }
            }
        }
    }

    // ── Request ─────────────────────────────────────────────────────

    async fn collect(
        &mut self,
        command: &str,
        event: &str,
        message: Option<&Message>,
    ) -> Result<Vec<Message>, Error> {
        let body = message.cloned().unwrap_or_default();
        self.write_packet(&Packet::new(PacketType::CmdRequest, Some(command), body))
            .await?;

        let mut records = Vec::new();
        loop {
            let packet = self.read_packet().await?;
            match packet.kind {
                PacketType::Event if packet.name.as_deref() == Some(event) => {
                    records.push(packet.message);
                }
                PacketType::Event => {
                    trace!(name = ?packet.name, expected = event, "ignoring unrelated event");
                }
                PacketType::CmdResponse => {
                    records.push(packet.message);
                    return Ok(records);
                }
                PacketType::CmdUnknown => return Err(Error::UnknownCommand(command.to_owned())),
                other => {
                    return Err(Error::Protocol(format!(
                        "unexpected {other:?} packet during '{command}'"
                    )));
                }
            }
        }
    }
}

impl Client for Session {
    async fn streamed_command_request(
        &mut self,
        command: &str,
        event: &str,
        message: Option<&Message>,
    ) -> Result<Vec<Message>, Error> {
        self.register(event).await?;

        let records = match self.collect(command, event, message).await {
            Ok(records) => records,
            Err(e @ Error::UnknownCommand(_)) => {
                // the stream is still in sync, so leave it clean
                self.unregister(event).await?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.unregister(event).await?;
        debug!(command, records = records.len(), "streamed request complete");
        Ok(records)
    }

    async fn close(mut self) -> Result<(), Error> {
        bounded(self.timeout, self.io.shutdown()).await??;
        Ok(())
    }
}

// ── Connector ───────────────────────────────────────────────────────

/// Opens a fresh [`Session`] per call.
#[derive(Debug, Clone)]
pub struct SocketConnector {
    address: Address,
    timeout: Duration,
}

impl SocketConnector {
    pub fn new(address: Address, timeout: Duration) -> Self {
        Self { address, timeout }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl Connector for SocketConnector {
    type Client = Session;

    async fn connect(&self) -> Result<Session, Error> {
        Session::connect(&self.address, self.timeout).await
    }
}

async fn bounded<F: std::future::Future>(timeout: Duration, fut: F) -> Result<F::Output, Error> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::Timeout {
            timeout_secs: timeout.as_secs(),
        })
}
