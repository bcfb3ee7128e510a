//! Async client for the strongSwan VICI control protocol.
//!
//! This crate covers just enough of VICI for read-only monitoring:
//!
//! - **[`Message`] / [`Element`]**: the ordered, nested message tree
//!   (scalars, lists, sections), with helpers for building request payloads.
//! - **[`codec`]**: packet framing and element encoding as the daemon
//!   speaks it.
//! - **[`Session`]**: one socket to the daemon (TCP or Unix) that runs
//!   streamed requests (register, request, collect events, unregister).
//! - **[`Client`] / [`Connector`]**: the seams consumers program against,
//!   so tests can swap in fakes.

pub mod client;
pub mod codec;
pub mod error;
pub mod message;
pub mod session;

pub use client::{Client, Connector};
pub use error::Error;
pub use message::{Element, Message};
pub use session::{Address, DEFAULT_TIMEOUT, Session, SocketConnector};
