// ── Client seams ──
//
// The collector only needs two capabilities from the transport: open a
// session, and run a streamed request on it. Both are traits so the core can
// be exercised with in-memory fakes.

use std::future::Future;

use crate::error::Error;
use crate::message::Message;

/// An open VICI session.
pub trait Client: Send {
    /// Issue `command`, collecting every `event` the daemon streams back.
    ///
    /// The returned records are in arrival order, followed by the final
    /// command response. Records that carry `success = no` are returned as
    /// they are; interpreting them is up to the caller.
    fn streamed_command_request(
        &mut self,
        command: &str,
        event: &str,
        message: Option<&Message>,
    ) -> impl Future<Output = Result<Vec<Message>, Error>> + Send;

    /// Release the session. Consumes the client, so it runs at most once.
    fn close(self) -> impl Future<Output = Result<(), Error>> + Send
    where
        Self: Sized;
}

/// Opens sessions against one configured daemon endpoint.
pub trait Connector: Send + Sync {
    type Client: Client;

    fn connect(&self) -> impl Future<Output = Result<Self::Client, Error>> + Send;
}
