//! Line-oriented channels to a solver.
//!
//! A transport owns the byte stream to one solver instance. Inbound data is
//! reassembled into lines and delivered, in order, on the connection's event
//! receiver; the final event is always [`TransportEvent::Closed`].

mod channel;
mod process;
mod websocket;

#[cfg(all(test, unix))]
mod tests;

use std::sync::Arc;

use cpwire_config::SolverLocation;
use tokio::sync::mpsc;

use crate::error::TransportError;

pub use channel::{channel, ChannelPeer, ChannelTransport};
pub use process::ProcessTransport;
pub use websocket::WebSocketTransport;

/// Something that happened on a transport.
#[derive(Debug)]
pub enum TransportEvent {
    /// One complete protocol line, without its terminator.
    Line(String),
    /// One line of diagnostic output outside the protocol (process stderr).
    Stderr(String),
    /// The channel is gone. `Ok` for an orderly shutdown.
    Closed(Result<(), TransportError>),
}

/// Outbound half of a connection.
///
/// All methods are non-blocking and idempotent. Writes after [`close`](Transport::close)
/// are silently dropped.
pub trait Transport: Send + Sync {
    /// Queues `line` followed by a newline.
    fn send(&self, line: &str);

    /// Ends the outbound stream and lets the peer finish.
    fn close(&self);

    /// Tears the connection down immediately.
    fn kill(&self);
}

/// An open transport and the receiver for its events.
pub struct Connection {
    pub transport: Arc<dyn Transport>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens connections for a session.
///
/// Called from within the tokio runtime; implementations spawn their I/O
/// tasks and return without waiting for the peer.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        location: &SolverLocation,
        args: &[String],
    ) -> Result<Connection, TransportError>;
}

impl<F> Connector for F
where
    F: Fn(&SolverLocation, &[String]) -> Result<Connection, TransportError> + Send + Sync,
{
    fn connect(
        &self,
        location: &SolverLocation,
        args: &[String],
    ) -> Result<Connection, TransportError> {
        self(location, args)
    }
}

/// Spawns a process for executables and opens a WebSocket for URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnector;

impl Connector for DefaultConnector {
    fn connect(
        &self,
        location: &SolverLocation,
        args: &[String],
    ) -> Result<Connection, TransportError> {
        match location {
            SolverLocation::Executable(program) => ProcessTransport::spawn(program, args),
            SolverLocation::Url(url) => Ok(WebSocketTransport::connect(url)),
        }
    }
}
