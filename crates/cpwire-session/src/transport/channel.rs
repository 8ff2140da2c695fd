//! In-memory transport for embedding a solver in-process and for tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{Connection, Transport, TransportEvent};
use crate::error::TransportError;

/// Creates a connected pair: the client [`Connection`] and the solver-side
/// [`ChannelPeer`].
pub fn channel() -> (Connection, ChannelPeer) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let transport = Arc::new(ChannelTransport {
        outbound: Mutex::new(Some(outbound_tx)),
        events: events_tx.clone(),
    });
    let peer = ChannelPeer {
        received: outbound_rx,
        events: events_tx,
    };
    (
        Connection {
            transport,
            events: events_rx,
        },
        peer,
    )
}

/// Client half of an in-memory connection.
#[derive(Debug)]
pub struct ChannelTransport {
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl Transport for ChannelTransport {
    fn send(&self, line: &str) {
        if let Some(tx) = self.outbound.lock().as_ref() {
            let _ = tx.send(line.to_string());
        }
    }

    fn close(&self) {
        self.outbound.lock().take();
    }

    fn kill(&self) {
        if self.outbound.lock().take().is_some() {
            let _ = self.events.send(TransportEvent::Closed(Ok(())));
        }
    }
}

/// Solver half of an in-memory connection.
#[derive(Debug)]
pub struct ChannelPeer {
    received: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl ChannelPeer {
    /// Next line written by the client, or `None` once the client closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.received.recv().await
    }

    /// Delivers one protocol line to the client.
    pub fn send_line(&self, line: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Line(line.into()));
    }

    pub fn send_stderr(&self, line: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Stderr(line.into()));
    }

    /// Ends the connection with the given outcome.
    pub fn close(self, result: Result<(), TransportError>) {
        let _ = self.events.send(TransportEvent::Closed(result));
    }
}
