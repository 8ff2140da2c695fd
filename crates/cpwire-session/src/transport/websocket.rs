//! Remote solver reached over a WebSocket.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::debug;

use super::{Connection, Transport, TransportEvent};
use crate::error::TransportError;
use crate::lines::LineBuffer;

/// Close code used when the stream ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;

/// WebSocket transport.
///
/// Frames are not messages: one frame may hold several lines and one line
/// may span several frames, so inbound text goes through a [`LineBuffer`].
/// Lines sent before the socket opens are queued. Closing sends a close
/// frame and waits for the server's reply; any close code other than
/// normal closure is an error.
#[derive(Debug)]
pub struct WebSocketTransport {
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    kill: Mutex<Option<oneshot::Sender<()>>>,
}

impl WebSocketTransport {
    /// Starts connecting to `url` in the background.
    ///
    /// `http` and `https` URLs are mapped to `ws` and `wss`. Connection
    /// failures arrive as the connection's close event.
    pub fn connect(url: &str) -> Connection {
        let url = websocket_url(url);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = oneshot::channel();

        tokio::spawn(async move {
            let result = drive(&url, outbound_rx, kill_rx, &events_tx).await;
            debug!(event = "websocket_closed", url = %url, ok = result.is_ok());
            let _ = events_tx.send(TransportEvent::Closed(result));
        });

        Connection {
            transport: Arc::new(WebSocketTransport {
                outbound: Mutex::new(Some(outbound_tx)),
                kill: Mutex::new(Some(kill_tx)),
            }),
            events: events_rx,
        }
    }
}

impl Transport for WebSocketTransport {
    fn send(&self, line: &str) {
        if let Some(tx) = self.outbound.lock().as_ref() {
            let _ = tx.send(format!("{line}\n"));
        }
    }

    fn close(&self) {
        self.outbound.lock().take();
    }

    fn kill(&self) {
        self.outbound.lock().take();
        if let Some(kill) = self.kill.lock().take() {
            let _ = kill.send(());
        }
    }
}

pub(crate) fn websocket_url(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") {
        format!("ws://{}", &url["http://".len()..])
    } else if lower.starts_with("https://") {
        format!("wss://{}", &url["https://".len()..])
    } else {
        url.to_string()
    }
}

fn ws_error(err: tungstenite::Error) -> TransportError {
    TransportError::WebSocket(err.to_string())
}

fn deliver(buffer: &mut LineBuffer, bytes: &[u8], events: &mpsc::UnboundedSender<TransportEvent>) {
    for line in buffer.push(bytes) {
        let _ = events.send(TransportEvent::Line(line));
    }
}

fn flush(buffer: &mut LineBuffer, events: &mpsc::UnboundedSender<TransportEvent>) {
    if let Some(tail) = buffer.finish() {
        let _ = events.send(TransportEvent::Line(tail));
    }
}

async fn drive(
    url: &str,
    mut outbound: mpsc::UnboundedReceiver<String>,
    mut kill_rx: oneshot::Receiver<()>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> Result<(), TransportError> {
    let (stream, _) = tokio::select! {
        connected = tokio_tungstenite::connect_async(url) => connected.map_err(ws_error)?,
        _ = &mut kill_rx => return Ok(()),
    };
    debug!(event = "websocket_open", url = %url);

    let (mut sink, mut source) = stream.split();
    let mut buffer = LineBuffer::new();
    let mut closing = false;

    loop {
        tokio::select! {
            line = outbound.recv(), if !closing => match line {
                Some(line) => sink.send(Message::Text(line.into())).await.map_err(ws_error)?,
                None => {
                    closing = true;
                    let _ = sink.send(Message::Close(None)).await;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => deliver(&mut buffer, text.as_bytes(), events),
                Some(Ok(Message::Binary(data))) => deliver(&mut buffer, &data, events),
                Some(Ok(Message::Close(frame))) => {
                    flush(&mut buffer, events);
                    return match frame {
                        Some(frame) if frame.code != CloseCode::Normal => {
                            Err(TransportError::AbnormalClose {
                                code: u16::from(frame.code),
                                reason: frame.reason.to_string(),
                            })
                        }
                        _ => Ok(()),
                    };
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    flush(&mut buffer, events);
                    return Err(ws_error(err));
                }
                None => {
                    flush(&mut buffer, events);
                    return Err(TransportError::AbnormalClose {
                        code: ABNORMAL_CLOSURE,
                        reason: "connection dropped without a close frame".to_string(),
                    });
                }
            },
            _ = &mut kill_rx => {
                let _ = sink.send(Message::Close(None)).await;
                return Ok(());
            }
        }
    }
}
