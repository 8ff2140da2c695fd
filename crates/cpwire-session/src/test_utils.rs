//! Test utilities for cpwire-session
//!
//! A scripted solver plays a fixed sequence of protocol steps over an
//! in-memory channel and records what the client sent.

use std::sync::Arc;

use cpwire_config::SolverLocation;
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::output::OutputSink;
use crate::transport::{channel, ChannelPeer, Connection, Connector};

#[derive(Debug, Clone)]
enum Step {
    Send(String),
    Stderr(String),
    /// Wait for one client line.
    Receive,
    /// Record client lines until the client closes, then close cleanly.
    AwaitClose,
    Close,
    Fail(u16),
    /// Keep the connection open forever.
    Hang,
}

/// Scripted solver behavior, replayed once per connection.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Empty script: nothing is read or sent.
    pub fn raw() -> Self {
        Self::default()
    }

    /// Reads the client's handshake and command, then answers the handshake.
    pub fn solver() -> Self {
        Self::raw()
            .receive()
            .receive()
            .send(cpwire_test::messages::handshake())
    }

    pub fn send(mut self, line: impl Into<String>) -> Self {
        self.steps.push(Step::Send(line.into()));
        self
    }

    pub fn stderr(mut self, line: impl Into<String>) -> Self {
        self.steps.push(Step::Stderr(line.into()));
        self
    }

    pub fn receive(mut self) -> Self {
        self.steps.push(Step::Receive);
        self
    }

    pub fn await_close(mut self) -> Self {
        self.steps.push(Step::AwaitClose);
        self
    }

    pub fn close(mut self) -> Self {
        self.steps.push(Step::Close);
        self
    }

    pub fn fail(mut self, code: u16) -> Self {
        self.steps.push(Step::Fail(code));
        self
    }

    pub fn hang(mut self) -> Self {
        self.steps.push(Step::Hang);
        self
    }

    /// Connector that runs this script for every connection.
    pub fn connector(self) -> (ScriptedConnector, Received) {
        let received = Received::default();
        let connector = ScriptedConnector {
            steps: Arc::new(self.steps),
            received: received.clone(),
        };
        (connector, received)
    }
}

/// Lines the client sent, across all connections.
#[derive(Debug, Clone, Default)]
pub struct Received(Arc<Mutex<Vec<String>>>);

impl Received {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Parsed lines whose `msg` equals `tag`.
    pub fn messages(&self, tag: &str) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter(|value| value["msg"] == tag)
            .collect()
    }

    fn push(&self, line: String) {
        self.0.lock().push(line);
    }
}

pub struct ScriptedConnector {
    steps: Arc<Vec<Step>>,
    received: Received,
}

impl Connector for ScriptedConnector {
    fn connect(
        &self,
        _location: &SolverLocation,
        _args: &[String],
    ) -> Result<Connection, TransportError> {
        let (connection, peer) = channel();
        tokio::spawn(play(peer, Arc::clone(&self.steps), self.received.clone()));
        Ok(connection)
    }
}

async fn play(mut peer: ChannelPeer, steps: Arc<Vec<Step>>, received: Received) {
    for step in steps.iter() {
        match step {
            Step::Send(line) => peer.send_line(line.clone()),
            Step::Stderr(line) => peer.send_stderr(line.clone()),
            Step::Receive => match peer.recv().await {
                Some(line) => received.push(line),
                None => break,
            },
            Step::AwaitClose => {
                while let Some(line) = peer.recv().await {
                    received.push(line);
                }
                break;
            }
            Step::Close => break,
            Step::Fail(code) => {
                peer.close(Err(TransportError::AbnormalClose {
                    code: *code,
                    reason: "scripted failure".to_string(),
                }));
                return;
            }
            Step::Hang => {
                std::future::pending::<()>().await;
                return;
            }
        }
    }
    peer.close(Ok(()));
}

/// Output sink that records what would have been printed.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput(Arc<Mutex<Vec<(&'static str, String)>>>);

impl RecordingOutput {
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        self.0.lock().clone()
    }
}

impl OutputSink for RecordingOutput {
    fn log(&self, text: &str) {
        self.0.lock().push(("log", text.to_string()));
    }

    fn warning(&self, text: &str) {
        self.0.lock().push(("warning", text.to_string()));
    }

    fn error(&self, text: &str) {
        self.0.lock().push(("error", text.to_string()));
    }
}
