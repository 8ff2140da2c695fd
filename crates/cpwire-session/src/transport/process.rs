//! Solver running as a child process, speaking over stdin/stdout.

use std::io;
use std::path::Path;
use std::process::Stdio;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Connection, Transport, TransportEvent};
use crate::error::TransportError;
use crate::lines::LineBuffer;

const READ_CHUNK: usize = 8192;

/// Child-process transport.
///
/// stdout carries protocol lines; stderr is read by its own task so a burst
/// of diagnostics never stalls protocol traffic. Closing drops stdin, which
/// the solver treats as end of input. A non-success exit status surfaces as
/// [`TransportError::ProcessExited`].
#[derive(Debug)]
pub struct ProcessTransport {
    pid: Option<u32>,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    kill: Mutex<Option<oneshot::Sender<()>>>,
}

impl ProcessTransport {
    /// Starts `program` and wires its pipes to a new connection.
    pub fn spawn(program: &Path, args: &[String]) -> Result<Connection, TransportError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;
        let pid = child.id();

        debug!(event = "process_spawned", program = %program.display(), pid = ?pid);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = oneshot::channel();

        let writer = tokio::spawn(write_lines(stdin, outbound_rx));
        let readers = [
            tokio::spawn(read_lines(stdout, events_tx.clone(), TransportEvent::Line)),
            tokio::spawn(read_lines(stderr, events_tx.clone(), TransportEvent::Stderr)),
        ];
        tokio::spawn(supervise(child, kill_rx, writer, readers, events_tx));

        let transport = ProcessTransport {
            pid,
            outbound: Mutex::new(Some(outbound_tx)),
            kill: Mutex::new(Some(kill_tx)),
        };
        Ok(Connection {
            transport: std::sync::Arc::new(transport),
            events: events_rx,
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl Transport for ProcessTransport {
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

fn missing_pipe(name: &str) -> TransportError {
    TransportError::Io(io::Error::other(format!("solver {name} was not captured")))
}

async fn write_lines(mut stdin: ChildStdin, mut outbound: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = outbound.recv().await {
        // A dead process is reported by the supervisor; pending writes are dropped.
        if stdin.write_all(line.as_bytes()).await.is_err() || stdin.flush().await.is_err() {
            break;
        }
    }
}

async fn read_lines<R>(
    mut reader: R,
    events: mpsc::UnboundedSender<TransportEvent>,
    wrap: fn(String) -> TransportEvent,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = LineBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if let Some(tail) = buffer.finish() {
                let _ = events.send(wrap(tail));
            }
            return Ok(());
        }
        for line in buffer.push(&chunk[..n]) {
            let _ = events.send(wrap(line));
        }
    }
}

async fn supervise(
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    writer: JoinHandle<()>,
    readers: [JoinHandle<io::Result<()>>; 2],
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    // A dropped kill sender means the transport itself was dropped.
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = kill_rx => None,
    };

    let Some(status) = exited else {
        let _ = child.kill().await;
        writer.abort();
        for reader in readers {
            reader.abort();
        }
        debug!(event = "process_killed");
        let _ = events.send(TransportEvent::Closed(Ok(())));
        return;
    };

    // Drain both pipes so every line precedes the close event.
    let mut read_error = None;
    for reader in readers {
        match reader.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => read_error = read_error.or(Some(err)),
            Err(join) => read_error = read_error.or(Some(io::Error::other(join.to_string()))),
        }
    }
    writer.abort();

    let result = match status {
        Ok(status) if !status.success() => Err(TransportError::ProcessExited(status)),
        Ok(_) => read_error.map_or(Ok(()), |err| Err(TransportError::Io(err))),
        Err(err) => Err(TransportError::Io(err)),
    };
    debug!(event = "process_exited", ok = result.is_ok());
    let _ = events.send(TransportEvent::Closed(result));
}
