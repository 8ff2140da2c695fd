//! Solver session: one connection, one command, callbacks in between.
//!
//! A [`Solver`] walks `NotStarted → Handshaking → Running → Closing → Closed`
//! for every run. It accepts one run at a time; a second concurrent call
//! fails with [`SessionError::Busy`]. After a run the same instance can be
//! reused for an independent run.

mod callbacks;
mod run;


use std::fmt::Debug;
use std::io::IsTerminal;
use std::sync::Arc;

use cpwire_config::ClientConfig;
use cpwire_core::{Command, Model, Solution};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::output::{ConsoleOutput, OutputSink};
use crate::protocol::{ClientMessage, PropagationResult};
use crate::result::SolveResult;
use crate::transport::{Connector, DefaultConnector, Transport};

pub use callbacks::{CallbackFuture, CallbackResult};
use callbacks::Callbacks;
use run::Outcome;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// Handshake and command sent, waiting for the solver's handshake.
    Handshaking,
    Running,
    /// The terminal message arrived; waiting for the transport to close.
    Closing,
    Closed,
}

impl Phase {
    /// True while a run is in flight.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Handshaking | Phase::Running | Phase::Closing)
    }

    /// True while the solver still accepts `stop` and injected solutions.
    pub fn accepts_commands(self) -> bool {
        matches!(self, Phase::Handshaking | Phase::Running)
    }
}

struct State {
    phase: Phase,
    /// Set once this side initiated the shutdown; an unexpected close is a
    /// transport failure.
    close_expected: bool,
    transport: Option<Arc<dyn Transport>>,
}

pub(crate) struct Shared {
    state: Mutex<State>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(State {
                phase: Phase::NotStarted,
                close_expected: false,
                transport: None,
            }),
        }
    }
}

/// Cloneable handle for steering a running solve.
///
/// Both operations are fire-and-forget. Outside `Handshaking` and `Running`
/// they do nothing, so they are safe to call from any callback or after the
/// run finished.
#[derive(Clone)]
pub struct SolverHandle {
    shared: Arc<Shared>,
}

impl SolverHandle {
    /// Asks the solver to finish early and report what it has.
    pub fn stop(&self, reason: &str) {
        let message = ClientMessage::Stop { reason };
        self.send_if_running(&message, "stop");
    }

    /// Injects an externally computed solution into the search.
    pub fn send_solution(&self, solution: &Solution) {
        let message = ClientMessage::Solution { data: solution };
        self.send_if_running(&message, "send_solution");
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    fn send_if_running(&self, message: &ClientMessage<'_>, what: &str) {
        let state = self.shared.state.lock();
        let transport = match (&state.transport, state.phase.accepts_commands()) {
            (Some(transport), true) => transport,
            _ => {
                debug!(event = "command_ignored", command = what, phase = ?state.phase);
                return;
            }
        };
        match message.to_line() {
            Ok(line) => {
                debug!(event = "command_sent", command = what);
                transport.send(&line);
            }
            Err(err) => warn!(event = "command_encode_failed", command = what, error = %err),
        }
    }
}

impl Debug for SolverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverHandle")
            .field("phase", &self.phase())
            .finish()
    }
}

/// Client side of the solver protocol.
///
/// # Example
///
/// ```no_run
/// use cpwire_core::Model;
/// use cpwire_session::Solver;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut model = Model::new();
/// let x = model.int_var(0, 10)?;
/// model.maximize(x)?;
///
/// let solver = Solver::new();
/// let handle = solver.handle();
/// solver.on_solution(move |event| {
///     if event.objective == Some(10.0) {
///         handle.stop("good enough");
///     }
///     Ok(())
/// })?;
/// let result = solver.solve(&model, None).await?;
/// println!("best objective: {:?}", result.best_objective);
/// # Ok(())
/// # }
/// ```
pub struct Solver {
    shared: Arc<Shared>,
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    output: Arc<dyn OutputSink>,
    callbacks: Mutex<Callbacks>,
}

impl Solver {
    /// Creates a solver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let colors = console_colors(&config);
        Self {
            shared: Arc::new(Shared::new()),
            config,
            connector: Arc::new(DefaultConnector),
            output: Arc::new(ConsoleOutput::new(colors)),
            callbacks: Mutex::new(Callbacks::default()),
        }
    }

    /// Replaces how connections are opened.
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    /// Replaces where solver log, warning and error lines are printed.
    pub fn with_output(mut self, output: impl OutputSink + 'static) -> Self {
        self.output = Arc::new(output);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn handle(&self) -> SolverHandle {
        SolverHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    /// See [`SolverHandle::stop`].
    pub fn stop(&self, reason: &str) {
        self.handle().stop(reason);
    }

    /// See [`SolverHandle::send_solution`].
    pub fn send_solution(&self, solution: &Solution) {
        self.handle().send_solution(solution);
    }

    // === Commands ===

    /// Solves `model`, optionally starting from `warm_start`.
    ///
    /// Returns once the solver's summary arrived and the connection closed.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, transport or protocol failures, a
    /// failing callback, or when the solver reported errors.
    pub async fn solve(&self, model: &Model, warm_start: Option<&Solution>) -> Result<SolveResult> {
        match self.run(Command::Solve, model, warm_start).await? {
            Outcome::Solved(result) => Ok(result),
            other => Err(unexpected_outcome(Command::Solve, &other)),
        }
    }

    /// Runs constraint propagation only and returns the reduced domains.
    pub async fn propagate(&self, model: &Model) -> Result<PropagationResult> {
        match self.run(Command::Propagate, model, None).await? {
            Outcome::Propagated(result) => Ok(result),
            other => Err(unexpected_outcome(Command::Propagate, &other)),
        }
    }

    /// Asks the solver for its text rendering of `model`.
    pub async fn to_text(&self, model: &Model) -> Result<String> {
        match self.run(Command::ToText, model, None).await? {
            Outcome::Text(text) => Ok(text),
            other => Err(unexpected_outcome(Command::ToText, &other)),
        }
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("phase", &self.phase())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Whether solver output is colored, both in the solver's own log text and
/// in the prefixes printed around it. Solver logs land on stdout, so that
/// stream decides for `ColorMode::Auto`.
pub(crate) fn console_colors(config: &ClientConfig) -> bool {
    config.colors.enabled(std::io::stdout().is_terminal())
}

fn unexpected_outcome(command: Command, outcome: &Outcome) -> SessionError {
    SessionError::Protocol(format!(
        "{} command ended with a {} message",
        command.as_str(),
        outcome.tag()
    ))
}
