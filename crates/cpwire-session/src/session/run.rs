//! The event loop behind `solve`, `propagate` and `to_text`.

use std::sync::Arc;

use cpwire_core::{Command, Model, Solution};
use tracing::{debug, info};

use super::callbacks::{invoke, Callbacks};
use super::{Phase, Shared, Solver};
use crate::error::{Result, SessionError, TransportError};
use crate::protocol::{ClientMessage, PropagationResult, SolverMessage, Summary};
use crate::result::{ResultAccumulator, SolveResult};
use crate::transport::{Connection, Transport, TransportEvent};

/// Terminal result of one command.
#[derive(Debug)]
pub(super) enum Outcome {
    Solved(SolveResult),
    Propagated(PropagationResult),
    Text(String),
}

impl Outcome {
    pub(super) fn tag(&self) -> &'static str {
        match self {
            Outcome::Solved(_) => "summary",
            Outcome::Propagated(_) => "domains",
            Outcome::Text(_) => "textModel",
        }
    }
}

/// Terminal message seen so far, before results are assembled.
enum Terminal {
    Summary(Summary),
    Domains(PropagationResult),
    Text(String),
}

/// Resets the session when a run ends, however it ends.
///
/// Dropping a `solve` future mid-run lands here too, so the transport never
/// outlives the run.
struct RunGuard<'a> {
    shared: &'a Shared,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let transport = {
            let mut state = self.shared.state.lock();
            state.phase = Phase::Closed;
            state.close_expected = false;
            state.transport.take()
        };
        if let Some(transport) = transport {
            transport.kill();
        }
    }
}

impl Solver {
    /// Marks the run as started and snapshots the callbacks.
    fn begin(&self) -> Result<(RunGuard<'_>, Callbacks)> {
        let mut state = self.shared.state.lock();
        if state.phase.is_active() {
            return Err(SessionError::Busy);
        }
        state.phase = Phase::Handshaking;
        state.close_expected = false;
        let callbacks = self.callbacks.lock().clone();
        Ok((
            RunGuard {
                shared: &self.shared,
            },
            callbacks,
        ))
    }

    pub(super) async fn run(
        &self,
        command: Command,
        model: &Model,
        warm_start: Option<&Solution>,
    ) -> Result<Outcome> {
        let (_guard, callbacks) = self.begin()?;
        self.config.validate()?;

        let mut parameters = self.config.parameters.clone();
        if command == Command::Solve && parameters.batch_results.is_none() {
            let batch = self
                .config
                .batch_results
                .resolve(callbacks.wants_incremental());
            parameters.batch_results = Some(batch);
        }
        let document = model.serialize(command, &parameters, warm_start)?;
        let location = self.config.resolve_solver();

        info!(
            event = "solve_start",
            command = command.as_str(),
            solver = %location,
            node_count = model.node_count() as u64,
            ref_count = model.ref_count() as u64,
            constraint_count = model.constraint_count() as u64,
            time_limit = parameters.time_limit,
        );

        let Connection {
            transport,
            mut events,
        } = self.connector.connect(&location, &self.config.solver_args)?;
        self.shared.state.lock().transport = Some(Arc::clone(&transport));

        let colors = super::console_colors(&self.config);
        transport.send(&ClientMessage::handshake(colors).to_line()?);
        transport.send(&document);

        let mut run = Run {
            solver: self,
            command,
            callbacks,
            transport,
            results: ResultAccumulator::new(),
            errors: Vec::new(),
            terminal: None,
            handshaken: false,
        };

        let closed = loop {
            let Some(event) = events.recv().await else {
                break Err(TransportError::UnexpectedClose);
            };
            match event {
                TransportEvent::Line(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    run.on_line(&line).await?;
                }
                TransportEvent::Stderr(text) => run.on_warning(text).await?,
                TransportEvent::Closed(result) => break result,
            }
        };

        run.finish(closed)
    }
}

struct Run<'a> {
    solver: &'a Solver,
    command: Command,
    callbacks: Callbacks,
    transport: Arc<dyn Transport>,
    results: ResultAccumulator,
    errors: Vec<String>,
    terminal: Option<Terminal>,
    handshaken: bool,
}

impl Run<'_> {
    fn set_phase(&self, phase: Phase) {
        self.solver.shared.state.lock().phase = phase;
    }

    /// We initiated the shutdown: whatever close follows is expected.
    fn expect_close(&self) {
        let mut state = self.solver.shared.state.lock();
        state.close_expected = true;
        state.phase = Phase::Closing;
    }

    fn print_log(&self) -> bool {
        self.solver.config.print_log
    }

    async fn on_line(&mut self, line: &str) -> Result<()> {
        let message = SolverMessage::parse(line)
            .map_err(|err| SessionError::Protocol(format!("invalid solver message: {err}")))?;

        if !self.handshaken {
            match message {
                SolverMessage::Handshake(identity) => {
                    self.handshaken = true;
                    self.set_phase(Phase::Running);
                    info!(
                        event = "handshake",
                        solver = identity.solver.as_deref().unwrap_or("unknown"),
                        version = identity.version.as_deref().unwrap_or("unknown"),
                    );
                    return Ok(());
                }
                // A solver that fails during startup answers with an error.
                SolverMessage::Error(_) => {}
                other => {
                    return Err(SessionError::Protocol(format!(
                        "expected handshake, got {}",
                        other.tag()
                    )));
                }
            }
        }

        match message {
            SolverMessage::Handshake(_) => {
                Err(SessionError::Protocol("duplicate handshake".to_string()))
            }
            SolverMessage::Log(text) => {
                if self.print_log() {
                    self.solver.output.log(&text);
                }
                invoke(&self.callbacks.log, text).await
            }
            SolverMessage::Warning(text) => self.on_warning(text).await,
            SolverMessage::Error(text) => {
                if self.print_log() {
                    self.solver.output.error(&text);
                }
                self.errors.push(text.clone());
                if let Err(err) = invoke(&self.callbacks.error, text).await {
                    debug!(event = "error_callback_failed", error = %err);
                }
                Ok(())
            }
            SolverMessage::Solution(event) => {
                info!(
                    event = "solution",
                    objective = event.objective,
                    solve_time = event.solve_time,
                    valid = event.valid,
                );
                self.results.on_solution(event.clone());
                invoke(&self.callbacks.solution, event).await
            }
            SolverMessage::LowerBound(event) => {
                info!(
                    event = "lower_bound",
                    value = event.value,
                    solve_time = event.solve_time,
                );
                self.results.on_lower_bound(event);
                invoke(&self.callbacks.lower_bound, event).await
            }
            SolverMessage::Summary(summary) => {
                self.accept_terminal(Command::Solve, "summary")?;
                self.terminal = Some(Terminal::Summary(summary.clone()));
                invoke(&self.callbacks.summary, summary).await
            }
            SolverMessage::Domains(result) => {
                self.accept_terminal(Command::Propagate, "domains")?;
                self.terminal = Some(Terminal::Domains(result));
                Ok(())
            }
            SolverMessage::TextModel(text) => {
                self.accept_terminal(Command::ToText, "textModel")?;
                self.terminal = Some(Terminal::Text(text));
                Ok(())
            }
        }
    }

    /// Checks a terminal message against the command and starts closing.
    fn accept_terminal(&self, expected: Command, tag: &str) -> Result<()> {
        if self.command != expected {
            return Err(SessionError::Protocol(format!(
                "unexpected {tag} message for {} command",
                self.command.as_str()
            )));
        }
        if self.terminal.is_some() {
            return Err(SessionError::Protocol(format!("duplicate {tag} message")));
        }
        self.expect_close();
        self.transport.close();
        Ok(())
    }

    async fn on_warning(&mut self, text: String) -> Result<()> {
        if self.print_log() {
            self.solver.output.warning(&text);
        }
        invoke(&self.callbacks.warning, text).await
    }

    fn finish(self, closed: std::result::Result<(), TransportError>) -> Result<Outcome> {
        let close_expected = self.solver.shared.state.lock().close_expected;

        // A solver that reported errors often exits without a terminal
        // message; its own texts say more than the close does.
        if !self.errors.is_empty() {
            debug!(event = "transport_closed", ok = closed.is_ok(), expected = close_expected);
            return Err(SessionError::Solver(self.errors));
        }

        match closed {
            Err(err) if !close_expected => {
                info!(event = "transport_closed", ok = false, error = %err);
                return Err(SessionError::Transport(err));
            }
            Err(err) => debug!(event = "transport_closed", ok = false, error = %err),
            Ok(()) if !close_expected => {
                info!(event = "transport_closed", ok = false, error = "unexpected close");
                return Err(SessionError::Transport(TransportError::UnexpectedClose));
            }
            Ok(()) => debug!(event = "transport_closed", ok = true),
        }

        match self.terminal {
            Some(Terminal::Summary(summary)) => {
                let result = self.results.finish(summary);
                info!(
                    event = "solve_end",
                    solution_count = result.nb_solutions(),
                    objective = result.best_objective,
                    lower_bound = result.best_lower_bound,
                    proof = result.proof(),
                    duration = result.duration(),
                );
                Ok(Outcome::Solved(result))
            }
            Some(Terminal::Domains(result)) => {
                info!(event = "solve_end", command = "propagate", infeasible = result.infeasible);
                Ok(Outcome::Propagated(result))
            }
            Some(Terminal::Text(text)) => {
                info!(event = "solve_end", command = "toText", length = text.len() as u64);
                Ok(Outcome::Text(text))
            }
            None => Err(SessionError::Protocol(
                "solver closed the connection without a result".to_string(),
            )),
        }
    }
}
