//! cpwire Session - talking to the solver
//!
//! This crate runs commands against a solver process or service:
//! - Protocol messages and newline framing
//! - Transports: child process, WebSocket, in-memory channel
//! - The [`Solver`] session state machine and its typed callbacks
//! - Result accumulation into a [`SolveResult`]
//! - The output sink for solver log, warning and error text

pub mod error;
pub mod lines;
pub mod output;
pub mod protocol;
pub mod result;
pub mod session;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use error::{BoxError, Result, SessionError, TransportError};
pub use lines::LineBuffer;
pub use output::{ConsoleOutput, NullOutput, OutputSink};
pub use protocol::{
    ClientMessage, IntervalDomain, LowerBoundEvent, PropagationResult, SolutionEvent,
    SolverIdentity, SolverMessage, Summary, VarDomain,
};
pub use result::{ObjectiveEntry, SolveResult};
pub use session::{CallbackFuture, CallbackResult, Phase, Solver, SolverHandle};
pub use transport::{
    channel, ChannelPeer, ChannelTransport, Connection, Connector, DefaultConnector,
    ProcessTransport, Transport, TransportEvent, WebSocketTransport,
};
