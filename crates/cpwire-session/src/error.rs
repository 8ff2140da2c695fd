//! Error types for solver sessions and transports

use cpwire_config::ConfigError;
use cpwire_core::ModelError;
use thiserror::Error;

/// Boxed error returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of the channel carrying protocol lines.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The solver executable could not be started
    #[error("Failed to start solver {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Reading or writing the solver's pipes failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The solver process ended with a failure status
    #[error("Solver process exited with {0}")]
    ProcessExited(std::process::ExitStatus),

    /// WebSocket handshake or frame error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The socket closed with a code other than normal closure
    #[error("WebSocket closed with code {code}: {reason}")]
    AbnormalClose { code: u16, reason: String },

    /// The connection ended while the session still expected messages
    #[error("Solver connection closed unexpectedly")]
    UnexpectedClose,
}

/// Main error type for solver sessions
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A run is in flight on this session
    #[error("Solver session is busy: a run is already in progress")]
    Busy,

    /// The solver sent something the protocol does not allow
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Every `error` message the solver sent during the run
    #[error("Solver reported errors: {}", .0.join("; "))]
    Solver(Vec<String>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A user callback failed
    #[error("Callback failed: {0}")]
    Callback(BoxError),
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
