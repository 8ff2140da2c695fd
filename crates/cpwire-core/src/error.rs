//! Error types for model construction and wire documents

use thiserror::Error;

/// A rejected argument or setter value, raised at graph-construction time.
///
/// `call` names the builder or setter that received the bad value
/// (for example `intPlus` or `IntVar::set_bounds`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{call}: {message}")]
pub struct ValidationError {
    pub call: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            message: message.into(),
        }
    }
}

/// Main error type for model operations
#[derive(Debug, Error)]
pub enum ModelError {
    /// Argument out of range or of the wrong type
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A handle created by another model was passed to this one
    #[error("Handle belongs to a different model")]
    ForeignHandle,

    /// Wire document is missing required keys or has an unknown shape
    #[error("Malformed model document: {0}")]
    Document(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
