//! Error types for the taskchat-engine crate.
//!
//! These only surface at engine construction (pattern tables failing to
//! compile). Once built, the engine converts every runtime fault into a
//! user-facing response instead of an error.

use thiserror::Error;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An intent pattern failed to compile.
    #[error("invalid intent pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A keyword automaton failed to build.
    #[error("failed to build keyword set: {reason}")]
    KeywordSet { reason: String },
}
