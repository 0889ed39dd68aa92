//! Error types used by the engine and its collaborators.
//!
//! This module defines a single enum, [`EngineError`], covering every way a run
//! can end abnormally. All variants are fatal for the run: the engine publishes
//! `StateChange { Quitting }`, stops its background tasks and returns the error.
//!
//! Helper methods (`as_label`, `as_message`) are provided for logs.

use thiserror::Error;

/// # Errors produced by a Game of Life run.
///
/// A run is a closed computation over validated input, so there is no
/// recoverable-error taxonomy: anything reported here aborts the run without
/// committing a partial generation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The I/O collaborator failed (truncated stream, store failure, actor gone).
    #[error("image io failed: {reason}")]
    Io {
        /// The underlying failure message.
        reason: String,
    },

    /// The input image contained a byte that is neither 0 (dead) nor 255 (alive).
    #[error("invalid pixel {value} at ({x}, {y}); expected 0 or 255")]
    InvalidPixel {
        /// Column of the offending byte.
        x: usize,
        /// Row of the offending byte.
        y: usize,
        /// The byte that was read.
        value: u8,
    },

    /// A worker dropped its band without returning a result; the turn was aborted.
    #[error("worker for band {band} returned no result")]
    WorkerLost {
        /// Index of the band whose result never arrived.
        band: usize,
    },

    /// The counter broker has already been stopped.
    #[error("counter broker closed")]
    BrokerClosed,

    /// The configuration cannot describe a grid (zero width or height).
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },
}

impl EngineError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use gol_engine::EngineError;
    ///
    /// let err = EngineError::WorkerLost { band: 3 };
    /// assert_eq!(err.as_label(), "worker_lost");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::Io { .. } => "io_failed",
            EngineError::InvalidPixel { .. } => "invalid_pixel",
            EngineError::WorkerLost { .. } => "worker_lost",
            EngineError::BrokerClosed => "broker_closed",
            EngineError::InvalidConfig { .. } => "invalid_config",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EngineError::Io { reason } => format!("io: {reason}"),
            EngineError::InvalidPixel { x, y, value } => {
                format!("pixel ({x}, {y}) = {value}")
            }
            EngineError::WorkerLost { band } => format!("band {band} lost"),
            EngineError::BrokerClosed => "broker closed".to_string(),
            EngineError::InvalidConfig { reason } => format!("config: {reason}"),
        }
    }

    /// Shorthand for building an [`EngineError::Io`].
    pub(crate) fn io(reason: impl Into<String>) -> Self {
        EngineError::Io {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::io(err.to_string())
    }
}
