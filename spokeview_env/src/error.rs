//! Error types for the SpokeView environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error, PartialEq)]
pub enum EnvError {
    /// Frame rate must be at least 1 Hz
    #[error("Invalid frame rate: {0} Hz")]
    InvalidFrameRate(u32),

    /// Frame interval must be a non-zero duration
    #[error("Invalid frame interval: {0}")]
    InvalidInterval(String),
}

impl EnvError {
    /// Creates an interval error.
    pub fn interval(msg: impl Into<String>) -> Self {
        Self::InvalidInterval(msg.into())
    }
}
