//! Error types for the simulation harness.

use rand_distr::NormalError;
use spokeview_core::ConfigError;
use thiserror::Error;

/// Failures setting up or recording a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Engine rejected its configuration
    #[error("Invalid visualization config: {0}")]
    Config(#[from] ConfigError),

    /// Pointer jitter parameters are invalid
    #[error("Invalid pointer jitter: {0}")]
    Pointer(#[from] NormalError),

    /// Frame log or runtime I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
