//! Error types for the SpokeView engine.

use crate::timeline::ChannelId;
use thiserror::Error;

/// Failures of the animation engine.
///
/// These never reach callers of the click or position commands: the
/// visualization core catches them, logs them and resets the element.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MotionError {
    /// Tween duration must be finite and strictly positive
    #[error("Invalid tween duration: {0}s")]
    InvalidDuration(f64),

    /// Tween delay must be finite and non-negative
    #[error("Invalid tween delay: {0}s")]
    InvalidDelay(f64),

    /// A tween needs at least one keyframe
    #[error("Tween has no keyframes")]
    EmptyKeyframes,

    /// The engine failed while playing a sequence on a channel
    #[error("Engine fault on {channel:?}: {reason}")]
    EngineFault { channel: ChannelId, reason: String },
}

impl MotionError {
    /// Creates an engine fault.
    pub fn fault(channel: ChannelId, reason: impl Into<String>) -> Self {
        Self::EngineFault {
            channel,
            reason: reason.into(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field is out of its valid range
    #[error("Invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// JSON could not be parsed
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a validation error for `field`.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Color parsing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),
}

/// Mode parsing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown mode: {0:?} (expected default, speed, customize or repair)")]
pub struct ModeParseError(pub String);
