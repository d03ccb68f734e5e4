//! Common types for the SpokeView environment abstraction.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed frame rate of the animation clock.
///
/// All engine timing is expressed in seconds; the frame rate only decides
/// how big each step is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate(u32);

impl FrameRate {
    /// 60 Hz, the cadence of a browser animation frame.
    pub const DEFAULT_HZ: u32 = 60;

    /// Creates a frame rate from a frequency in Hz.
    pub fn new(hz: u32) -> Result<Self, EnvError> {
        if hz == 0 {
            return Err(EnvError::InvalidFrameRate(hz));
        }
        Ok(Self(hz))
    }

    /// Creates the closest frame rate for a frame interval.
    pub fn from_interval(interval: Duration) -> Result<Self, EnvError> {
        if interval.is_zero() {
            return Err(EnvError::interval("zero-length frame"));
        }
        if interval > Duration::from_secs(1) {
            return Err(EnvError::interval(format!("{interval:?} is slower than 1 Hz")));
        }
        let hz = (1.0 / interval.as_secs_f64()).round();
        Ok(Self(hz as u32))
    }

    /// Returns the frequency in Hz.
    pub fn hz(&self) -> u32 {
        self.0
    }

    /// Returns the frame step in seconds.
    pub fn dt_secs(&self) -> f64 {
        1.0 / self.0 as f64
    }

    /// Returns the frame step as a `Duration`.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.dt_secs())
    }

    /// Number of whole frames covering `secs` seconds.
    pub fn frames_for(&self, secs: f64) -> u64 {
        if secs <= 0.0 || !secs.is_finite() {
            return 0;
        }
        (secs * self.0 as f64).round() as u64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self(Self::DEFAULT_HZ)
    }
}

/// A single step of the frame clock, handed to per-frame callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTick {
    /// Zero-based frame number
    pub index: u64,

    /// Step in seconds
    pub dt: f64,

    /// Context time after the step
    pub elapsed: Duration,
}
