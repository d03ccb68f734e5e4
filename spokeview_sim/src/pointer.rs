//! Synthetic pointer for driving the parallax and particle trail.
//!
//! The pointer follows a Lissajous curve around the container center with
//! Gaussian hand jitter on top, so trails look like real mouse movement but
//! replay exactly from a seed.

use nalgebra::Vector2;
use rand::RngCore;
use rand_distr::{Distribution, Normal, NormalError};
use std::f64::consts::TAU;

/// Default sweep radius of the pointer offset (px)
pub const DEFAULT_AMPLITUDE: f64 = 20.0;

/// Default jitter standard deviation (px)
pub const DEFAULT_JITTER_STD: f64 = 1.5;

/// Seconds for one horizontal sweep
const PERIOD_X: f64 = 3.0;

/// Seconds for one vertical sweep
const PERIOD_Y: f64 = 2.0;

/// Seeded pointer path generator.
pub struct PointerPath {
    rng: Box<dyn RngCore + Send>,

    /// Half extent of the sweep on each axis
    amplitude: Vector2<f64>,

    jitter: Normal<f64>,

    /// Offsets handed out so far
    samples: u64,
}

impl PointerPath {
    /// Creates a path with the default amplitude and jitter.
    pub fn new(rng: Box<dyn RngCore + Send>) -> Result<Self, NormalError> {
        Self::with_shape(rng, DEFAULT_AMPLITUDE, DEFAULT_JITTER_STD)
    }

    /// Both `amplitude` and `jitter_std` must be finite and non-negative.
    pub fn with_shape(
        rng: Box<dyn RngCore + Send>,
        amplitude: f64,
        jitter_std: f64,
    ) -> Result<Self, NormalError> {
        // Normal::new only rejects a non-finite std_dev
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !(valid(amplitude) && valid(jitter_std)) {
            return Err(NormalError::BadVariance);
        }
        Ok(Self {
            rng,
            amplitude: Vector2::new(amplitude, amplitude),
            jitter: Normal::new(0.0, jitter_std)?,
            samples: 0,
        })
    }

    /// Noise-free offset at `t` seconds.
    pub fn ideal(&self, t: f64) -> Vector2<f64> {
        Vector2::new(
            self.amplitude.x * (TAU * t / PERIOD_X).sin(),
            self.amplitude.y * (TAU * t / PERIOD_Y).cos(),
        )
    }

    /// Jittered offset at `t` seconds.
    pub fn sample(&mut self, t: f64) -> Vector2<f64> {
        self.samples += 1;
        let noise = Vector2::new(
            self.jitter.sample(&mut self.rng),
            self.jitter.sample(&mut self.rng),
        );
        self.ideal(t) + noise
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}
