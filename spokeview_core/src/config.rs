//! Engine configuration.
//!
//! Every field has a default matching the stock bicycle animation, so an
//! empty JSON object (`{}`) is a valid config.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use spokeview_env::FrameRate;
use std::path::Path;

/// Particle trail tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Chance that one position update spawns a particle
    pub spawn_probability: f64,

    /// Opacity lost per frame
    pub decay_per_frame: f64,

    /// In-flight particle cap; spawns beyond it are dropped
    pub max_particles: usize,

    /// Particle diameter range in pixels
    pub min_size: f64,
    pub max_size: f64,

    /// Per-axis drift bound in pixels per frame
    pub max_drift: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            spawn_probability: 0.3,
            decay_per_frame: 0.02,
            max_particles: 64,
            min_size: 4.0,
            max_size: 12.0,
            max_drift: 1.0,
        }
    }
}

impl ParticleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::invalid(
                "particles.spawn_probability",
                format!("{} is not in [0, 1]", self.spawn_probability),
            ));
        }
        if !(self.decay_per_frame.is_finite() && self.decay_per_frame > 0.0) {
            return Err(ConfigError::invalid(
                "particles.decay_per_frame",
                "must be finite and positive",
            ));
        }
        if self.max_particles == 0 {
            return Err(ConfigError::invalid("particles.max_particles", "must be at least 1"));
        }
        if !(self.min_size.is_finite() && self.max_size.is_finite())
            || self.min_size <= 0.0
            || self.min_size > self.max_size
        {
            return Err(ConfigError::invalid(
                "particles.min_size",
                format!("need 0 < min_size <= max_size, got {}..{}", self.min_size, self.max_size),
            ));
        }
        if !(self.max_drift.is_finite() && self.max_drift >= 0.0) {
            return Err(ConfigError::invalid("particles.max_drift", "must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Top-level configuration for [`crate::VisualizationCore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Content container size in pixels (particles spawn at its center)
    pub viewport_width: f64,
    pub viewport_height: f64,

    /// Distance of repair hotspots from the center
    pub hotspot_radius: f64,

    /// Frame clock used by `tick_frame`
    pub frame_rate: FrameRate,

    pub particles: ParticleConfig,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            viewport_width: 400.0,
            viewport_height: 400.0,
            hotspot_radius: 110.0,
            frame_rate: FrameRate::default(),
            particles: ParticleConfig::default(),
        }
    }
}

impl VisualizationConfig {
    /// Checks every field range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(field, format!("{value} is not a positive size")));
            }
        }
        if !(self.hotspot_radius.is_finite() && self.hotspot_radius >= 0.0) {
            return Err(ConfigError::invalid("hotspot_radius", "must be finite and >= 0"));
        }
        // Deserialization bypasses FrameRate::new
        if self.frame_rate.hz() == 0 {
            return Err(ConfigError::invalid("frame_rate", "must be at least 1 Hz"));
        }
        self.particles.validate()
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
