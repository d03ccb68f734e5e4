//! Per-frame render description.
//!
//! A [`Frame`] is derived purely from engine state; a renderer draws it
//! without reaching back into the engine.

use crate::mode::{Mode, OverlayFlags};
use crate::overlay::OverlayVisual;
use crate::particles::Particle;
use serde::{Deserialize, Serialize};

pub const INTERACTION_HINT: &str = "Click on wheels & gears to animate";

/// Transform of the figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPose {
    /// Vertical bob (px, negative is up)
    pub y: f64,
    pub scale: f64,
    /// In-plane rotation (deg)
    pub rotate: f64,
    /// 3D tilt (deg)
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub tilt_z: f64,
    /// Orange drop shadow around the figure
    pub glow: bool,
}

/// Look of the two wheels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelStyle {
    /// Dashed border opacity
    pub border_opacity: f64,
    /// Orange halo, speed mode only
    pub glow: bool,
}

impl WheelStyle {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Speed => Self {
                border_opacity: 0.7,
                glow: true,
            },
            _ => Self {
                border_opacity: 0.3,
                glow: false,
            },
        }
    }
}

/// Everything visible at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: u64,
    pub time_sec: f64,
    pub mode: Mode,
    pub flags: OverlayFlags,
    pub animating: bool,

    /// Parallax translation of the content wrapper (px)
    pub content_offset: [f64; 2],

    pub body: BodyPose,
    /// Figure fade-in, [0, 1]
    pub figure_opacity: f64,
    /// Degrees
    pub gear_angle: f64,
    /// Dash offset along the chain path, [0, 1]
    pub chain_offset: f64,
    /// Degrees
    pub wheel_angle: f64,
    pub wheel: WheelStyle,

    pub particles: Vec<Particle>,
    pub overlay: OverlayVisual,

    /// Top indicator text, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    pub hint: String,
    /// Vertical bounce of the dot under the hint (px, positive is down)
    pub hint_dot_y: f64,
}

impl Frame {
    /// True if any speed-only element is visible.
    pub fn has_speed_elements(&self) -> bool {
        self.flags.speed_active
            || self.body.glow
            || self.wheel.glow
            || matches!(self.overlay, OverlayVisual::Speed { .. })
            || self.particles.iter().any(|p| p.glow.is_some())
            || self.indicator.as_deref() == Mode::Speed.indicator()
    }
}
