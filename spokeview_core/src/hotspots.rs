//! Repair-mode part hotspots.
//!
//! Parts sit on a circle around the figure. Positions are relative to the
//! container center, +y pointing down.

use crate::color::Rgba;
use crate::part::Part;
use crate::timeline::{Easing, Tween};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Drift amplitude of the idle oscillation (px)
const DRIFT_AMPLITUDE: f64 = 5.0;
const DRIFT_X_PERIOD: f64 = 3.0;
const DRIFT_Y_PERIOD: f64 = 4.0;
const ENTRANCE_SECS: f64 = 0.5;
const ENTRANCE_STAGGER: f64 = 0.2;
const HOVER_SCALE: f64 = 1.2;
const HOVER_PULSE_SECS: f64 = 0.3;

/// Fixed anchor of one part marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub index: usize,
    pub part: Part,
    /// Radians, `2π · index / count`
    pub angle: f64,
    pub anchor: Vector2<f64>,
}

/// Places `parts` evenly on a circle of `radius`.
pub fn hotspot_anchors(parts: &[Part], radius: f64) -> Vec<Hotspot> {
    let count = parts.len();
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let angle = index as f64 / count as f64 * TAU;
            Hotspot {
                index,
                part: part.clone(),
                angle,
                anchor: Vector2::new(radius * angle.cos(), radius * angle.sin()),
            }
        })
        .collect()
}

/// Line from the figure's center to a hovered marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: Vector2<f64>,
    pub to: Vector2<f64>,
}

/// Label shown under a hovered marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub label: String,
    pub color: Rgba,
    pub connector: Connector,
}

/// Everything a renderer needs to draw one marker this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerVisual {
    pub index: usize,
    /// One-based number printed on the marker
    pub number: usize,
    pub color: Rgba,
    pub position: Vector2<f64>,
    pub opacity: f64,
    pub scale: f64,
    /// Wiggle in degrees
    pub rotation: f64,
    /// Glow intensity in [0, 1]
    pub glow: f64,
    pub tooltip: Option<Tooltip>,
}

#[derive(Debug, Clone)]
struct MarkerAnimation {
    entrance: Tween,
    drift_x: Tween,
    drift_y: Tween,
    wiggle: Option<Tween>,
    glow: Option<Tween>,
}

impl MarkerAnimation {
    fn new(hotspot: &Hotspot) -> Self {
        let delay = hotspot.index as f64 * ENTRANCE_STAGGER;
        Self {
            entrance: Tween::to(0.0, 1.0, ENTRANCE_SECS).delay(delay),
            drift_x: Tween::to(0.0, hotspot.angle.cos() * DRIFT_AMPLITUDE, DRIFT_X_PERIOD)
                .ease(Easing::EaseInOut)
                .mirrored(),
            drift_y: Tween::to(0.0, hotspot.angle.sin() * DRIFT_AMPLITUDE, DRIFT_Y_PERIOD)
                .ease(Easing::EaseInOut)
                .mirrored(),
            wiggle: None,
            glow: None,
        }
    }

    fn advance(&mut self, dt: f64) {
        self.entrance.advance(dt);
        self.drift_x.advance(dt);
        self.drift_y.advance(dt);
        for pulse in [&mut self.wiggle, &mut self.glow].into_iter().flatten() {
            pulse.advance(dt);
        }
    }

    fn hover_start(&mut self) {
        self.wiggle = Some(Tween::keyframes([0.0, 5.0, -5.0, 0.0], HOVER_PULSE_SECS));
        self.glow = Some(Tween::keyframes([0.0, 1.0, 0.0], HOVER_PULSE_SECS));
    }

    fn hover_end(&mut self) {
        self.wiggle = None;
        self.glow = None;
    }
}

/// Hover-reactive ring of part markers.
#[derive(Debug, Clone)]
pub struct PartHotspotLayout {
    radius: f64,
    hotspots: Vec<Hotspot>,
    markers: Vec<MarkerAnimation>,
    hovered: Option<usize>,
}

impl PartHotspotLayout {
    pub fn new(parts: &[Part], radius: f64) -> Self {
        let hotspots = hotspot_anchors(parts, radius);
        let markers = hotspots.iter().map(MarkerAnimation::new).collect();
        Self {
            radius,
            hotspots,
            markers,
            hovered: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Pointer entered marker `index`. Any other hovered marker loses hover.
    ///
    /// Returns false for an unknown index or a marker already hovered.
    pub fn hover(&mut self, index: usize) -> bool {
        if index >= self.markers.len() || self.hovered == Some(index) {
            return false;
        }
        if let Some(previous) = self.hovered.take() {
            self.markers[previous].hover_end();
        }
        self.markers[index].hover_start();
        self.hovered = Some(index);
        true
    }

    /// Pointer left marker `index`. Returns false if it was not hovered.
    pub fn unhover(&mut self, index: usize) -> bool {
        if self.hovered != Some(index) {
            return false;
        }
        self.markers[index].hover_end();
        self.hovered = None;
        true
    }

    pub fn clear_hover(&mut self) {
        if let Some(index) = self.hovered {
            self.unhover(index);
        }
    }

    pub fn advance(&mut self, dt: f64) {
        for marker in &mut self.markers {
            marker.advance(dt);
        }
    }

    /// Current visuals of every marker, in part order.
    pub fn markers(&self) -> Vec<MarkerVisual> {
        self.hotspots
            .iter()
            .zip(&self.markers)
            .map(|(hotspot, anim)| {
                let hovered = self.hovered == Some(hotspot.index);
                let position =
                    hotspot.anchor + Vector2::new(anim.drift_x.sample(), anim.drift_y.sample());
                let appear = anim.entrance.sample();

                MarkerVisual {
                    index: hotspot.index,
                    number: hotspot.index + 1,
                    color: hotspot.part.color,
                    position,
                    opacity: appear,
                    scale: if hovered { appear * HOVER_SCALE } else { appear },
                    rotation: anim.wiggle.as_ref().map_or(0.0, Tween::sample),
                    glow: anim.glow.as_ref().map_or(0.0, Tween::sample),
                    tooltip: hovered.then(|| Tooltip {
                        label: hotspot.part.name.clone(),
                        color: hotspot.part.color,
                        connector: Connector {
                            from: Vector2::zeros(),
                            to: position,
                        },
                    }),
                }
            })
            .collect()
    }
}
