//! Mode-specific decorations layered over the figure.
//!
//! An [`Overlay`] owns its own timelines; replacing it on a mode change
//! drops them, so nothing from the previous mode keeps animating.

use crate::color::Rgba;
use crate::hotspots::{MarkerVisual, PartHotspotLayout};
use crate::mode::Mode;
use crate::part::Part;
use crate::timeline::Tween;
use serde::{Deserialize, Serialize};

const SPEED_LINE_COUNT: usize = 8;
const SPEED_LINE_SECS: f64 = 1.2;
const SPEED_LINE_STAGGER: f64 = 0.1;

pub const SPEED_BADGE: &str = "SPEED MODE";
pub const REPAIR_BADGE: &str = "REPAIR MODE";

/// One horizontal streak of the speed effect.
#[derive(Debug, Clone)]
pub struct SpeedLine {
    index: usize,
    scale_x: Tween,
    shift_x: Tween,
    opacity: Tween,
}

impl SpeedLine {
    fn new(index: usize) -> Self {
        let delay = index as f64 * SPEED_LINE_STAGGER;
        let line = |keys: Vec<f64>| Tween::keyframes(keys, SPEED_LINE_SECS).delay(delay).looping();
        Self {
            index,
            scale_x: line(vec![0.0, 1.0, 0.0]),
            shift_x: line(vec![100.0, -100.0]),
            opacity: line(vec![0.0, 0.8, 0.0]),
        }
    }

    fn advance(&mut self, dt: f64) {
        self.scale_x.advance(dt);
        self.shift_x.advance(dt);
        self.opacity.advance(dt);
    }

    fn visual(&self) -> SpeedLineVisual {
        SpeedLineVisual {
            top_percent: 30.0 + 5.0 * self.index as f64,
            scale_x: self.scale_x.sample(),
            x: self.shift_x.sample(),
            opacity: self.opacity.sample(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedLineVisual {
    pub top_percent: f64,
    pub scale_x: f64,
    pub x: f64,
    pub opacity: f64,
}

/// Color picker shown in customize mode.
#[derive(Debug, Clone)]
pub struct SwatchPalette {
    swatches: Vec<Rgba>,
    selected: Option<usize>,
}

impl SwatchPalette {
    pub fn new(swatches: Vec<Rgba>) -> Self {
        Self {
            swatches,
            selected: None,
        }
    }

    /// Selects swatch `index`. Returns false if out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.swatches.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_color(&self) -> Option<Rgba> {
        self.selected.map(|i| self.swatches[i])
    }

    pub fn swatches(&self) -> &[Rgba] {
        &self.swatches
    }
}

/// The active decoration set.
#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    Speed { lines: Vec<SpeedLine> },
    Customize { palette: SwatchPalette },
    Repair { layout: PartHotspotLayout },
}

impl Overlay {
    /// Fresh overlay for `mode`.
    pub fn for_mode(mode: Mode, parts: &[Part], hotspot_radius: f64) -> Self {
        match mode {
            Mode::Default => Overlay::None,
            Mode::Speed => Overlay::Speed {
                lines: (0..SPEED_LINE_COUNT).map(SpeedLine::new).collect(),
            },
            Mode::Customize => Overlay::Customize {
                palette: SwatchPalette::new(parts.iter().map(|p| p.color).collect()),
            },
            Mode::Repair => Overlay::Repair {
                layout: PartHotspotLayout::new(parts, hotspot_radius),
            },
        }
    }

    /// Mode this overlay belongs to.
    pub fn mode(&self) -> Mode {
        match self {
            Overlay::None => Mode::Default,
            Overlay::Speed { .. } => Mode::Speed,
            Overlay::Customize { .. } => Mode::Customize,
            Overlay::Repair { .. } => Mode::Repair,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        match self {
            Overlay::None | Overlay::Customize { .. } => {}
            Overlay::Speed { lines } => lines.iter_mut().for_each(|line| line.advance(dt)),
            Overlay::Repair { layout } => layout.advance(dt),
        }
    }

    pub fn layout_mut(&mut self) -> Option<&mut PartHotspotLayout> {
        match self {
            Overlay::Repair { layout } => Some(layout),
            _ => None,
        }
    }

    pub fn palette_mut(&mut self) -> Option<&mut SwatchPalette> {
        match self {
            Overlay::Customize { palette } => Some(palette),
            _ => None,
        }
    }

    pub fn palette(&self) -> Option<&SwatchPalette> {
        match self {
            Overlay::Customize { palette } => Some(palette),
            _ => None,
        }
    }

    pub fn layout(&self) -> Option<&PartHotspotLayout> {
        match self {
            Overlay::Repair { layout } => Some(layout),
            _ => None,
        }
    }

    /// Render description for this frame.
    pub fn visual(&self) -> OverlayVisual {
        match self {
            Overlay::None => OverlayVisual::None,
            Overlay::Speed { lines } => OverlayVisual::Speed {
                lines: lines.iter().map(SpeedLine::visual).collect(),
                badge: SPEED_BADGE.to_string(),
            },
            Overlay::Customize { palette } => OverlayVisual::Customize {
                swatches: palette.swatches().to_vec(),
                selected: palette.selected(),
            },
            Overlay::Repair { layout } => OverlayVisual::Repair {
                markers: layout.markers(),
                badge: REPAIR_BADGE.to_string(),
            },
        }
    }
}

/// Serializable overlay state for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayVisual {
    None,
    Speed {
        lines: Vec<SpeedLineVisual>,
        badge: String,
    },
    Customize {
        swatches: Vec<Rgba>,
        selected: Option<usize>,
    },
    Repair {
        markers: Vec<MarkerVisual>,
        badge: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::default_parts;
    use approx::assert_relative_eq;

    #[test]
    fn test_overlay_matches_mode() {
        for mode in Mode::all() {
            assert_eq!(Overlay::for_mode(mode, &default_parts(), 110.0).mode(), mode);
        }
    }

    #[test]
    fn test_speed_lines_staggered() {
        let mut overlay = Overlay::for_mode(Mode::Speed, &default_parts(), 110.0);
        overlay.advance(0.6);

        let OverlayVisual::Speed { lines, badge } = overlay.visual() else {
            panic!("expected speed overlay");
        };
        assert_eq!(badge, SPEED_BADGE);
        assert_eq!(lines.len(), 8);
        assert_relative_eq!(lines[0].top_percent, 30.0);
        assert_relative_eq!(lines[7].top_percent, 65.0);
        // Line 0 is half way through its first play, line 7 has not started
        assert_relative_eq!(lines[0].scale_x, 1.0);
        assert_relative_eq!(lines[0].x, 0.0, epsilon = 1e-9);
        assert_eq!(lines[7].opacity, 0.0);
        assert!(lines[1].opacity > 0.0);
    }

    #[test]
    fn test_swatch_selection() {
        let mut overlay = Overlay::for_mode(Mode::Customize, &default_parts(), 110.0);
        let palette = overlay.palette_mut().unwrap();
        assert!(!palette.select(9));
        assert!(palette.select(1));
        assert_eq!(palette.selected_color(), Some(default_parts()[1].color));
        assert!(overlay.layout_mut().is_none());
    }

    #[test]
    fn test_overlay_visual_json_tag() {
        let json = serde_json::to_value(OverlayVisual::None).unwrap();
        assert_eq!(json["kind"], "none");
    }
}
