//! Interaction modes and the overlay flags they drive.

use crate::error::ModeParseError;
use serde::{Deserialize, Serialize};

/// The externally controlled interaction mode.
///
/// Owned by the parent; the visualization only reacts to changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Gentle idle bob, no overlay
    #[default]
    Default,

    /// Speed lines, glow, accelerated wheel and gear
    Speed,

    /// Slow 3-axis tilt and the color swatch palette
    Customize,

    /// Part hotspots with hover tooltips
    Repair,
}

impl Mode {
    /// Returns all modes.
    pub fn all() -> [Mode; 4] {
        [Mode::Default, Mode::Speed, Mode::Customize, Mode::Repair]
    }

    /// Returns the mode name.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Speed => "speed",
            Mode::Customize => "customize",
            Mode::Repair => "repair",
        }
    }

    /// Returns the top indicator label, if the mode shows one.
    ///
    /// Repair mode shows its own badge instead.
    pub fn indicator(&self) -> Option<&'static str> {
        match self {
            Mode::Speed => Some("Super-charged mode"),
            Mode::Customize => Some("Customization mode"),
            Mode::Default | Mode::Repair => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Mode::Default),
            "speed" => Ok(Mode::Speed),
            "customize" => Ok(Mode::Customize),
            "repair" => Ok(Mode::Repair),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

/// Which mode-specific overlay is active.
///
/// At most one flag is ever set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlayFlags {
    pub speed_active: bool,
    pub customize_active: bool,
    pub repair_active: bool,
}

impl OverlayFlags {
    /// Flags for `mode`: the matching one set, or none for default.
    pub fn for_mode(mode: Mode) -> Self {
        let mut flags = Self::default();
        match mode {
            Mode::Default => {}
            Mode::Speed => flags.speed_active = true,
            Mode::Customize => flags.customize_active = true,
            Mode::Repair => flags.repair_active = true,
        }
        flags
    }

    /// Number of flags set.
    pub fn active_count(&self) -> usize {
        [self.speed_active, self.customize_active, self.repair_active]
            .iter()
            .filter(|f| **f)
            .count()
    }
}
