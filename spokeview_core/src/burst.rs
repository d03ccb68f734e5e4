//! Click-triggered spin bursts.
//!
//! A burst is a short accelerated rotation followed by a hand-back:
//!
//! ```text
//! wheel:  Spinning(a -> a + 360, xN) --> Settling(-> 0) --> rest
//! gear:   Spinning(a -> a + 360, xN) --> baseline loop from where it stopped
//! ```
//!
//! Spins start from the element's current angle `a` (taken mod 360), so the
//! gear never jumps when a burst takes over its loop or hands it back.
//!
//! All bursts share one "animating" flag; a burst is active until every
//! element in it has reached rest.

use crate::mode::Mode;
use crate::timeline::{ChannelId, Easing, Generation, Tween};
use serde::{Deserialize, Serialize};

/// Seconds for the wheel to turn back to 0 deg after a spin
pub const WHEEL_SETTLE_SECS: f64 = 0.3;

/// Period of the always-on gear and chain loops
pub const BASELINE_PERIOD_SECS: f64 = 10.0;

/// Element a burst spins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurstKind {
    Wheel,
    Gear,
}

impl BurstKind {
    pub fn channel(&self) -> ChannelId {
        match self {
            BurstKind::Wheel => ChannelId::Wheel,
            BurstKind::Gear => ChannelId::Gear,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BurstKind::Wheel => "wheel",
            BurstKind::Gear => "gear",
        }
    }
}

/// What started a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstOrigin {
    /// Wheel or gear click
    Click,
    /// Entering speed mode
    ModeEntry,
}

/// Result of a spin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstOutcome {
    /// A burst sequence began
    Started,
    /// Another burst was running; nothing happened
    Ignored,
}

/// Speed and length of the accelerated spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstPlan {
    /// Seconds per revolution
    pub duration: f64,
    /// Extra revolutions after the first
    pub repeats: u32,
}

impl BurstPlan {
    pub fn for_mode(kind: BurstKind, mode: Mode) -> Self {
        let fast = mode == Mode::Speed;
        match (kind, fast) {
            (BurstKind::Wheel, true) => Self { duration: 0.5, repeats: 10 },
            (BurstKind::Wheel, false) => Self { duration: 2.0, repeats: 3 },
            (BurstKind::Gear, true) => Self { duration: 0.8, repeats: 8 },
            (BurstKind::Gear, false) => Self { duration: 2.0, repeats: 2 },
        }
    }

    /// The accelerated spin starting at `from` degrees.
    pub fn tween(&self, from: f64) -> Tween {
        let from = normalize_angle(from);
        Tween::to(from, from + 360.0, self.duration).repeat_count(self.repeats)
    }

    pub fn total_secs(&self) -> f64 {
        self.duration * (self.repeats as f64 + 1.0)
    }
}

/// The continuous gear rotation, one turn per period starting at `from`.
pub fn gear_baseline(from: f64) -> Tween {
    let from = normalize_angle(from);
    Tween::to(from, from + 360.0, BASELINE_PERIOD_SECS).looping()
}

/// Angle folded into [0, 360); non-finite input folds to 0.
pub fn normalize_angle(degrees: f64) -> f64 {
    if degrees.is_finite() {
        degrees.rem_euclid(360.0)
    } else {
        0.0
    }
}

/// The continuous chain path offset.
pub fn chain_baseline() -> Tween {
    Tween::to(0.0, 1.0, BASELINE_PERIOD_SECS).looping()
}

/// Wheel turn back to rest from `from` degrees.
pub fn wheel_settle(from: f64) -> Tween {
    Tween::to(from, 0.0, WHEEL_SETTLE_SECS).ease(Easing::EaseOut)
}

/// Where one element of a burst is in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BurstStage {
    Spinning(Generation),
    Settling(Generation),
}

impl BurstStage {
    pub(crate) fn generation(&self) -> Generation {
        match self {
            BurstStage::Spinning(g) | BurstStage::Settling(g) => *g,
        }
    }
}

/// The burst holding the animating flag.
#[derive(Debug, Clone)]
pub(crate) struct ActiveBurst {
    pub(crate) origin: BurstOrigin,
    pub(crate) wheel: Option<BurstStage>,
    pub(crate) gear: Option<BurstStage>,
}

impl ActiveBurst {
    pub(crate) fn new(origin: BurstOrigin) -> Self {
        Self {
            origin,
            wheel: None,
            gear: None,
        }
    }

    pub(crate) fn stage(&self, kind: BurstKind) -> Option<BurstStage> {
        match kind {
            BurstKind::Wheel => self.wheel,
            BurstKind::Gear => self.gear,
        }
    }

    pub(crate) fn set_stage(&mut self, kind: BurstKind, stage: Option<BurstStage>) {
        match kind {
            BurstKind::Wheel => self.wheel = stage,
            BurstKind::Gear => self.gear = stage,
        }
    }

    /// Element whose current stage is `generation` on `channel`.
    pub(crate) fn owner(&self, channel: ChannelId, generation: Generation) -> Option<BurstKind> {
        [BurstKind::Wheel, BurstKind::Gear].into_iter().find(|kind| {
            kind.channel() == channel
                && self
                    .stage(*kind)
                    .is_some_and(|stage| stage.generation() == generation)
        })
    }

    pub(crate) fn is_done(&self) -> bool {
        self.wheel.is_none() && self.gear.is_none()
    }
}

/// Burst counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstStats {
    pub started: u64,
    pub ignored: u64,
    pub completed: u64,
    /// Element sequences that failed and were reset to rest
    pub failed: u64,
    /// Bursts cut short by a mode change
    pub cancelled: u64,
}
