//! The animation timeline.
//!
//! Every animated property of the figure is a [`ChannelId`] holding one
//! scalar value and at most one active [`Tween`]. The [`Animator`] trait is
//! the seam between the visualization logic and whatever advances the
//! tweens; [`Timeline`] is the in-memory implementation.
//!
//! # Tween timing
//!
//! ```text
//!  delay   play 0      play 1      play 2
//! |-----|-----------|-----------|-----------|
//!        k0 ----> kN  kN ----> k0  k0 ----> kN     RepeatMode::Reverse
//!        k0 ----> kN  k0 ----> kN  k0 ----> kN     RepeatMode::Loop
//! ```
//!
//! `Repeat::Count(n)` means n extra plays after the first.

use crate::error::MotionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Easing curve applied to each play's normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Apply easing to a linear factor `t` in [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// How many times a tween plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    /// n extra plays after the first
    Count(u32),
    Infinite,
}

impl Repeat {
    /// Total number of plays, or `None` when infinite.
    pub fn plays(&self) -> Option<u64> {
        match self {
            Repeat::Count(n) => Some(*n as u64 + 1),
            Repeat::Infinite => None,
        }
    }
}

/// What a repeated play does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Restart from the first keyframe
    #[default]
    Loop,
    /// Alternate direction every play
    Reverse,
}

/// A time-based animation descriptor with its own playhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    keyframes: Vec<f64>,
    duration: f64,
    delay: f64,
    easing: Easing,
    repeat: Repeat,
    repeat_mode: RepeatMode,
    elapsed: f64,
}

impl Tween {
    /// Plays once through evenly spaced `keyframes` over `duration` seconds.
    pub fn keyframes(keyframes: impl Into<Vec<f64>>, duration: f64) -> Self {
        Self {
            keyframes: keyframes.into(),
            duration,
            delay: 0.0,
            easing: Easing::Linear,
            repeat: Repeat::Count(0),
            repeat_mode: RepeatMode::Loop,
            elapsed: 0.0,
        }
    }

    /// Plays once from `from` to `to`.
    pub fn to(from: f64, to: f64, duration: f64) -> Self {
        Self::keyframes(vec![from, to], duration)
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(mut self, secs: f64) -> Self {
        self.delay = secs;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Plays `n + 1` times, restarting each play.
    pub fn repeat_count(self, n: u32) -> Self {
        self.repeat(Repeat::Count(n))
    }

    /// Repeats forever, restarting each play.
    pub fn looping(mut self) -> Self {
        self.repeat = Repeat::Infinite;
        self.repeat_mode = RepeatMode::Loop;
        self
    }

    /// Repeats forever, alternating direction.
    pub fn mirrored(mut self) -> Self {
        self.repeat = Repeat::Infinite;
        self.repeat_mode = RepeatMode::Reverse;
        self
    }

    /// Checks the descriptor is playable.
    pub fn validate(&self) -> Result<(), MotionError> {
        if self.keyframes.is_empty() {
            return Err(MotionError::EmptyKeyframes);
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(MotionError::InvalidDuration(self.duration));
        }
        if !(self.delay.is_finite() && self.delay >= 0.0) {
            return Err(MotionError::InvalidDelay(self.delay));
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn repeat_policy(&self) -> Repeat {
        self.repeat
    }

    /// Delay plus every play, or `None` for infinite tweens.
    pub fn total_duration(&self) -> Option<f64> {
        self.repeat
            .plays()
            .map(|plays| self.delay + self.duration * plays as f64)
    }

    /// Seconds since the tween started, including the delay.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Moves the playhead forward. Returns true once finished.
    pub fn advance(&mut self, dt: f64) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        match self.total_duration() {
            Some(total) => self.elapsed >= total,
            None => false,
        }
    }

    /// Value at the current playhead.
    pub fn sample(&self) -> f64 {
        if self.keyframes.is_empty() {
            return 0.0;
        }
        if self.duration <= 0.0 || !self.duration.is_finite() {
            return self.keyframes[self.keyframes.len() - 1];
        }

        let active = (self.elapsed - self.delay).max(0.0);
        let (play, local) = match self.repeat.plays() {
            Some(plays) if active >= self.duration * plays as f64 => (plays - 1, 1.0),
            _ => {
                let play = (active / self.duration).floor();
                (play as u64, (active - play * self.duration) / self.duration)
            }
        };

        let progress = if self.repeat_mode == RepeatMode::Reverse && play % 2 == 1 {
            1.0 - local
        } else {
            local
        };

        interpolate(&self.keyframes, self.easing.apply(progress))
    }
}

/// Samples evenly spaced keyframes at progress `t` in [0, 1].
fn interpolate(keys: &[f64], t: f64) -> f64 {
    match keys.len() {
        0 => 0.0,
        1 => keys[0],
        n => {
            let pos = t.clamp(0.0, 1.0) * (n - 1) as f64;
            let i = (pos.floor() as usize).min(n - 2);
            let frac = pos - i as f64;
            keys[i] + (keys[i + 1] - keys[i]) * frac
        }
    }
}

/// Animated properties of the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    /// Vertical bob of the whole figure (px)
    BodyY,
    /// Uniform scale of the figure
    BodyScale,
    /// In-plane rotation of the figure (deg)
    BodyRotate,
    /// 3D tilt of the figure (deg)
    TiltX,
    TiltY,
    TiltZ,
    /// Chainring rotation (deg)
    Gear,
    /// Chain path offset in [0, 1]
    Chain,
    /// Wheel rotation (deg)
    Wheel,
    /// Fade-in of the figure, [0, 1]
    FigureOpacity,
    /// Bounce of the dot under the interaction hint (px)
    HintDot,
}

impl ChannelId {
    pub const ALL: [ChannelId; 11] = [
        ChannelId::BodyY,
        ChannelId::BodyScale,
        ChannelId::BodyRotate,
        ChannelId::TiltX,
        ChannelId::TiltY,
        ChannelId::TiltZ,
        ChannelId::Gear,
        ChannelId::Chain,
        ChannelId::Wheel,
        ChannelId::FigureOpacity,
        ChannelId::HintDot,
    ];

    /// Value the channel holds when nothing animates it.
    pub fn rest_value(&self) -> f64 {
        match self {
            ChannelId::BodyScale | ChannelId::FigureOpacity => 1.0,
            _ => 0.0,
        }
    }
}

/// Identifies one `start` call on a channel.
///
/// A newer generation on the same channel means the older tween was
/// cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

/// A finite tween that ended during `advance`.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub channel: ChannelId,
    pub generation: Generation,
    /// `Err` when the engine failed to play the sequence through
    pub result: Result<(), MotionError>,
}

/// The animation engine seam.
///
/// Cancelling (`start` over a running tween, `set`, `stop`) never produces a
/// completion for the cancelled tween.
pub trait Animator {
    /// Replaces whatever runs on `channel` with `tween`.
    fn start(&mut self, channel: ChannelId, tween: Tween) -> Result<Generation, MotionError>;

    /// Jumps `channel` to `value`, cancelling its tween.
    fn set(&mut self, channel: ChannelId, value: f64);

    /// Cancels the tween on `channel`, holding its current value.
    fn stop(&mut self, channel: ChannelId);

    /// Current value of `channel`.
    fn value(&self, channel: ChannelId) -> f64;

    /// True while a tween drives `channel`.
    fn is_running(&self, channel: ChannelId) -> bool;

    /// Advances every tween by `dt` seconds and reports finished ones in
    /// channel order.
    fn advance(&mut self, dt: f64) -> Vec<Completion>;
}

#[derive(Debug, Clone, Default)]
struct ChannelState {
    value: f64,
    active: Option<(Generation, Tween)>,
}

/// In-memory [`Animator`].
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    channels: BTreeMap<ChannelId, ChannelState>,
    next_generation: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the tween currently on `channel`.
    pub fn generation(&self, channel: ChannelId) -> Option<Generation> {
        self.channels
            .get(&channel)
            .and_then(|state| state.active.as_ref().map(|(generation, _)| *generation))
    }

    fn state_mut(&mut self, channel: ChannelId) -> &mut ChannelState {
        self.channels.entry(channel).or_insert_with(|| ChannelState {
            value: channel.rest_value(),
            active: None,
        })
    }
}

impl Animator for Timeline {
    fn start(&mut self, channel: ChannelId, tween: Tween) -> Result<Generation, MotionError> {
        tween.validate()?;

        self.next_generation += 1;
        let generation = Generation(self.next_generation);

        let state = self.state_mut(channel);
        state.value = tween.sample();
        state.active = Some((generation, tween));
        Ok(generation)
    }

    fn set(&mut self, channel: ChannelId, value: f64) {
        let state = self.state_mut(channel);
        state.value = value;
        state.active = None;
    }

    fn stop(&mut self, channel: ChannelId) {
        if let Some(state) = self.channels.get_mut(&channel) {
            state.active = None;
        }
    }

    fn value(&self, channel: ChannelId) -> f64 {
        self.channels
            .get(&channel)
            .map(|state| state.value)
            .unwrap_or_else(|| channel.rest_value())
    }

    fn is_running(&self, channel: ChannelId) -> bool {
        self.channels
            .get(&channel)
            .is_some_and(|state| state.active.is_some())
    }

    fn advance(&mut self, dt: f64) -> Vec<Completion> {
        let mut completions = Vec::new();

        for (channel, state) in self.channels.iter_mut() {
            let Some((generation, tween)) = state.active.as_mut() else {
                continue;
            };
            let finished = tween.advance(dt);
            state.value = tween.sample();

            if finished {
                completions.push(Completion {
                    channel: *channel,
                    generation: *generation,
                    result: Ok(()),
                });
                state.active = None;
            }
        }

        completions
    }
}
