//! Fault-injecting animation engine.
//!
//! [`FlakyAnimator`] wraps the in-memory [`Timeline`] and, on selected
//! channels, randomly rejects `start` calls and turns finished sequences into
//! engine faults.

use rand::{Rng, RngCore};
use spokeview_core::timeline::{Animator, ChannelId, Completion, Generation, Timeline, Tween};
use spokeview_core::MotionError;
use tracing::trace;

pub struct FlakyAnimator {
    inner: Timeline,
    rng: Box<dyn RngCore + Send>,

    /// Chance a finished sequence reports a fault instead
    failure_probability: f64,

    /// Chance a `start` is refused outright
    rejection_probability: f64,

    /// Channels subject to faults
    channels: Vec<ChannelId>,

    injected_failures: u64,
    rejected_starts: u64,
}

impl FlakyAnimator {
    /// Faults on the wheel and gear channels only.
    pub fn new(rng: Box<dyn RngCore + Send>, failure_probability: f64) -> Self {
        Self {
            inner: Timeline::new(),
            rng,
            failure_probability: failure_probability.clamp(0.0, 1.0),
            rejection_probability: 0.0,
            channels: vec![ChannelId::Wheel, ChannelId::Gear],
            injected_failures: 0,
            rejected_starts: 0,
        }
    }

    pub fn with_start_rejections(mut self, probability: f64) -> Self {
        self.rejection_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_channels(mut self, channels: Vec<ChannelId>) -> Self {
        self.channels = channels;
        self
    }

    pub fn injected_failures(&self) -> u64 {
        self.injected_failures
    }

    pub fn rejected_starts(&self) -> u64 {
        self.rejected_starts
    }

    pub fn timeline(&self) -> &Timeline {
        &self.inner
    }
}

impl Animator for FlakyAnimator {
    fn start(&mut self, channel: ChannelId, tween: Tween) -> Result<Generation, MotionError> {
        if self.channels.contains(&channel) && self.rng.gen_bool(self.rejection_probability) {
            self.rejected_starts += 1;
            trace!(?channel, "injected start rejection");
            return Err(MotionError::fault(channel, "start rejected by injected fault"));
        }
        self.inner.start(channel, tween)
    }

    fn set(&mut self, channel: ChannelId, value: f64) {
        self.inner.set(channel, value);
    }

    fn stop(&mut self, channel: ChannelId) {
        self.inner.stop(channel);
    }

    fn value(&self, channel: ChannelId) -> f64 {
        self.inner.value(channel)
    }

    fn is_running(&self, channel: ChannelId) -> bool {
        self.inner.is_running(channel)
    }

    fn advance(&mut self, dt: f64) -> Vec<Completion> {
        let mut completions = self.inner.advance(dt);
        for completion in &mut completions {
            if self.channels.contains(&completion.channel)
                && self.rng.gen_bool(self.failure_probability)
            {
                self.injected_failures += 1;
                trace!(channel = ?completion.channel, "injected sequence failure");
                completion.result = Err(MotionError::fault(completion.channel, "sequence interrupted"));
            }
        }
        completions
    }
}
