//! The interactive mode visualization.
//!
//! [`VisualizationCore`] owns every piece of transient state: the animation
//! channels, the particle arena, the mode overlay and the burst guard. The
//! parent pushes in mode changes, pointer offsets and clicks, then calls
//! [`VisualizationCore::tick`] once per frame and draws
//! [`VisualizationCore::frame`].
//!
//! # Mode change
//!
//! ```text
//! set_mode(B)
//!   |- cancel burst         (wheel -> 0 deg, gear -> baseline, flag cleared)
//!   |- reset mode channels  (scale 1, rotate 0, tilt 0)
//!   |- drop particles
//!   |- flags/overlay for B  (old overlay timelines dropped)
//!   '- start B's loops
//! ```
//!
//! Gear rotation and chain offset loops are started once and survive every
//! mode change.

use crate::burst::{
    chain_baseline, gear_baseline, wheel_settle, ActiveBurst, BurstKind, BurstOrigin,
    BurstOutcome, BurstPlan, BurstStage, BurstStats,
};
use crate::color::Rgba;
use crate::config::VisualizationConfig;
use crate::controller::{PositionController, VizCommand};
use crate::error::{ConfigError, MotionError};
use crate::frame::{BodyPose, Frame, WheelStyle, INTERACTION_HINT};
use crate::mode::{Mode, OverlayFlags};
use crate::overlay::Overlay;
use crate::part::{parts_or_default, Part};
use crate::particles::ParticleTrailEmitter;
use crate::timeline::{Animator, ChannelId, Completion, Easing, Timeline, Tween};
use nalgebra::Vector2;
use rand::RngCore;
use tracing::{debug, trace, warn};

/// Channels owned by the current mode; reset on every mode change.
const MODE_CHANNELS: [ChannelId; 5] = [
    ChannelId::BodyScale,
    ChannelId::BodyRotate,
    ChannelId::TiltX,
    ChannelId::TiltY,
    ChannelId::TiltZ,
];

fn bob(period: f64) -> Tween {
    Tween::keyframes([0.0, -10.0, 0.0], period)
        .ease(Easing::EaseInOut)
        .mirrored()
}

/// Figure fades in once, half a second after mounting.
fn figure_fade_in() -> Tween {
    Tween::to(0.0, 1.0, 1.0).delay(0.5)
}

fn hint_bounce() -> Tween {
    Tween::keyframes([0.0, 5.0, 0.0], 1.5).looping()
}

fn tilt(peak: f64) -> Tween {
    Tween::keyframes([0.0, peak, 0.0], 8.0)
        .ease(Easing::EaseInOut)
        .mirrored()
}

/// Headless bicycle visualization driven by mode, pointer and clicks.
pub struct VisualizationCore<A: Animator = Timeline> {
    config: VisualizationConfig,
    parts: Vec<Part>,
    mode: Mode,
    flags: OverlayFlags,
    animator: A,
    rng: Box<dyn RngCore + Send>,
    particles: ParticleTrailEmitter,
    overlay: Overlay,
    burst: Option<ActiveBurst>,
    burst_stats: BurstStats,
    content_offset: Vector2<f64>,
    mounted: bool,
    frame_index: u64,
    elapsed: f64,
    mode_switches: u64,
}

impl VisualizationCore<Timeline> {
    /// Creates a mounted visualization in default mode.
    ///
    /// `parts` falls back to the five default parts. All randomness comes
    /// from `rng`.
    pub fn new(
        config: VisualizationConfig,
        parts: Option<Vec<Part>>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self, ConfigError> {
        Self::with_animator(config, parts, rng, Timeline::new())
    }
}

impl<A: Animator> VisualizationCore<A> {
    /// Creates a visualization on a custom animation engine.
    pub fn with_animator(
        config: VisualizationConfig,
        parts: Option<Vec<Part>>,
        rng: Box<dyn RngCore + Send>,
        animator: A,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let center = Vector2::new(config.viewport_width / 2.0, config.viewport_height / 2.0);
        let particles = ParticleTrailEmitter::new(config.particles.clone(), center);

        let mut core = Self {
            config,
            parts: parts_or_default(parts),
            mode: Mode::Default,
            flags: OverlayFlags::default(),
            animator,
            rng,
            particles,
            overlay: Overlay::None,
            burst: None,
            burst_stats: BurstStats::default(),
            content_offset: Vector2::zeros(),
            mounted: true,
            frame_index: 0,
            elapsed: 0.0,
            mode_switches: 0,
        };

        core.start_loop(ChannelId::Gear, gear_baseline(0.0));
        core.start_loop(ChannelId::Chain, chain_baseline());
        core.start_loop(ChannelId::FigureOpacity, figure_fade_in());
        core.start_loop(ChannelId::HintDot, hint_bounce());
        core.enter_mode(Mode::Default);
        Ok(core)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Switches mode. Same mode is a no-op.
    pub fn set_mode(&mut self, mode: Mode) {
        if !self.mounted {
            trace!(mode = %mode, "set_mode ignored, unmounted");
            return;
        }
        if mode == self.mode {
            return;
        }
        self.mode_switches += 1;
        self.enter_mode(mode);
    }

    /// Wheel click.
    pub fn spin_wheel(&mut self) -> BurstOutcome {
        self.click_burst(BurstKind::Wheel)
    }

    /// Gear click.
    pub fn spin_gears(&mut self) -> BurstOutcome {
        self.click_burst(BurstKind::Gear)
    }

    /// Pointer entered part marker `index` (repair mode only).
    pub fn hover_part(&mut self, index: usize) -> bool {
        self.mounted && self.overlay.layout_mut().is_some_and(|layout| layout.hover(index))
    }

    /// Pointer left part marker `index`.
    pub fn unhover_part(&mut self, index: usize) -> bool {
        self.mounted && self.overlay.layout_mut().is_some_and(|layout| layout.unhover(index))
    }

    /// Picks a color swatch (customize mode only).
    pub fn select_swatch(&mut self, index: usize) -> bool {
        self.mounted && self.overlay.palette_mut().is_some_and(|palette| palette.select(index))
    }

    /// Applies one scripted command. Returns whether it had an effect.
    pub fn apply(&mut self, command: &VizCommand) -> bool {
        match command {
            VizCommand::SetMode { mode } => {
                let before = self.mode_switches;
                self.set_mode(*mode);
                self.mode_switches != before
            }
            VizCommand::UpdatePosition { x, y } => {
                let before = self.content_offset;
                self.update_position(*x, *y);
                self.content_offset != before
            }
            VizCommand::SpinWheel => self.spin_wheel() == BurstOutcome::Started,
            VizCommand::SpinGears => self.spin_gears() == BurstOutcome::Started,
            VizCommand::HoverPart { index } => self.hover_part(*index),
            VizCommand::UnhoverPart { index } => self.unhover_part(*index),
            VizCommand::SelectSwatch { index } => self.select_swatch(*index),
        }
    }

    /// Advances every animation by `dt` seconds and ages particles one frame.
    pub fn tick(&mut self, dt: f64) {
        if !self.mounted || !(dt.is_finite() && dt >= 0.0) {
            return;
        }

        for completion in self.animator.advance(dt) {
            self.on_completion(completion);
        }
        self.overlay.advance(dt);
        self.particles.step();

        self.elapsed += dt;
        self.frame_index += 1;
    }

    /// One tick at the configured frame rate.
    pub fn tick_frame(&mut self) {
        self.tick(self.config.frame_rate.dt_secs());
    }

    /// Tears everything down. Later commands are no-ops.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.cancel_burst();
        self.particles.clear();
        for channel in ChannelId::ALL {
            self.animator.stop(channel);
        }
        self.mounted = false;
        debug!("visualization unmounted");
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn flags(&self) -> OverlayFlags {
        self.flags
    }

    /// The shared burst guard.
    pub fn is_animating(&self) -> bool {
        self.burst.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn config(&self) -> &VisualizationConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleTrailEmitter {
        &self.particles
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    pub fn burst_stats(&self) -> BurstStats {
        self.burst_stats
    }

    pub fn mode_switches(&self) -> u64 {
        self.mode_switches
    }

    pub fn content_offset(&self) -> Vector2<f64> {
        self.content_offset
    }

    pub fn hovered_part(&self) -> Option<usize> {
        self.overlay.layout().and_then(|layout| layout.hovered())
    }

    pub fn selected_color(&self) -> Option<Rgba> {
        self.overlay.palette().and_then(|palette| palette.selected_color())
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Render description of the current state.
    pub fn frame(&self) -> Frame {
        let value = |channel| self.animator.value(channel);
        Frame {
            index: self.frame_index,
            time_sec: self.elapsed,
            mode: self.mode,
            flags: self.flags,
            animating: self.is_animating(),
            content_offset: [self.content_offset.x, self.content_offset.y],
            body: BodyPose {
                y: value(ChannelId::BodyY),
                scale: value(ChannelId::BodyScale),
                rotate: value(ChannelId::BodyRotate),
                tilt_x: value(ChannelId::TiltX),
                tilt_y: value(ChannelId::TiltY),
                tilt_z: value(ChannelId::TiltZ),
                glow: self.flags.speed_active,
            },
            figure_opacity: value(ChannelId::FigureOpacity),
            gear_angle: value(ChannelId::Gear),
            chain_offset: value(ChannelId::Chain),
            wheel_angle: value(ChannelId::Wheel),
            wheel: WheelStyle::for_mode(self.mode),
            particles: self.particles.iter().cloned().collect(),
            overlay: self.overlay.visual(),
            indicator: self.mode.indicator().map(str::to_string),
            hint: INTERACTION_HINT.to_string(),
            hint_dot_y: value(ChannelId::HintDot),
        }
    }

    // ------------------------------------------------------------------
    // Mode loops
    // ------------------------------------------------------------------

    fn enter_mode(&mut self, mode: Mode) {
        self.cancel_burst();
        for channel in MODE_CHANNELS {
            self.animator.set(channel, channel.rest_value());
        }
        let dropped = self.particles.clear();

        self.mode = mode;
        self.flags = OverlayFlags::for_mode(mode);
        self.overlay = Overlay::for_mode(mode, &self.parts, self.config.hotspot_radius);
        debug!(mode = %mode, dropped_particles = dropped, "mode entered");

        match mode {
            Mode::Default => {
                self.start_loop(ChannelId::BodyY, bob(4.0));
            }
            Mode::Speed => {
                self.start_loop(ChannelId::BodyY, bob(1.5));
                self.start_loop(ChannelId::BodyScale, Tween::keyframes([1.0, 1.1, 1.0], 0.6));
                self.begin_burst(&[BurstKind::Wheel, BurstKind::Gear], BurstOrigin::ModeEntry);
            }
            Mode::Customize => {
                self.start_loop(ChannelId::BodyY, bob(6.0));
                self.start_loop(ChannelId::TiltX, tilt(5.0));
                self.start_loop(ChannelId::TiltY, tilt(8.0));
                self.start_loop(ChannelId::TiltZ, tilt(3.0));
                self.start_loop(
                    ChannelId::BodyRotate,
                    Tween::keyframes([0.0, 5.0, -5.0, 0.0], 1.5),
                );
                self.start_loop(ChannelId::BodyScale, Tween::keyframes([1.0, 1.05, 1.0], 1.5));
            }
            Mode::Repair => {
                self.start_loop(ChannelId::BodyY, bob(4.0));
                self.start_loop(
                    ChannelId::BodyScale,
                    Tween::keyframes([1.0, 1.03, 1.0], 3.0)
                        .ease(Easing::EaseInOut)
                        .mirrored(),
                );
            }
        }
    }

    /// Starts a non-burst animation; on failure the channel rests.
    fn start_loop(&mut self, channel: ChannelId, tween: Tween) {
        if let Err(err) = self.animator.start(channel, tween) {
            warn!(?channel, error = %err, "animation loop failed to start");
            self.animator.set(channel, channel.rest_value());
        }
    }

    // ------------------------------------------------------------------
    // Bursts
    // ------------------------------------------------------------------

    fn click_burst(&mut self, kind: BurstKind) -> BurstOutcome {
        if !self.mounted {
            trace!(element = kind.name(), "spin ignored, unmounted");
            return BurstOutcome::Ignored;
        }
        self.begin_burst(&[kind], BurstOrigin::Click)
    }

    fn begin_burst(&mut self, kinds: &[BurstKind], origin: BurstOrigin) -> BurstOutcome {
        if self.burst.is_some() {
            self.burst_stats.ignored += 1;
            trace!(?origin, "burst ignored, already animating");
            return BurstOutcome::Ignored;
        }

        self.burst_stats.started += 1;
        let mut burst = ActiveBurst::new(origin);
        for &kind in kinds {
            let plan = BurstPlan::for_mode(kind, self.mode);
            let from = self.animator.value(kind.channel());
            match self.animator.start(kind.channel(), plan.tween(from)) {
                Ok(generation) => {
                    burst.set_stage(kind, Some(BurstStage::Spinning(generation)));
                }
                Err(err) => self.fail_element(kind, &err),
            }
        }

        if burst.is_done() {
            self.burst_stats.completed += 1;
        } else {
            debug!(?origin, mode = %self.mode, "burst started");
            self.burst = Some(burst);
        }
        BurstOutcome::Started
    }

    fn on_completion(&mut self, completion: Completion) {
        let Some(mut burst) = self.burst.take() else {
            return;
        };

        if let Some(kind) = burst.owner(completion.channel, completion.generation) {
            let next = match (completion.result, burst.stage(kind)) {
                (Err(err), _) => {
                    self.fail_element(kind, &err);
                    None
                }
                (Ok(()), Some(BurstStage::Spinning(_))) => self.hand_back(kind),
                (Ok(()), _) => {
                    // Settle finished
                    self.animator.set(kind.channel(), 0.0);
                    None
                }
            };
            burst.set_stage(kind, next);
        }

        if burst.is_done() {
            self.burst_stats.completed += 1;
            debug!(origin = ?burst.origin, "burst finished");
        } else {
            self.burst = Some(burst);
        }
    }

    /// Next stage after the accelerated spin.
    fn hand_back(&mut self, kind: BurstKind) -> Option<BurstStage> {
        let next = match kind {
            BurstKind::Wheel => {
                let from = self.animator.value(ChannelId::Wheel);
                self.animator
                    .start(ChannelId::Wheel, wheel_settle(from))
                    .map(|generation| Some(BurstStage::Settling(generation)))
            }
            BurstKind::Gear => {
                let from = self.animator.value(ChannelId::Gear);
                self.animator.start(ChannelId::Gear, gear_baseline(from)).map(|_| None)
            }
        };

        next.unwrap_or_else(|err| {
            self.fail_element(kind, &err);
            None
        })
    }

    fn fail_element(&mut self, kind: BurstKind, err: &MotionError) {
        warn!(element = kind.name(), error = %err, "burst failed, resetting to rest");
        self.burst_stats.failed += 1;
        self.rest_element(kind);
    }

    /// Wheel back to 0 deg; gear back on its baseline loop.
    fn rest_element(&mut self, kind: BurstKind) {
        match kind {
            BurstKind::Wheel => self.animator.set(ChannelId::Wheel, 0.0),
            BurstKind::Gear => {
                let from = self.animator.value(ChannelId::Gear);
                if let Err(err) = self.animator.start(ChannelId::Gear, gear_baseline(from)) {
                    warn!(error = %err, "gear baseline failed to restart");
                    self.animator.set(ChannelId::Gear, 0.0);
                }
            }
        }
    }

    fn cancel_burst(&mut self) {
        let Some(burst) = self.burst.take() else {
            return;
        };
        for kind in [BurstKind::Wheel, BurstKind::Gear] {
            if burst.stage(kind).is_some() {
                self.rest_element(kind);
            }
        }
        self.burst_stats.cancelled += 1;
        debug!(origin = ?burst.origin, "burst cancelled");
    }
}

impl<A: Animator> PositionController for VisualizationCore<A> {
    fn update_position(&mut self, offset_x: f64, offset_y: f64) {
        if !self.mounted {
            trace!("update_position ignored, unmounted");
            return;
        }
        if !(offset_x.is_finite() && offset_y.is_finite()) {
            trace!(offset_x, offset_y, "update_position ignored, non-finite offset");
            return;
        }

        let offset = Vector2::new(offset_x, offset_y);
        self.content_offset = offset;
        self.particles.emit(offset, self.mode, &mut *self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticleConfig;
    use crate::overlay::OverlayVisual;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    const DT: f64 = 1.0 / 60.0;

    fn rng(seed: u64) -> Box<dyn RngCore + Send> {
        Box::new(ChaCha8Rng::seed_from_u64(seed))
    }

    fn core() -> VisualizationCore {
        VisualizationCore::new(VisualizationConfig::default(), None, rng(42)).unwrap()
    }

    fn eager_core() -> VisualizationCore {
        let config = VisualizationConfig {
            particles: ParticleConfig {
                spawn_probability: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        VisualizationCore::new(config, None, rng(42)).unwrap()
    }

    fn run_for<A: Animator>(core: &mut VisualizationCore<A>, secs: f64) {
        for _ in 0..(secs / DT).round() as usize {
            core.tick(DT);
        }
    }

    /// Timeline that rejects or fails sequences on demand.
    #[derive(Default)]
    struct FaultyTimeline {
        inner: Timeline,
        starts: BTreeMap<ChannelId, usize>,
        /// Reject the n-th (1-based) and later starts on a channel
        reject_from: Option<(ChannelId, usize)>,
        /// Completions on these channels carry an engine fault
        fail_completions: Vec<ChannelId>,
    }

    impl Animator for FaultyTimeline {
        fn start(&mut self, channel: ChannelId, tween: Tween) -> Result<crate::timeline::Generation, MotionError> {
            let count = self.starts.entry(channel).or_default();
            *count += 1;
            if let Some((ch, n)) = self.reject_from {
                if ch == channel && *count >= n {
                    return Err(MotionError::fault(channel, "start rejected"));
                }
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
                if self.fail_completions.contains(&completion.channel) {
                    completion.result = Err(MotionError::fault(completion.channel, "dropped"));
                }
            }
            completions
        }
    }

    fn faulty_core() -> VisualizationCore<FaultyTimeline> {
        VisualizationCore::with_animator(
            VisualizationConfig::default(),
            None,
            rng(7),
            FaultyTimeline::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_starts_in_default_mode() {
        let core = core();
        assert_eq!(core.mode(), Mode::Default);
        assert_eq!(core.flags(), OverlayFlags::default());
        assert!(!core.is_animating());
        assert_eq!(core.parts().len(), 5);
        assert!(core.animator().is_running(ChannelId::Gear));
        assert!(core.animator().is_running(ChannelId::Chain));
        assert!(core.animator().is_running(ChannelId::BodyY));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VisualizationConfig {
            hotspot_radius: f64::NAN,
            ..Default::default()
        };
        assert!(VisualizationCore::new(config, None, rng(1)).is_err());
    }

    #[test]
    fn test_exactly_one_flag_after_every_transition() {
        for from in Mode::all() {
            for to in Mode::all() {
                if from == to {
                    continue;
                }
                let mut core = core();
                core.set_mode(from);
                run_for(&mut core, 0.5);
                core.set_mode(to);

                assert_eq!(core.flags(), OverlayFlags::for_mode(to), "{from} -> {to}");
                assert_eq!(core.overlay().mode(), to);
                let expected = usize::from(to != Mode::Default);
                assert_eq!(core.flags().active_count(), expected);
            }
        }
    }

    #[test]
    fn test_same_mode_is_noop() {
        let mut core = core();
        core.spin_wheel();
        core.set_mode(Mode::Default);
        assert!(core.is_animating());
        assert_eq!(core.mode_switches(), 0);
    }

    #[test]
    fn test_spin_ignored_while_animating() {
        let mut core = core();
        assert_eq!(core.spin_wheel(), BurstOutcome::Started);
        assert!(core.is_animating());

        assert_eq!(core.spin_gears(), BurstOutcome::Ignored);
        assert_eq!(core.spin_wheel(), BurstOutcome::Ignored);
        assert!(core.is_animating());

        let stats = core.burst_stats();
        assert_eq!(stats.started, 1);
        assert_eq!(stats.ignored, 2);
        // The gear click did not interrupt its baseline loop
        assert!(core.animator().is_running(ChannelId::Gear));
    }

    #[test]
    fn test_wheel_burst_settles_to_rest() {
        let mut core = core();
        core.spin_wheel();

        run_for(&mut core, 4.0);
        assert!(core.is_animating());
        let angle = core.frame().wheel_angle;
        assert!((0.0..=360.0).contains(&angle));

        // 2 s x 4 plays + 0.3 s settle
        run_for(&mut core, 4.5);
        assert!(!core.is_animating());
        assert_eq!(core.frame().wheel_angle, 0.0);
        assert_eq!(core.burst_stats().completed, 1);
        assert_eq!(core.burst_stats().failed, 0);

        assert_eq!(core.spin_wheel(), BurstOutcome::Started);
    }

    #[test]
    fn test_gear_burst_returns_to_baseline() {
        let mut core = core();
        core.spin_gears();
        run_for(&mut core, 6.5);

        assert!(!core.is_animating());
        assert!(core.animator().is_running(ChannelId::Gear));
        assert_eq!(core.burst_stats().completed, 1);
    }

    #[test]
    fn test_gear_angle_continuous_across_burst() {
        let mut core = core();
        run_for(&mut core, 3.0);
        let before = core.frame().gear_angle;
        assert_relative_eq!(before, 108.0, epsilon = 1e-6);

        core.spin_gears();
        assert_relative_eq!(core.frame().gear_angle, before, epsilon = 1e-9);

        // Never more than one frame's worth of turn, through the spin and the hand-back
        let mut last = core.frame().gear_angle;
        for _ in 0..480 {
            core.tick(DT);
            let angle = core.frame().gear_angle;
            let step = (angle - last).rem_euclid(360.0);
            assert!(step < 4.0, "gear jumped {step} deg");
            last = angle;
        }
        assert!(!core.is_animating());
    }

    #[test]
    fn test_gear_angle_kept_when_mode_change_cancels_burst() {
        let mut core = core();
        run_for(&mut core, 3.0);
        core.spin_gears();
        run_for(&mut core, 1.0);

        let mid_burst = core.frame().gear_angle;
        assert!(core.is_animating());
        core.set_mode(Mode::Repair);

        assert!(!core.is_animating());
        assert!(core.animator().is_running(ChannelId::Gear));
        assert_relative_eq!(
            core.frame().gear_angle,
            crate::burst::normalize_angle(mid_burst),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_failed_wheel_sequence_resets() {
        let mut core = faulty_core();
        core.animator_mut().fail_completions.push(ChannelId::Wheel);

        assert_eq!(core.spin_wheel(), BurstOutcome::Started);
        run_for(&mut core, 8.5);

        assert!(!core.is_animating());
        assert_eq!(core.frame().wheel_angle, 0.0);
        assert_eq!(core.burst_stats().failed, 1);
    }

    #[test]
    fn test_rejected_settle_resets() {
        let mut core = faulty_core();
        // First wheel start (the spin) succeeds, the settle is rejected
        core.animator_mut().reject_from = Some((ChannelId::Wheel, 2));

        core.spin_wheel();
        run_for(&mut core, 8.5);

        assert!(!core.is_animating());
        assert_eq!(core.frame().wheel_angle, 0.0);
        assert_eq!(core.burst_stats().failed, 1);
    }

    #[test]
    fn test_rejected_spin_never_sets_flag() {
        let mut core = faulty_core();
        core.animator_mut().reject_from = Some((ChannelId::Wheel, 1));

        assert_eq!(core.spin_wheel(), BurstOutcome::Started);
        assert!(!core.is_animating());
        assert_eq!(core.frame().wheel_angle, 0.0);
        assert_eq!(core.burst_stats().failed, 1);
    }

    #[test]
    fn test_failed_gear_sequence_restarts_baseline() {
        let mut core = faulty_core();
        core.animator_mut().fail_completions.push(ChannelId::Gear);

        core.spin_gears();
        run_for(&mut core, 6.5);

        assert!(!core.is_animating());
        assert!(core.animator().is_running(ChannelId::Gear));
        assert_eq!(core.burst_stats().failed, 1);
    }

    #[test]
    fn test_mode_change_cancels_burst() {
        let mut core = core();
        core.spin_wheel();
        run_for(&mut core, 1.0);
        assert!(core.frame().wheel_angle > 0.0);

        core.set_mode(Mode::Repair);
        assert!(!core.is_animating());
        assert_eq!(core.frame().wheel_angle, 0.0);
        assert_eq!(core.burst_stats().cancelled, 1);
        assert_eq!(core.spin_wheel(), BurstOutcome::Started);
    }

    #[test]
    fn test_speed_mode_entry_burst() {
        let mut core = core();
        core.set_mode(Mode::Speed);
        assert!(core.is_animating());
        assert_eq!(core.spin_wheel(), BurstOutcome::Ignored);

        // wheel 0.5 s x 11 + settle, gear 0.8 s x 9
        run_for(&mut core, 7.5);
        assert!(!core.is_animating());
        assert_eq!(core.frame().wheel_angle, 0.0);
        assert!(core.animator().is_running(ChannelId::Gear));
        assert_eq!(core.burst_stats().completed, 1);
    }

    #[test]
    fn test_speed_to_customize_mid_burst() {
        let mut core = eager_core();
        core.set_mode(Mode::Speed);
        run_for(&mut core, 1.0);
        for i in 0..10 {
            core.update_position(i as f64, -(i as f64));
        }

        let speed = core.frame();
        assert!(speed.animating);
        assert!(speed.has_speed_elements());
        assert!(!speed.particles.is_empty());

        core.set_mode(Mode::Customize);
        let frame = core.frame();
        assert!(!frame.has_speed_elements());
        assert!(!frame.animating);
        assert!(frame.particles.is_empty());
        assert_eq!(frame.wheel_angle, 0.0);
        assert!(matches!(frame.overlay, OverlayVisual::Customize { .. }));
        assert_eq!(frame.indicator.as_deref(), Some("Customization mode"));

        run_for(&mut core, 3.0);
        assert!(!core.frame().has_speed_elements());
    }

    #[test]
    fn test_mode_loops() {
        let mut core = core();
        run_for(&mut core, 2.0);
        assert_relative_eq!(core.frame().body.y, -10.0, epsilon = 1e-6);

        core.set_mode(Mode::Customize);
        run_for(&mut core, 4.0);
        let body = core.frame().body;
        assert_relative_eq!(body.tilt_y, 8.0, epsilon = 1e-6);
        assert_relative_eq!(body.tilt_x, 5.0, epsilon = 1e-6);
        // Flourish is over
        assert_relative_eq!(body.rotate, 0.0);
        assert_relative_eq!(body.scale, 1.0);

        core.set_mode(Mode::Repair);
        let body = core.frame().body;
        assert_eq!((body.tilt_x, body.tilt_y, body.tilt_z), (0.0, 0.0, 0.0));
        run_for(&mut core, 1.5);
        assert_relative_eq!(core.frame().body.scale, 1.03, epsilon = 1e-6);
    }

    #[test]
    fn test_gear_and_chain_survive_mode_changes() {
        let mut core = core();
        for mode in [Mode::Speed, Mode::Customize, Mode::Repair, Mode::Default] {
            core.set_mode(mode);
            run_for(&mut core, 0.25);
            assert!(core.animator().is_running(ChannelId::Chain));
        }
        run_for(&mut core, 8.0);
        assert!(core.animator().is_running(ChannelId::Gear));
    }

    #[test]
    fn test_update_position_translates_and_spawns() {
        let mut core = eager_core();
        core.update_position(10.0, -5.0);

        assert_eq!(core.content_offset(), Vector2::new(10.0, -5.0));
        assert_eq!(core.particles().len(), 1);
        let particle = core.particles().iter().next().unwrap();
        assert_eq!(particle.position, Vector2::new(210.0, 195.0));

        core.update_position(f64::NAN, 1.0);
        core.update_position(1.0, f64::INFINITY);
        assert_eq!(core.content_offset(), Vector2::new(10.0, -5.0));
        assert_eq!(core.particles().len(), 1);
    }

    #[test]
    fn test_spawn_rate_through_position_updates() {
        let config = VisualizationConfig {
            particles: ParticleConfig {
                max_particles: 100_000,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut core = VisualizationCore::new(config, None, rng(99)).unwrap();

        let n = 10_000;
        for i in 0..n {
            core.update_position((i % 40) as f64, 3.0);
        }
        let stats = core.particles().stats();
        assert_eq!(stats.emit_calls, n);
        let rate = stats.spawned as f64 / n as f64;
        assert!((rate - 0.3).abs() < 0.03, "spawn rate {rate}");
    }

    #[test]
    fn test_unmounted_commands_short_circuit() {
        let mut core = eager_core();
        core.spin_wheel();
        core.update_position(3.0, 3.0);
        core.unmount();

        assert!(!core.is_mounted());
        assert!(!core.is_animating());
        assert!(core.particles().is_empty());

        core.update_position(50.0, 50.0);
        assert!(core.particles().is_empty());
        assert_eq!(core.spin_gears(), BurstOutcome::Ignored);
        core.set_mode(Mode::Speed);
        assert_eq!(core.mode(), Mode::Default);

        let frame_index = core.frame_index();
        core.tick(DT);
        assert_eq!(core.frame_index(), frame_index);
        for channel in ChannelId::ALL {
            assert!(!core.animator().is_running(channel));
        }
    }

    #[test]
    fn test_swatch_selection_lifecycle() {
        let mut core = core();
        assert!(!core.select_swatch(0));

        core.set_mode(Mode::Customize);
        assert!(core.select_swatch(2));
        assert_eq!(core.selected_color(), Some(core.parts()[2].color));
        assert!(!core.select_swatch(5));

        core.set_mode(Mode::Repair);
        assert_eq!(core.selected_color(), None);
        core.set_mode(Mode::Customize);
        assert_eq!(core.selected_color(), None);
    }

    #[test]
    fn test_hover_only_in_repair() {
        let mut core = core();
        assert!(!core.hover_part(2));

        core.set_mode(Mode::Repair);
        run_for(&mut core, 2.0);
        assert!(core.hover_part(2));
        assert_eq!(core.hovered_part(), Some(2));

        let OverlayVisual::Repair { markers, badge } = core.frame().overlay else {
            panic!("expected repair overlay");
        };
        assert_eq!(badge, "REPAIR MODE");
        let with_tooltip: Vec<usize> = markers
            .iter()
            .filter(|m| m.tooltip.is_some())
            .map(|m| m.index)
            .collect();
        assert_eq!(with_tooltip, vec![2]);

        assert!(core.unhover_part(2));
        core.set_mode(Mode::Default);
        assert_eq!(core.hovered_part(), None);
    }

    #[test]
    fn test_apply_commands() {
        let mut core = eager_core();
        assert!(core.apply(&VizCommand::SetMode { mode: Mode::Repair }));
        assert!(!core.apply(&VizCommand::SetMode { mode: Mode::Repair }));
        assert!(core.apply(&VizCommand::HoverPart { index: 1 }));
        assert!(core.apply(&VizCommand::UpdatePosition { x: 4.0, y: 2.0 }));
        assert!(core.apply(&VizCommand::SpinWheel));
        assert!(!core.apply(&VizCommand::SpinGears));
        assert!(!core.apply(&VizCommand::SelectSwatch { index: 0 }));
    }

    #[test]
    fn test_frame_serializes() {
        let mut core = eager_core();
        core.set_mode(Mode::Speed);
        core.update_position(1.0, 2.0);
        core.tick_frame();

        let json = serde_json::to_value(core.frame()).unwrap();
        assert_eq!(json["mode"], "speed");
        assert_eq!(json["overlay"]["kind"], "speed");
        assert_eq!(json["indicator"], "Super-charged mode");
        assert_eq!(json["particles"][0]["color"], "#f97316");
        assert_eq!(json["wheel"]["glow"], true);
    }

    #[test]
    fn test_figure_fades_in_after_delay() {
        let mut core = core();
        assert_eq!(core.frame().figure_opacity, 0.0);

        run_for(&mut core, 0.5);
        assert_relative_eq!(core.frame().figure_opacity, 0.0, epsilon = 1e-6);

        run_for(&mut core, 0.5);
        assert_relative_eq!(core.frame().figure_opacity, 0.5, epsilon = 1e-6);

        run_for(&mut core, 1.0);
        assert_eq!(core.frame().figure_opacity, 1.0);
        assert!(!core.animator().is_running(ChannelId::FigureOpacity));

        // Mode changes never replay the fade
        core.set_mode(Mode::Customize);
        assert_eq!(core.frame().figure_opacity, 1.0);
    }

    #[test]
    fn test_hint_dot_bounces_forever() {
        let mut core = core();
        run_for(&mut core, 0.75);
        assert_relative_eq!(core.frame().hint_dot_y, 5.0, epsilon = 1e-6);

        run_for(&mut core, 0.75);
        assert_relative_eq!(core.frame().hint_dot_y, 0.0, epsilon = 1e-6);

        run_for(&mut core, 30.0);
        assert!(core.animator().is_running(ChannelId::HintDot));
        let y = core.frame().hint_dot_y;
        assert!((0.0..=5.0).contains(&y));
    }

    #[test]
    fn test_wheel_glow_only_in_speed_mode() {
        let mut core = core();
        assert!(!core.frame().wheel.glow);
        assert_eq!(core.frame().wheel.border_opacity, 0.3);

        core.set_mode(Mode::Speed);
        let frame = core.frame();
        assert!(frame.wheel.glow);
        assert_eq!(frame.wheel.border_opacity, 0.7);
        assert!(frame.has_speed_elements());

        for mode in [Mode::Customize, Mode::Repair, Mode::Default] {
            core.set_mode(mode);
            assert!(!core.frame().wheel.glow);
            assert!(!core.frame().has_speed_elements());
        }
    }
}
