//! Scenario runner - drives the visualization on a virtual clock and checks
//! its invariants frame by frame.

use crate::context::{SimContext, STREAM_FAULTS, STREAM_PARTICLES, STREAM_POINTER};
use crate::error::SimError;
use crate::exporter::VizExport;
use crate::faults::FlakyAnimator;
use crate::pointer::PointerPath;
use crate::scenarios::ScenarioId;

use serde::{Deserialize, Serialize};
use spokeview_core::overlay::OverlayVisual;
use spokeview_core::{
    Animator, BurstOutcome, ChannelId, Frame, Mode, OverlayFlags, ParticleId, Part,
    PositionController, Timeline, VisualizationConfig, VisualizationCore,
};
use spokeview_env::{FrameRate, VizContext};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;
use tracing::{debug, info, warn};

/// Seconds allowed for a running burst to finish once input stops
const DRAIN_SECS: f64 = 15.0;

/// Spin clicks per second in the click-spam scenarios
const CLICKS_PER_SEC: u32 = 4;

/// Pointer updates per frame in the pointer storm
const STORM_UPDATES_PER_FRAME: usize = 4;

/// Pointer updates per frame in the spawn rate scenario
const SPAWN_RATE_UPDATES_PER_FRAME: usize = 20;

/// Injected fault rates for the engine fault scenario
const FAULT_PROBABILITY: f64 = 0.35;
const REJECTION_PROBABILITY: f64 = 0.15;

/// Mode order of the tour; every ordered pair of distinct modes appears.
const TOUR: [Mode; 13] = [
    Mode::Speed,
    Mode::Customize,
    Mode::Repair,
    Mode::Default,
    Mode::Customize,
    Mode::Speed,
    Mode::Repair,
    Mode::Customize,
    Mode::Default,
    Mode::Speed,
    Mode::Default,
    Mode::Repair,
    Mode::Speed,
];

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total frames executed
    pub total_frames: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Particles in flight at the end
    pub final_particle_count: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub particles_spawned: u64,
    pub particles_removed: u64,

    /// Spawns dropped at the particle cap
    pub particles_dropped: u64,

    /// Most particles in flight at once
    pub peak_particles: usize,

    pub bursts_started: u64,
    pub bursts_ignored: u64,
    pub bursts_failed: u64,
    pub bursts_cancelled: u64,

    pub mode_switches: u64,
    pub frames: u64,
}

/// Runs visualization scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Frame clock
    frame_rate: FrameRate,

    /// Scenario length in seconds
    max_duration_secs: f64,

    /// Engine configuration
    config: VisualizationConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            frame_rate: FrameRate::default(),
            max_duration_secs: 10.0,
            config: VisualizationConfig::default(),
        }
    }

    /// Sets the frame rate.
    pub fn with_frame_rate(mut self, rate: FrameRate) -> Self {
        self.frame_rate = rate;
        self
    }

    /// Sets the scenario length.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    /// Sets the engine configuration.
    pub fn with_config(mut self, config: VisualizationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.execute(scenario, None)
    }

    /// Runs a scenario, recording every `every`-th frame.
    pub fn run_with_export(&self, scenario: ScenarioId, every: u64) -> (ScenarioResult, VizExport) {
        let mut export = VizExport::new(scenario.name(), self.seed, self.frame_rate.hz());
        let recorder = Recorder {
            export: &mut export,
            every: every.max(1),
        };
        let result = self.execute(scenario, Some(recorder));
        export.finalize(&result);
        (result, export)
    }

    fn execute(&self, scenario: ScenarioId, recorder: Option<Recorder<'_>>) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let timeline = |_: &SimContext| Timeline::new();
        match scenario {
            ScenarioId::ModeTour => self.drive(scenario, recorder, timeline, mode_tour),
            ScenarioId::BurstGuard => self.drive(scenario, recorder, timeline, burst_guard),
            ScenarioId::EngineFaults => self.drive(
                scenario,
                recorder,
                |ctx: &SimContext| {
                    FlakyAnimator::new(ctx.derive_rng(STREAM_FAULTS), FAULT_PROBABILITY)
                        .with_start_rejections(REJECTION_PROBABILITY)
                },
                engine_faults,
            ),
            ScenarioId::PointerStorm => self.drive(scenario, recorder, timeline, pointer_storm),
            ScenarioId::HotspotSweep => self.drive(scenario, recorder, timeline, hotspot_sweep),
            ScenarioId::MidBurstSwitch => {
                self.drive(scenario, recorder, timeline, mid_burst_switch)
            }
            ScenarioId::SpawnRate => self.drive(scenario, recorder, timeline, spawn_rate),
        }
    }

    fn drive<A, M, S>(
        &self,
        scenario: ScenarioId,
        recorder: Option<Recorder<'_>>,
        make_animator: M,
        body: S,
    ) -> ScenarioResult
    where
        A: Animator,
        M: FnOnce(&SimContext) -> A,
        S: FnOnce(&mut Harness<'_, A>) -> Result<(), String>,
    {
        let mut harness = match Harness::new(self, recorder, make_animator) {
            Ok(harness) => harness,
            Err(err) => {
                warn!(error = %err, "scenario setup failed");
                return ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    total_frames: 0,
                    final_time_secs: 0.0,
                    final_particle_count: 0,
                    failure_reason: Some(err.to_string()),
                    metrics: ScenarioMetrics::default(),
                };
            }
        };

        let outcome = body(&mut harness);
        if let Err(reason) = &outcome {
            warn!(scenario = scenario.name(), %reason, "invariant violated");
        }
        harness.finish(scenario, self.seed, outcome)
    }
}

struct Recorder<'a> {
    export: &'a mut VizExport,
    every: u64,
}

/// One engine under a virtual clock, plus its synthetic inputs.
struct Harness<'r, A: Animator> {
    ctx: SimContext,
    core: VisualizationCore<A>,
    pointer: PointerPath,
    rate: FrameRate,
    target_frames: u64,
    frames: u64,
    recorder: Option<Recorder<'r>>,
}

impl<'r, A: Animator> Harness<'r, A> {
    fn new(
        runner: &ScenarioRunner,
        recorder: Option<Recorder<'r>>,
        make_animator: impl FnOnce(&SimContext) -> A,
    ) -> Result<Self, SimError> {
        let ctx = SimContext::new(runner.seed);
        let config = VisualizationConfig {
            frame_rate: runner.frame_rate,
            ..runner.config.clone()
        };

        let animator = make_animator(&ctx);
        let core = VisualizationCore::with_animator(
            config,
            None,
            ctx.derive_rng(STREAM_PARTICLES),
            animator,
        )?;
        let pointer = PointerPath::new(ctx.derive_rng(STREAM_POINTER))?;

        Ok(Self {
            core,
            pointer,
            rate: runner.frame_rate,
            target_frames: runner.frame_rate.frames_for(runner.max_duration_secs),
            frames: 0,
            recorder,
            ctx,
        })
    }

    fn time_secs(&self) -> f64 {
        self.ctx.now().as_secs_f64()
    }

    /// Feeds `updates` pointer offsets at the current time.
    fn move_pointer(&mut self, updates: usize) {
        let t = self.time_secs();
        for _ in 0..updates {
            let offset = self.pointer.sample(t);
            self.core.update_position(offset.x, offset.y);
        }
    }

    /// Advances clock and engine by one frame.
    fn tick(&mut self) {
        self.ctx.advance_time(self.rate.frame_duration());
        self.core.tick(self.rate.dt_secs());
        self.frames += 1;

        if let Some(recorder) = &mut self.recorder {
            if self.frames % recorder.every == 0 {
                recorder.export.add_frame(self.core.frame());
            }
        }
    }

    /// Alternating wheel/gear click number `n`.
    fn click(&mut self, n: u64) -> BurstOutcome {
        if n % 2 == 0 {
            self.core.spin_wheel()
        } else {
            self.core.spin_gears()
        }
    }

    /// Frames between clicks at [`CLICKS_PER_SEC`].
    fn click_interval(&self) -> u64 {
        u64::from(self.rate.hz() / CLICKS_PER_SEC).max(1)
    }

    /// Runs without input until the burst flag clears.
    fn drain(&mut self) -> Result<(), String> {
        for _ in 0..self.rate.frames_for(DRAIN_SECS) {
            if !self.core.is_animating() {
                break;
            }
            self.tick();
        }
        ensure(!self.core.is_animating(), || {
            format!("burst still running {DRAIN_SECS}s after input stopped")
        })?;
        check_rest(&self.core.frame())
    }

    fn metrics(&self) -> ScenarioMetrics {
        let particles = self.core.particles().stats();
        let bursts = self.core.burst_stats();
        ScenarioMetrics {
            particles_spawned: particles.spawned,
            particles_removed: particles.removed,
            particles_dropped: particles.dropped_at_cap,
            peak_particles: particles.peak_in_flight,
            bursts_started: bursts.started,
            bursts_ignored: bursts.ignored,
            bursts_failed: bursts.failed,
            bursts_cancelled: bursts.cancelled,
            mode_switches: self.core.mode_switches(),
            frames: self.frames,
        }
    }

    fn finish(self, scenario: ScenarioId, seed: u64, outcome: Result<(), String>) -> ScenarioResult {
        let metrics = self.metrics();
        debug!(
            scenario = scenario.name(),
            frames = self.frames,
            spawned = metrics.particles_spawned,
            bursts = metrics.bursts_started,
            "scenario finished"
        );

        ScenarioResult {
            scenario,
            seed,
            passed: outcome.is_ok(),
            total_frames: self.frames,
            final_time_secs: self.time_secs(),
            final_particle_count: self.core.particles().len(),
            failure_reason: outcome.err(),
            metrics,
        }
    }
}

fn ensure(condition: bool, reason: impl FnOnce() -> String) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason())
    }
}

fn overlay_mode(overlay: &OverlayVisual) -> Mode {
    match overlay {
        OverlayVisual::None => Mode::Default,
        OverlayVisual::Speed { .. } => Mode::Speed,
        OverlayVisual::Customize { .. } => Mode::Customize,
        OverlayVisual::Repair { .. } => Mode::Repair,
    }
}

/// Flags, overlay, indicator and speed elements all agree with `mode`.
fn check_mode(frame: &Frame, mode: Mode) -> Result<(), String> {
    ensure(frame.mode == mode, || format!("frame reports {} in {mode}", frame.mode))?;
    ensure(frame.flags == OverlayFlags::for_mode(mode), || {
        format!("flags {:?} in {mode}", frame.flags)
    })?;
    ensure(overlay_mode(&frame.overlay) == mode, || {
        format!("{} overlay in {mode}", overlay_mode(&frame.overlay))
    })?;
    ensure(frame.indicator.as_deref() == mode.indicator(), || {
        format!("indicator {:?} in {mode}", frame.indicator)
    })?;
    ensure(frame.has_speed_elements() == (mode == Mode::Speed), || {
        format!("speed elements visible = {} in {mode}", frame.has_speed_elements())
    })
}

/// Flag clear, wheel at 0 deg.
fn check_rest(frame: &Frame) -> Result<(), String> {
    ensure(!frame.animating && frame.wheel_angle == 0.0, || {
        format!(
            "at rest check: animating={} wheel={:.3} deg (t={:.2}s)",
            frame.animating, frame.wheel_angle, frame.time_sec
        )
    })
}

/// Exactly `hovered` shows a tooltip, labelled with its part.
fn check_tooltips(frame: &Frame, parts: &[Part], hovered: Option<usize>) -> Result<(), String> {
    let OverlayVisual::Repair { markers, .. } = &frame.overlay else {
        return Err(format!("{} overlay during hotspot sweep", overlay_mode(&frame.overlay)));
    };

    for marker in markers {
        match (&marker.tooltip, hovered == Some(marker.index)) {
            (Some(tooltip), true) => {
                ensure(tooltip.label == parts[marker.index].name, || {
                    format!("part {} tooltip reads {:?}", marker.index, tooltip.label)
                })?;
                ensure(tooltip.connector.to == marker.position, || {
                    format!("part {} connector misses its marker", marker.index)
                })?;
            }
            (None, false) => {}
            (Some(_), false) => return Err(format!("tooltip on unhovered part {}", marker.index)),
            (None, true) => return Err(format!("hovered part {} has no tooltip", marker.index)),
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════
// Scenarios
// ═══════════════════════════════════════════════════

/// VIZ-001: every transition leaves exactly the new mode's decorations.
fn mode_tour(h: &mut Harness<'_, Timeline>) -> Result<(), String> {
    let stop = (h.target_frames / TOUR.len() as u64).max(1);

    for i in 0..h.target_frames {
        if i % stop == 0 {
            let mode = TOUR[(i / stop) as usize % TOUR.len()];
            h.core.set_mode(mode);
            check_mode(&h.core.frame(), mode)?;
            debug!(mode = %mode, t = h.time_secs(), "tour stop");
        }

        h.move_pointer(1);
        h.tick();

        check_mode(&h.core.frame(), h.core.mode())?;
        let animator = h.core.animator();
        ensure(
            animator.is_running(ChannelId::Gear) && animator.is_running(ChannelId::Chain),
            || format!("baseline loops stopped at t={:.2}s", h.time_secs()),
        )?;
    }
    Ok(())
}

/// VIZ-002: clicks during a burst change nothing; finished bursts rest.
fn burst_guard(h: &mut Harness<'_, Timeline>) -> Result<(), String> {
    let every = h.click_interval();
    let half = h.target_frames / 2;
    let mut was_animating = false;

    for i in 0..h.target_frames {
        if i == half {
            // Short speed-mode bursts for the second half
            h.core.set_mode(Mode::Speed);
        }

        if i % every == 0 {
            let busy = h.core.is_animating();
            let animator = h.core.animator();
            let before = (
                animator.generation(ChannelId::Wheel),
                animator.generation(ChannelId::Gear),
            );

            let outcome = h.click(i / every);

            let animator = h.core.animator();
            let after = (
                animator.generation(ChannelId::Wheel),
                animator.generation(ChannelId::Gear),
            );
            if busy {
                ensure(outcome == BurstOutcome::Ignored, || {
                    format!("click at frame {i} started a second burst")
                })?;
                ensure(before == after, || format!("ignored click at frame {i} restarted a sequence"))?;
                ensure(h.core.is_animating(), || format!("ignored click at frame {i} cleared the flag"))?;
            } else {
                ensure(outcome == BurstOutcome::Started, || format!("idle click at frame {i} ignored"))?;
            }
        }

        was_animating |= h.core.is_animating();
        h.tick();

        let animating = h.core.is_animating();
        if was_animating && !animating {
            check_rest(&h.core.frame())?;
        }
        was_animating = animating;
    }

    h.drain()?;
    if h.target_frames > every {
        ensure(h.core.burst_stats().ignored > 0, || "no click was ever ignored".to_string())?;
    }
    Ok(())
}

/// VIZ-003: engine faults reset elements and release the flag.
fn engine_faults(h: &mut Harness<'_, FlakyAnimator>) -> Result<(), String> {
    h.core.set_mode(Mode::Speed);
    let every = h.click_interval();
    let mut was_animating = h.core.is_animating();

    for i in 0..h.target_frames {
        if i % every == 0 {
            h.click(i / every);
            if !h.core.is_animating() {
                // Sequence rejected on start
                check_rest(&h.core.frame())?;
            }
        }

        was_animating |= h.core.is_animating();
        h.tick();

        let animating = h.core.is_animating();
        if was_animating && !animating {
            check_rest(&h.core.frame())?;
        }
        was_animating = animating;
    }

    h.drain()?;

    let injected = h.core.animator().injected_failures();
    let rejected = h.core.animator().rejected_starts();
    let failed = h.core.burst_stats().failed;
    debug!(injected, rejected, failed, "fault accounting");
    ensure(failed >= injected && failed <= injected + rejected, || {
        format!("{failed} burst failures for {injected} injected faults and {rejected} rejections")
    })
}

/// VIZ-004: particles fade every frame and leave exactly once.
fn pointer_storm(h: &mut Harness<'_, Timeline>) -> Result<(), String> {
    let cap = h.core.config().particles.max_particles;
    let half = h.target_frames / 2;
    let mut previous: BTreeMap<ParticleId, f64> = BTreeMap::new();
    let mut gone: BTreeSet<ParticleId> = BTreeSet::new();

    for i in 0..h.target_frames {
        if i == half {
            h.core.set_mode(Mode::Speed);
            ensure(h.core.particles().is_empty(), || "mode change kept particles".to_string())?;
            gone.extend(previous.keys().copied());
            previous.clear();
        }

        h.move_pointer(STORM_UPDATES_PER_FRAME);
        ensure(h.core.particles().len() <= cap, || {
            format!("{} particles in flight, cap {cap}", h.core.particles().len())
        })?;
        h.tick();

        let decay = h.core.config().particles.decay_per_frame;
        let current: BTreeMap<ParticleId, f64> = h
            .core
            .particles()
            .iter()
            .map(|p| (p.id, p.opacity))
            .collect();

        for (id, opacity) in &previous {
            match current.get(id) {
                Some(now) => ensure(now < opacity, || {
                    format!("particle {} opacity {opacity:.3} -> {now:.3}", id.0)
                })?,
                None => {
                    ensure(*opacity - decay <= 0.0, || {
                        format!("particle {} removed at opacity {opacity:.3}", id.0)
                    })?;
                    ensure(gone.insert(*id), || format!("particle {} removed twice", id.0))?;
                }
            }
        }
        for (id, opacity) in &current {
            ensure(*opacity > 0.0, || format!("particle {} visible at opacity {opacity}", id.0))?;
            ensure(!gone.contains(id), || format!("particle {} reappeared", id.0))?;
        }
        previous = current;
    }

    let stats = h.core.particles().stats();
    ensure(stats.peak_in_flight <= cap, || format!("peak {} above cap {cap}", stats.peak_in_flight))?;
    ensure(h.target_frames == 0 || stats.spawned > 0, || "storm spawned nothing".to_string())
}

/// VIZ-005: hotspots on the circle; hovering shows one tooltip at a time.
fn hotspot_sweep(h: &mut Harness<'_, Timeline>) -> Result<(), String> {
    h.core.set_mode(Mode::Repair);
    let parts = h.core.parts().to_vec();
    let count = parts.len();
    ensure(count > 0, || "no parts to sweep".to_string())?;

    let radius = h.core.config().hotspot_radius;
    let layout = h
        .core
        .overlay()
        .layout()
        .ok_or_else(|| "repair mode without hotspot layout".to_string())?;
    for hotspot in layout.hotspots() {
        let expected = hotspot.index as f64 / count as f64 * TAU;
        ensure((hotspot.angle - expected).abs() < 1e-12, || {
            format!("part {} at {:.4} rad, expected {expected:.4}", hotspot.index, hotspot.angle)
        })?;
        ensure((hotspot.anchor.norm() - radius).abs() < 1e-9, || {
            format!("part {} off the {radius}px circle", hotspot.index)
        })?;
    }
    ensure(!h.core.hover_part(count), || "out-of-range hover accepted".to_string())?;

    // Each part hovered twice over the run
    let dwell = (h.target_frames / (2 * count as u64)).max(1);
    let mut frame = 0;
    let mut target = 0;
    while frame < h.target_frames {
        let index = target % count;
        ensure(h.core.hover_part(index), || format!("hover on part {index} refused"))?;

        for _ in 0..dwell {
            h.move_pointer(1);
            h.tick();
            frame += 1;
            check_tooltips(&h.core.frame(), &parts, Some(index))?;
        }

        ensure(h.core.unhover_part(index), || format!("unhover on part {index} refused"))?;
        check_tooltips(&h.core.frame(), &parts, None)?;
        target += 1;
    }
    Ok(())
}

/// VIZ-006: leaving speed mode mid-burst drops every speed element at once.
fn mid_burst_switch(h: &mut Harness<'_, Timeline>) -> Result<(), String> {
    h.core.set_mode(Mode::Speed);
    let switch_at = h.rate.frames_for(1.0).min(h.target_frames / 2);

    for _ in 0..switch_at {
        h.move_pointer(2);
        h.tick();
    }
    let before = h.core.frame();
    ensure(before.animating, || "speed entry burst not running at the switch".to_string())?;
    ensure(before.has_speed_elements(), || "speed mode shows no speed elements".to_string())?;

    h.core.set_mode(Mode::Customize);
    let after = h.core.frame();
    check_mode(&after, Mode::Customize)?;
    check_rest(&after)?;
    ensure(after.particles.is_empty(), || "speed particles survived the switch".to_string())?;

    for _ in switch_at..h.target_frames {
        h.move_pointer(2);
        h.tick();
        let frame = h.core.frame();
        ensure(!frame.has_speed_elements(), || {
            format!("speed element visible at t={:.2}s", frame.time_sec)
        })?;
    }
    Ok(())
}

/// VIZ-007: spawn rolls converge to the configured probability.
fn spawn_rate(h: &mut Harness<'_, Timeline>) -> Result<(), String> {
    let p = h.core.config().particles.spawn_probability;

    for _ in 0..h.target_frames {
        h.move_pointer(SPAWN_RATE_UPDATES_PER_FRAME);
        h.tick();
    }

    let stats = h.core.particles().stats();
    let n = stats.emit_calls;
    ensure(n > 0, || "no position updates".to_string())?;

    // Spawns dropped at the cap still won their roll
    let rolls = stats.spawned + stats.dropped_at_cap;
    let rate = rolls as f64 / n as f64;
    let tolerance = 4.0 * (p * (1.0 - p) / n as f64).sqrt() + 1e-12;
    debug!(rate, p, n, tolerance, "spawn rate");
    ensure((rate - p).abs() <= tolerance, || {
        format!("spawn rate {rate:.4} over {n} updates, expected {p} +/- {tolerance:.4}")
    })?;

    let in_flight = h.core.particles().len() as u64;
    ensure(stats.removed + in_flight == stats.spawned, || {
        format!(
            "{} spawned but {} removed + {in_flight} in flight",
            stats.spawned, stats.removed
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mode_tour_scenario() {
        let runner = ScenarioRunner::new(42).with_duration(6.5);
        let result = runner.run(ScenarioId::ModeTour);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.total_frames, 390);
        assert!(result.metrics.mode_switches >= 12);
    }

    #[test]
    fn test_burst_guard_scenario() {
        let runner = ScenarioRunner::new(42).with_duration(4.0);
        let result = runner.run(ScenarioId::BurstGuard);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.bursts_ignored > 0);
        assert_eq!(result.metrics.bursts_failed, 0);
    }

    #[test]
    fn test_engine_faults_scenario() {
        let runner = ScenarioRunner::new(7).with_duration(20.0);
        let result = runner.run(ScenarioId::EngineFaults);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.bursts_started > 1);
    }

    #[test]
    fn test_pointer_storm_scenario() {
        let runner = ScenarioRunner::new(42).with_duration(4.0);
        let result = runner.run(ScenarioId::PointerStorm);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.peak_particles <= 64);
        assert!(result.metrics.particles_removed > 0);
    }

    #[test]
    fn test_hotspot_sweep_scenario() {
        let runner = ScenarioRunner::new(42).with_duration(2.0);
        let result = runner.run(ScenarioId::HotspotSweep);
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[test]
    fn test_mid_burst_switch_scenario() {
        let runner = ScenarioRunner::new(42).with_duration(3.0);
        let result = runner.run(ScenarioId::MidBurstSwitch);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.bursts_cancelled, 1);
    }

    #[test]
    fn test_spawn_rate_scenario() {
        let runner = ScenarioRunner::new(42).with_duration(10.0);
        let result = runner.run(ScenarioId::SpawnRate);
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let runner1 = ScenarioRunner::new(99).with_duration(2.0);
        let runner2 = ScenarioRunner::new(99).with_duration(2.0);

        let result1 = runner1.run(ScenarioId::PointerStorm);
        let result2 = runner2.run(ScenarioId::PointerStorm);

        assert_eq!(result1.metrics, result2.metrics);
    }

    #[test]
    fn test_export_samples_frames() {
        let runner = ScenarioRunner::new(3).with_duration(1.0);
        let (result, export) = runner.run_with_export(ScenarioId::MidBurstSwitch, 6);

        assert!(result.passed);
        assert_eq!(export.frames.len(), 10);
        assert_eq!(export.frames[0].index, 6);
        assert!(export.passed);
        assert_eq!(export.metrics, Some(result.metrics));
    }

    #[test]
    fn test_invalid_config_fails_setup() {
        let config = VisualizationConfig {
            viewport_width: -1.0,
            ..Default::default()
        };
        let result = ScenarioRunner::new(1).with_config(config).run(ScenarioId::ModeTour);

        assert!(!result.passed);
        assert_eq!(result.total_frames, 0);
        assert!(result.failure_reason.unwrap().contains("viewport_width"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_burst_guard_holds_for_any_seed(seed in any::<u64>()) {
            let result = ScenarioRunner::new(seed).with_duration(2.0).run(ScenarioId::BurstGuard);
            prop_assert!(result.passed, "{:?}", result.failure_reason);
        }

        #[test]
        fn prop_engine_faults_hold_for_any_seed(seed in any::<u64>()) {
            let result = ScenarioRunner::new(seed).with_duration(3.0).run(ScenarioId::EngineFaults);
            prop_assert!(result.passed, "{:?}", result.failure_reason);
        }
    }
}
