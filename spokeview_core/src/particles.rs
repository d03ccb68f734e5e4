//! Pointer-driven particle trail.
//!
//! Particles live in an arena keyed by [`ParticleId`]. Rendering reads the
//! arena; "removing" a particle is deleting its entry. Nothing outside the
//! emitter holds a particle.

use crate::color::Rgba;
use crate::config::ParticleConfig;
use crate::mode::Mode;
use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Arena key of a particle. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

/// Soft halo drawn around a particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    pub color: Rgba,
    pub radius: f64,
}

/// A transient trail particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,

    /// Position in container pixels (origin top-left)
    pub position: Vector2<f64>,

    /// Drift per frame
    pub velocity: Vector2<f64>,

    /// Diameter in pixels
    pub size: f64,

    pub color: Rgba,
    pub glow: Option<Glow>,

    /// Starts at 1.0, decays every frame
    pub opacity: f64,
}

/// Lifetime counters of an emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterStats {
    /// Position updates seen
    pub emit_calls: u64,
    pub spawned: u64,
    pub removed: u64,
    /// Spawns dropped because the arena was full
    pub dropped_at_cap: u64,
    pub peak_in_flight: usize,
}

/// Color and glow for a new particle in `mode`.
pub fn palette_for<R: Rng + ?Sized>(mode: Mode, rng: &mut R) -> (Rgba, Option<Glow>) {
    match mode {
        Mode::Customize => (Rgba::from_hsl(rng.gen_range(0.0..360.0), 1.0, 0.7), None),
        Mode::Speed => (
            Rgba::ACCENT,
            Some(Glow {
                color: Rgba::ACCENT,
                radius: 8.0,
            }),
        ),
        Mode::Default | Mode::Repair => (Rgba::ACCENT.with_alpha(0.7), None),
    }
}

/// Spawns and ages trail particles.
#[derive(Debug, Clone)]
pub struct ParticleTrailEmitter {
    config: ParticleConfig,
    center: Vector2<f64>,
    particles: BTreeMap<ParticleId, Particle>,
    next_id: u64,
    stats: EmitterStats,
}

impl ParticleTrailEmitter {
    /// Creates an emitter whose particles start at `center` plus the offset.
    pub fn new(config: ParticleConfig, center: Vector2<f64>) -> Self {
        Self {
            config,
            center,
            particles: BTreeMap::new(),
            next_id: 0,
            stats: EmitterStats::default(),
        }
    }

    /// Maybe spawns a particle for a pointer offset.
    ///
    /// Returns the new particle's id, or `None` when the roll failed or the
    /// arena is at its cap.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        offset: Vector2<f64>,
        mode: Mode,
        rng: &mut R,
    ) -> Option<ParticleId> {
        self.stats.emit_calls += 1;

        if !rng.gen_bool(self.config.spawn_probability) {
            return None;
        }
        if self.particles.len() >= self.config.max_particles {
            self.stats.dropped_at_cap += 1;
            trace!(cap = self.config.max_particles, "particle dropped at cap");
            return None;
        }

        let size = rng.gen_range(self.config.min_size..=self.config.max_size);
        let drift = self.config.max_drift;
        let velocity = Vector2::new(rng.gen_range(-drift..=drift), rng.gen_range(-drift..=drift));
        let (color, glow) = palette_for(mode, rng);

        let id = ParticleId(self.next_id);
        self.next_id += 1;

        self.particles.insert(
            id,
            Particle {
                id,
                position: self.center + offset,
                velocity,
                size,
                color,
                glow,
                opacity: 1.0,
            },
        );

        self.stats.spawned += 1;
        self.stats.peak_in_flight = self.stats.peak_in_flight.max(self.particles.len());
        Some(id)
    }

    /// Ages every particle by one frame.
    ///
    /// Returns the ids removed this frame: those whose opacity reached zero.
    pub fn step(&mut self) -> Vec<ParticleId> {
        let decay = self.config.decay_per_frame;
        let mut expired = Vec::new();

        for particle in self.particles.values_mut() {
            particle.position += particle.velocity;
            particle.opacity -= decay;
            if particle.opacity <= 0.0 {
                expired.push(particle.id);
            }
        }

        for id in &expired {
            self.particles.remove(id);
        }
        self.stats.removed += expired.len() as u64;
        expired
    }

    /// Drops every particle. Returns how many were in flight.
    pub fn clear(&mut self) -> usize {
        let count = self.particles.len();
        self.particles.clear();
        self.stats.removed += count as u64;
        count
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(&id)
    }

    /// Particles in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.values()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    pub fn center(&self) -> Vector2<f64> {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn always_spawn() -> ParticleConfig {
        ParticleConfig {
            spawn_probability: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_spawn_at_center_plus_offset() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut emitter = ParticleTrailEmitter::new(always_spawn(), Vector2::new(200.0, 200.0));

        let id = emitter
            .emit(Vector2::new(12.0, -8.0), Mode::Default, &mut rng)
            .unwrap();
        let particle = emitter.get(id).unwrap();

        assert_eq!(particle.position, Vector2::new(212.0, 192.0));
        assert_eq!(particle.opacity, 1.0);
        assert!((4.0..=12.0).contains(&particle.size));
        assert!(particle.velocity.x.abs() <= 1.0 && particle.velocity.y.abs() <= 1.0);
    }

    #[test]
    fn test_mode_palettes() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let (speed, glow) = palette_for(Mode::Speed, &mut rng);
        assert_eq!(speed, Rgba::ACCENT);
        assert_eq!(glow.unwrap().radius, 8.0);

        let (neutral, glow) = palette_for(Mode::Default, &mut rng);
        assert_relative_eq!(neutral.a, 0.7);
        assert!(glow.is_none());
        assert_eq!(palette_for(Mode::Repair, &mut rng).0, neutral);

        let (custom, glow) = palette_for(Mode::Customize, &mut rng);
        assert!(custom.is_opaque());
        assert!(glow.is_none());
    }

    #[test]
    fn test_particle_lifecycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut emitter = ParticleTrailEmitter::new(always_spawn(), Vector2::zeros());
        let id = emitter.emit(Vector2::zeros(), Mode::Speed, &mut rng).unwrap();
        let velocity = emitter.get(id).unwrap().velocity;

        let mut last_opacity = 1.0;
        let mut removals = 0;
        let mut frames = 0;
        while frames < 100 {
            frames += 1;
            let removed = emitter.step();
            match emitter.get(id) {
                Some(p) => {
                    assert!(p.opacity < last_opacity);
                    assert!(p.opacity > 0.0);
                    assert_relative_eq!(p.position, velocity * frames as f64, epsilon = 1e-9);
                    last_opacity = p.opacity;
                }
                None => {
                    assert_eq!(removed, vec![id]);
                    removals += 1;
                    break;
                }
            }
        }

        // 1.0 / 0.02 = 50 frames, give or take float rounding
        assert_eq!(removals, 1);
        assert!((50..=51).contains(&frames));
        assert!(emitter.step().is_empty());
        assert_eq!(emitter.stats().removed, 1);
    }

    #[test]
    fn test_cap_drops_spawns() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = ParticleConfig {
            max_particles: 3,
            ..always_spawn()
        };
        let mut emitter = ParticleTrailEmitter::new(config, Vector2::zeros());

        let spawned = (0..10)
            .filter_map(|_| emitter.emit(Vector2::zeros(), Mode::Default, &mut rng))
            .count();

        assert_eq!(spawned, 3);
        assert_eq!(emitter.len(), 3);
        assert_eq!(emitter.stats().dropped_at_cap, 7);
        assert_eq!(emitter.stats().peak_in_flight, 3);
    }

    #[test]
    fn test_spawn_rate_is_about_thirty_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = ParticleConfig {
            max_particles: usize::MAX,
            ..Default::default()
        };
        let mut emitter = ParticleTrailEmitter::new(config, Vector2::zeros());

        let n = 20_000;
        for _ in 0..n {
            emitter.emit(Vector2::new(1.0, 1.0), Mode::Default, &mut rng);
        }

        let rate = emitter.stats().spawned as f64 / n as f64;
        assert!((rate - 0.3).abs() < 0.02, "spawn rate {rate}");
        assert_eq!(emitter.stats().emit_calls, n);
    }

    #[test]
    fn test_clear() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut emitter = ParticleTrailEmitter::new(always_spawn(), Vector2::zeros());
        for _ in 0..5 {
            emitter.emit(Vector2::zeros(), Mode::Customize, &mut rng);
        }
        assert_eq!(emitter.clear(), 5);
        assert!(emitter.is_empty());
        assert!(emitter.step().is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_particle_removed_exactly_once(
            seed in any::<u64>(),
            emits_per_frame in 0usize..4,
            frames in 1usize..120,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let config = ParticleConfig { max_particles: 1_000, ..Default::default() };
            let mut emitter = ParticleTrailEmitter::new(config, Vector2::zeros());
            let mut removed = std::collections::HashSet::new();

            for _ in 0..frames {
                for _ in 0..emits_per_frame {
                    emitter.emit(Vector2::zeros(), Mode::Default, &mut rng);
                }
                for id in emitter.step() {
                    prop_assert!(removed.insert(id));
                }
            }
            // Drain
            for _ in 0..60 {
                for id in emitter.step() {
                    prop_assert!(removed.insert(id));
                }
            }

            prop_assert!(emitter.is_empty());
            prop_assert_eq!(removed.len() as u64, emitter.stats().spawned);
        }
    }
}
