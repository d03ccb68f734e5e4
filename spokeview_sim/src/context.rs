//! Simulation context implementing VizContext for deterministic testing.

use async_trait::async_trait;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spokeview_env::VizContext;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// RNG stream feeding the particle emitter.
pub const STREAM_PARTICLES: u64 = 1;

/// RNG stream feeding the synthetic pointer.
pub const STREAM_POINTER: u64 = 2;

/// RNG stream feeding fault injection.
pub const STREAM_FAULTS: u64 = 3;

/// Simulation context backed by deterministic time and RNG.
///
/// This implements `VizContext` using:
/// - A virtual clock that can be advanced manually
/// - Seeded ChaCha8 streams derived from one master seed
/// - Simulated sleep that advances virtual time
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time += duration.as_nanos() as u64;
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time = time_ns;
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed of stream `stream` under this context's master seed.
    pub fn stream_seed(&self, stream: u64) -> u64 {
        self.seed.wrapping_mul(0x517cc1b727220a95) ^ stream
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
        }
    }
}

#[async_trait]
impl VizContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    async fn sleep(&self, duration: Duration) {
        // Sleeping is instantaneous: it only moves the virtual clock
        self.advance_time(duration);
    }

    fn derive_rng(&self, stream: u64) -> Box<dyn RngCore + Send> {
        Box::new(ChaCha8Rng::seed_from_u64(self.stream_seed(stream)))
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
