//! Core environment context trait for the SpokeView engine.

use async_trait::async_trait;
use rand::RngCore;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the "real world" so the visualization engine can be
/// driven by a real frame clock in production and by a virtual clock in the
/// deterministic simulation harness.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, entropy-seeded RNG
/// - **Simulation**: `SimContext` - virtual clock, `ChaCha8Rng(seed)`
#[async_trait]
pub trait VizContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends until the given duration has elapsed.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);

    /// Returns an independent random stream.
    ///
    /// The simulation combines the master seed with `stream` so that, for
    /// example, particle jitter and pointer paths never share a sequence.
    /// Production ignores `stream` and seeds from OS entropy.
    fn derive_rng(&self, stream: u64) -> Box<dyn RngCore + Send>;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// Production returns 0 (not seeded).
    fn seed(&self) -> u64;
}
