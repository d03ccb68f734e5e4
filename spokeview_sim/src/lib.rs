//! SpokeView Deterministic Simulation Harness
//!
//! This crate runs the visualization engine in a controlled environment
//! where every frame is reproducible from one 64-bit seed.
//!
//! # Core Principle: Nothing Ambient
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Time**: Virtual clock advanced one frame at a time
//! - **Input**: Synthetic pointer path with seeded jitter
//! - **Randomness**: Particle, pointer and fault streams derived from the seed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ScenarioRunner                         │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ SimContext (Virtual Clock + Seeded RNG Streams)      │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                         │                           │
//! │  ┌────▼────────┐   offsets  ┌───▼─────────────────────┐     │
//! │  │ PointerPath │───────────►│ VisualizationCore       │     │
//! │  └─────────────┘   clicks   │  (Timeline or           │     │
//! │                             │   FlakyAnimator)        │     │
//! │                             └───┬─────────────────────┘     │
//! │                                 │ Frame                     │
//! │                   ┌─────────────▼──────────┐                │
//! │                   │ invariant checks       │──► VizExport   │
//! │                   └────────────────────────┘                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use spokeview_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42)
//!     .with_duration(10.0)
//!     .run(ScenarioId::BurstGuard);
//! assert!(result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod faults;
mod live;
mod pointer;
mod runner;
pub mod scenarios;

pub use context::{SimContext, STREAM_FAULTS, STREAM_PARTICLES, STREAM_POINTER};
pub use error::SimError;
pub use exporter::VizExport;
pub use faults::FlakyAnimator;
pub use live::{run_live, LiveSummary, LIVE_MODE_SECS};
pub use pointer::PointerPath;
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
