//! SpokeView Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction that lets the SpokeView
//! engine run against a **real** clock (tokio) or a **virtual** clock
//! (the `spokeview_sim` harness).
//!
//! # Core Concept: Frame-Driven Reactor
//!
//! The visualization engine never reads the wall clock or ambient entropy.
//! Everything non-deterministic is intercepted here:
//! - Time (`now()`, `sleep()`)
//! - Randomness (`derive_rng()`)
//!
//! Deriving every RNG stream from a single 64-bit seed makes any visual
//! glitch reproducible from its seed number.
//!
//! # Example
//!
//! ```ignore
//! use spokeview_env::{drive_frames, FrameRate, TokioContext};
//! use std::ops::ControlFlow;
//!
//! let ctx = TokioContext::new();
//! drive_frames(&ctx, FrameRate::default(), 600, |tick| {
//!     viz.tick(tick.dt);
//!     ControlFlow::Continue(())
//! })
//! .await;
//! ```

mod context;
mod driver;
mod error;
mod tokio_impl;
mod types;

pub use context::VizContext;
pub use driver::drive_frames;
pub use error::EnvError;
pub use tokio_impl::TokioContext;
pub use types::{FrameRate, FrameTick};
