//! SpokeView Core - Headless Interactive Bicycle Visualization
//!
//! The engine behind an animated landing-page bicycle. It owns all transient
//! visual state and emits a serializable [`Frame`] per tick:
//! 1. **Mode overlays**: default / speed / customize / repair decorations and
//!    their body animation loops
//! 2. **Spin bursts**: click-triggered wheel and gear spins behind one shared
//!    "animating" guard
//! 3. **Particle trail**: pointer-driven particles in an id-keyed arena
//! 4. **Part hotspots**: repair-mode markers with hover tooltips
//!
//! Time enters through [`VisualizationCore::tick`]; randomness through an
//! injected RNG. The same inputs and seed always produce the same frames.

pub mod burst;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod hotspots;
pub mod mode;
pub mod overlay;
pub mod part;
pub mod particles;
pub mod timeline;
pub mod visualization;

// Re-export key types for convenience
pub use burst::{BurstKind, BurstOutcome, BurstStats};
pub use color::Rgba;
pub use config::{ParticleConfig, VisualizationConfig};
pub use controller::{PositionController, VizCommand};
pub use error::{ColorError, ConfigError, ModeParseError, MotionError};
pub use frame::{Frame, WheelStyle};
pub use hotspots::PartHotspotLayout;
pub use mode::{Mode, OverlayFlags};
pub use part::{default_parts, Part};
pub use particles::{Particle, ParticleId, ParticleTrailEmitter};
pub use timeline::{Animator, ChannelId, Completion, Generation, Timeline, Tween};
pub use visualization::VisualizationCore;
