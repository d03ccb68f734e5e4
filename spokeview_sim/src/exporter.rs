//! JSON frame log exporter.
//!
//! Exports sampled frames of a scenario run so a renderer can replay them.

use crate::runner::{ScenarioMetrics, ScenarioResult};
use serde::{Deserialize, Serialize};
use spokeview_core::Frame;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Complete scenario export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Frame clock of the run
    pub frame_rate_hz: u32,

    /// Time of the last exported frame (seconds)
    pub duration_sec: f64,

    /// Sampled frames, in order
    pub frames: Vec<Frame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ScenarioMetrics>,
}

impl VizExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, frame_rate_hz: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            frame_rate_hz,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
            metrics: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: Frame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Copies the outcome of the run.
    pub fn finalize(&mut self, result: &ScenarioResult) {
        self.passed = result.passed;
        self.failure_reason = result.failure_reason.clone();
        self.metrics = Some(result.metrics.clone());
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
