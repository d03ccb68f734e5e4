//! Property-checking scenarios for the deterministic harness.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// VIZ-001: Walk every mode transition, check flags and overlays
    ModeTour,

    /// VIZ-002: Click spam while bursts run
    BurstGuard,

    /// VIZ-003: Bursts on an engine that fails and rejects sequences
    EngineFaults,

    /// VIZ-004: High-rate pointer movement, particle lifecycle audit
    PointerStorm,

    /// VIZ-005: Hover every repair hotspot in turn
    HotspotSweep,

    /// VIZ-006: Speed -> customize while the entry burst is running
    MidBurstSwitch,

    /// VIZ-007: Statistical check of the spawn probability
    SpawnRate,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::ModeTour,
            ScenarioId::BurstGuard,
            ScenarioId::EngineFaults,
            ScenarioId::PointerStorm,
            ScenarioId::HotspotSweep,
            ScenarioId::MidBurstSwitch,
            ScenarioId::SpawnRate,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::ModeTour => "mode_tour",
            ScenarioId::BurstGuard => "burst_guard",
            ScenarioId::EngineFaults => "engine_faults",
            ScenarioId::PointerStorm => "pointer_storm",
            ScenarioId::HotspotSweep => "hotspot_sweep",
            ScenarioId::MidBurstSwitch => "mid_burst_switch",
            ScenarioId::SpawnRate => "spawn_rate",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::ModeTour => "Cycle through all modes, exactly one overlay flag after each switch",
            ScenarioId::BurstGuard => "Spin clicks while animating are ignored, wheel rests at 0 deg",
            ScenarioId::EngineFaults => "Injected sequence failures reset elements and clear the flag",
            ScenarioId::PointerStorm => "4 pointer updates per frame, particles fade and leave exactly once",
            ScenarioId::HotspotSweep => "Hover each part, only its tooltip and connector show",
            ScenarioId::MidBurstSwitch => "Leave speed mode mid-burst, no speed element survives",
            ScenarioId::SpawnRate => "Spawn rate converges to the configured probability",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mode_tour" | "modetour" | "viz-001" => Ok(ScenarioId::ModeTour),
            "burst_guard" | "burstguard" | "viz-002" => Ok(ScenarioId::BurstGuard),
            "engine_faults" | "enginefaults" | "viz-003" => Ok(ScenarioId::EngineFaults),
            "pointer_storm" | "pointerstorm" | "viz-004" => Ok(ScenarioId::PointerStorm),
            "hotspot_sweep" | "hotspotsweep" | "viz-005" => Ok(ScenarioId::HotspotSweep),
            "mid_burst_switch" | "midburstswitch" | "viz-006" => Ok(ScenarioId::MidBurstSwitch),
            "spawn_rate" | "spawnrate" | "viz-007" => Ok(ScenarioId::SpawnRate),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
