//! SpokeView Simulator CLI
//!
//! Run the visualization engine through property-checking scenarios, or play
//! it live at wall-clock pace.

use clap::Parser;
use spokeview_core::VisualizationConfig;
use spokeview_env::{FrameRate, TokioContext};
use spokeview_sim::scenarios::ScenarioId;
use spokeview_sim::{run_live, ScenarioResult, ScenarioRunner, SimError};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// SpokeView deterministic simulation CLI
#[derive(Parser, Debug)]
#[command(name = "spokeview-sim")]
#[command(about = "Run deterministic simulation scenarios for SpokeView", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (mode_tour, burst_guard, engine_faults, pointer_storm,
    /// hotspot_sweep, mid_burst_switch, spawn_rate, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Scenario duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Frame rate in Hz
    #[arg(long, default_value = "60")]
    fps: u32,

    /// JSON engine config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export the frame log of a single scenario to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export every Nth frame
    #[arg(long, default_value = "6")]
    export_every: u64,

    /// Play the mode tour live on the wall clock instead of running scenarios
    #[arg(long)]
    realtime: bool,
}

fn load_config(args: &Args) -> Result<VisualizationConfig, String> {
    let mut config = match &args.config {
        Some(path) => VisualizationConfig::from_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?,
        None => VisualizationConfig::default(),
    };
    config.frame_rate = FrameRate::new(args.fps).map_err(|e| e.to_string())?;
    Ok(config)
}

fn run_realtime(config: VisualizationConfig, duration: f64) -> Result<(), SimError> {
    let runtime = tokio::runtime::Runtime::new()?;
    let ctx = TokioContext::new();
    let summary = runtime.block_on(run_live(&ctx, config, duration))?;

    info!(
        "✓ live session: {} frames in {:.2}s, {} mode switches, {} bursts, {} particles",
        summary.frames,
        summary.elapsed.as_secs_f64(),
        summary.mode_switches,
        summary.bursts_started,
        summary.particles_spawned
    );
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("SpokeView Simulator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if args.realtime {
        if let Err(e) = run_realtime(config, args.duration) {
            error!("✗ live session failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
            eprintln!("Available scenarios: {}, all", names.join(", "));
            std::process::exit(1);
        })]
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    } else {
        args.seed
    };

    let make_runner = |seed: u64| {
        ScenarioRunner::new(seed)
            .with_duration(args.duration)
            .with_frame_rate(config.frame_rate)
            .with_config(config.clone())
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        info!("Running with export to: {}", export_path.display());
        let scenario = scenarios[0];
        let (result, export) = make_runner(base_seed).run_with_export(scenario, args.export_every);

        match export.write_to_file(export_path) {
            Ok(()) => info!("Exported {} frames to {}", export.frames.len(), export_path.display()),
            Err(e) => {
                error!("Failed to write export: {:?}", e);
                std::process::exit(1);
            }
        }

        if result.passed {
            info!("✓ {} (seed={}) PASSED", scenario.name(), base_seed);
        } else {
            error!(
                "✗ {} FAILED: {}",
                scenario.name(),
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
            std::process::exit(1);
        }
        return;
    }

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = make_runner(seed);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "frames": r.total_frames,
                    "time_secs": r.final_time_secs,
                    "failure_reason": r.failure_reason,
                    "metrics": r.metrics,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            // List failed seeds
            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
