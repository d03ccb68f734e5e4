//! Mode Tour Demo - "What Each Mode Looks Like"
//! =============================================
//!
//! Steps the engine through every mode, wiggling a pointer and clicking the
//! wheel, and prints one line per half second plus the final frame as JSON.
//!
//! Run:
//! ```bash
//! cargo run --example mode_tour -- 7
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use spokeview_core::{Mode, PositionController, VisualizationConfig, VisualizationCore};

const SECS_PER_MODE: usize = 3;
const FPS: usize = 60;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(42);

    println!("🚲 SpokeView Mode Tour (seed={seed})");
    println!("=====================================\n");

    let mut viz = VisualizationCore::new(
        VisualizationConfig::default(),
        None,
        Box::new(StdRng::seed_from_u64(seed)),
    )?;

    for mode in [Mode::Speed, Mode::Customize, Mode::Repair, Mode::Default] {
        viz.set_mode(mode);
        println!("── {mode} ──");
        if mode == Mode::Customize {
            viz.select_swatch(2);
        }
        if mode == Mode::Repair {
            viz.hover_part(1);
        } else {
            viz.spin_wheel();
        }

        for frame in 0..SECS_PER_MODE * FPS {
            let t = frame as f64 / FPS as f64;
            viz.update_position(15.0 * (t * 2.0).sin(), 10.0 * (t * 3.0).cos());
            viz.tick_frame();

            if frame % (FPS / 2) == 0 {
                let f = viz.frame();
                println!(
                    "  t={:>5.2}s  bob={:>6.2}  scale={:.3}  wheel={:>6.1}°  gear={:>6.1}°  particles={:>2}  animating={}",
                    f.time_sec,
                    f.body.y,
                    f.body.scale,
                    f.wheel_angle,
                    f.gear_angle,
                    f.particles.len(),
                    f.animating
                );
            }
        }
    }

    println!("\n📦 Final frame:");
    println!("{}", serde_json::to_string_pretty(&viz.frame())?);
    Ok(())
}
