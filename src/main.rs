//! Planets entry point
//!
//! Runs the game loop headless: an autoplayer steers the drop cursor, drops
//! whenever the preview fits, and the run ends when the stack overflows the
//! well or the frame budget is spent.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use planets::{FruitSim, HighScores, NextPlacement, SaveState, Settings};

#[derive(Debug, Parser)]
#[command(name = "planets", about = "Headless autoplay run of the planets simulation")]
struct Args {
    /// Run seed (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum frames to simulate
    #[arg(long, default_value_t = 20_000)]
    frames: u32,
    /// Settings JSON
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Resume from a save file instead of starting a new game
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Write the final state here
    #[arg(long)]
    save: Option<PathBuf>,
    /// High score table to update
    #[arg(long)]
    highscores: Option<PathBuf>,
}

/// Outcome of an autoplay run
struct RunSummary {
    frames: u32,
    drops: u32,
    outlier: Option<usize>,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0)
}

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Game loop: check for loss, steer, drop, step the cursor, simulate
fn autoplay(
    sim: &mut FruitSim,
    next: &mut NextPlacement,
    settings: &Settings,
    mut frame: u32,
    max_frames: u32,
    seed: u64,
) -> RunSummary {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut frame_seed = seed;
    let mut target_x = rng.random_range(0.0..sim.world_width());
    let mut drops = 0;
    let drop_interval = settings.drop_interval.max(1);

    next.setup_preview(sim);
    while frame < max_frames {
        if frame > 0 {
            if let Some(index) = sim.find_grounded_outside(frame) {
                log::info!("Stack overflowed at frame {frame} (body {index})");
                return RunSummary {
                    frames: frame,
                    drops,
                    outlier: Some(index),
                };
            }
        }
        frame += 1;

        let dx = target_x - next.x;
        if dx.abs() > 0.05 {
            next.nudge(dx, settings);
        }
        if frame % drop_interval == 0 && next.place(sim, rng.random()) {
            drops += 1;
            target_x = rng.random_range(0.0..sim.world_width());
            log::debug!("Drop {drops} at frame {frame}");
        }
        next.step(sim, settings);

        frame_seed = frame_seed.wrapping_add(1);
        sim.simulate(frame_seed, frame);
        next.setup_preview(sim);
    }

    RunSummary {
        frames: frame,
        drops,
        outlier: None,
    }
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args
        .settings
        .as_ref()
        .map(|path| Settings::load_from(path))
        .unwrap_or_default();
    let seed = args.seed.unwrap_or_else(clock_seed);

    let mut sim = FruitSim::with_settings(&settings);
    sim.init(seed);
    sim.set_gravity(settings.gravity);

    let (mut next, start_frame) = match &args.resume {
        Some(path) => {
            let save = SaveState::load_from(path)
                .with_context(|| format!("loading save {}", path.display()))?;
            save.restore(&mut sim)
                .with_context(|| format!("restoring save {}", path.display()))?;
            (save.next, save.simulation_frame)
        }
        None => (NextPlacement::new(&sim, sim.world_width() * 0.5, seed), 0),
    };

    log::info!("Starting run (seed {seed}, frame {start_frame})");
    let summary = autoplay(&mut sim, &mut next, &settings, start_frame, args.frames, seed);

    println!(
        "frames: {}  drops: {}  bodies: {}  merges: {}  score: {}{}",
        summary.frames,
        summary.drops,
        sim.num_fruits(),
        sim.pop_count(),
        sim.score(),
        if summary.outlier.is_some() { "  (game over)" } else { "" }
    );

    if let Some(path) = &args.highscores {
        let mut scores = HighScores::load_from(path);
        if let Some(rank) = scores.add_score(sim.score(), summary.drops, summary.frames, unix_time()) {
            println!("new high score, rank {rank}");
        }
        scores
            .save_to(path)
            .with_context(|| format!("writing high scores {}", path.display()))?;
    }

    if let Some(path) = &args.save {
        SaveState::capture(&sim, next, summary.outlier, summary.frames)
            .save_to(path)
            .with_context(|| format!("writing save {}", path.display()))?;
        log::info!("Saved game to {}", path.display());
    }

    Ok(())
}
