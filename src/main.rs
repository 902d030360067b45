//! Cluck Shooter headless runner
//!
//! Plays a match with the autopilot for a fixed amount of simulated time,
//! prints text frames, and submits the final score to the leaderboard.

use clap::Parser;
use std::path::PathBuf;

use cluck_shooter::audio::LogAudio;
use cluck_shooter::highscores::FileLeaderboard;
use cluck_shooter::observer::LogObserver;
use cluck_shooter::platform::ScriptedInput;
use cluck_shooter::renderer::{Renderer, TextRenderer};
use cluck_shooter::sim::ShipVariant;
use cluck_shooter::{Game, Leaderboard, QualityPreset, Settings};

/// Host frame interval in milliseconds (60 Hz)
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser)]
#[command(name = "cluck-shooter")]
#[command(about = "Run an autopilot match of Cluck Shooter without a window")]
struct Args {
    /// Simulated seconds to play
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Match seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Ship variant: blaster, bomber or laser
    #[arg(long, default_value = "blaster")]
    ship: String,

    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Quality preset override: low, medium or high
    #[arg(long)]
    quality: Option<String>,

    /// Leaderboard JSON file (in-memory when omitted)
    #[arg(long)]
    leaderboard: Option<PathBuf>,

    /// Name to submit the final score under
    #[arg(long, default_value = "AUTOPILOT")]
    name: String,

    /// Print a text frame every N simulated seconds (0 = never)
    #[arg(long, default_value_t = 5.0)]
    frame_every: f64,

    /// Print the final HUD snapshot as JSON
    #[arg(long)]
    dump: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("Cluck Shooter starting...");

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(name) = &args.quality {
        match QualityPreset::parse(name) {
            Some(preset) => settings.quality = preset,
            None => log::warn!("unknown quality {name:?}, keeping {}", settings.quality.as_str()),
        }
    }
    log::info!("quality {}", settings.quality.as_str());
    let ship = ShipVariant::parse(&args.ship).unwrap_or_else(|| {
        log::warn!("unknown ship {:?}, using blaster", args.ship);
        ShipVariant::Blaster
    });
    let seed = args.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!("seed {seed}");

    let mut game = Game::new(
        seed,
        settings.clone(),
        Box::new(LogObserver),
        Box::new(LogAudio::from_settings(&settings)),
        Box::new(ScriptedInput::autopilot()),
    );
    let mut renderer = TextRenderer::default();

    game.start(Some(ship));
    let total_ms = args.seconds.max(0.0) * 1000.0;
    let frame_every_ms = args.frame_every.max(0.0) * 1000.0;
    let mut next_print = frame_every_ms;
    let mut now = 0.0;
    game.frame(now);

    while now < total_ms && game.state().phase.is_running() {
        now += FRAME_MS;
        game.frame(now);
        if frame_every_ms > 0.0 && now >= next_print {
            println!("{}", renderer.render(&game.view()));
            next_print += frame_every_ms;
        }
    }

    let state = game.state();
    println!("{}", renderer.render(&game.view()));
    println!(
        "Final score {} on level {} ({} bosses defeated)",
        state.score, state.level, state.bosses_defeated
    );

    if args.dump {
        match serde_json::to_string_pretty(&state.hud()) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("could not serialize HUD: {err}"),
        }
    }

    let (score, level) = (state.score, state.level);
    let mut leaderboard = match &args.leaderboard {
        Some(path) => Leaderboard::new(Box::new(FileLeaderboard::new(path))),
        None => Leaderboard::memory(),
    };
    if let Some(entry) = leaderboard.submit_score(&args.name, ship, score, level) {
        log::info!("submitted {} with {}", entry.name, entry.score);
    }
    for (rank, entry) in leaderboard.top_scores(10).iter().enumerate() {
        println!(
            "{:>2}. {:<16} {:>8}  L{} {}",
            rank + 1,
            entry.name,
            entry.score,
            entry.level,
            entry.ship.as_str()
        );
    }

    game.destroy();
}
