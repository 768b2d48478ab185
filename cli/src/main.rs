use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use flipmatch_core::{FlipEngine, GameConfig};

use input::Console;
use session::Session;

mod input;
mod render;
mod session;

/// Memory-matching card game for the terminal: flip two cards a turn and find every pair.
#[derive(Parser, Debug)]
#[command(name = "flipmatch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Seed for dealing the board, the same seed always deals the same board
    #[arg(long)]
    seed: Option<u64>,

    /// Name used to greet the player
    #[arg(long, default_value = "Player")]
    name: String,

    /// Keep the scrollback instead of clearing the screen between phases
    #[arg(long)]
    no_clear: bool,

    #[command(flatten)]
    verbose: Verbosity,
}

fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Seed taken from the wall clock, used once per game.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose.log_level_filter());

    let seed = cli.seed.unwrap_or_else(clock_seed);
    log::info!("Application started");

    let engine = FlipEngine::deal(GameConfig::DEFAULT, seed);
    let console = Console::new(io::stdin().lock(), io::stdout().lock())
        .with_clear_screen(!cli.no_clear);

    Session::new(console, engine, cli.name)
        .run()
        .context("game aborted")
}
