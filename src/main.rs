//! Vigil - Entry Point
//!
//! Reads one world per turn from stdin and answers with one action line on
//! stdout. Diagnostics go to stderr.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vigil::core::config::GameConfig;
use vigil::core::error::Result;
use vigil::policy::TurnController;
use vigil::protocol::{write_action, TurnReader};

/// Vigil - turn-based defender driven by anytime search
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Play the defender over the stdin/stdout turn protocol")]
struct Args {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the per-turn time limit in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Print bare actions without the proposing heuristic's label
    #[arg(long)]
    no_labels: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vigil=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(ms) = args.time_limit_ms {
        config.search.turn_time_limit_ms = ms;
    }
    if args.no_labels {
        config.search.emit_labels = false;
    }
    config.validate()?;

    tracing::info!(
        budget_ms = config.search.search_budget().as_millis() as u64,
        strategies = ?config.strategies,
        "Vigil starting..."
    );

    let mut controller = TurnController::new(&config);
    let mut reader = TurnReader::new(io::stdin().lock());
    let mut out = BufWriter::new(io::stdout().lock());

    let mut turn = 0u64;
    while let Some(world) = reader.read_turn()? {
        turn += 1;
        tracing::debug!(
            turn,
            targets = world.targets.len(),
            hostiles = world.hostiles.len(),
            "turn received"
        );
        let action = controller.step(&world);
        write_action(&mut out, &action, config.search.emit_labels)?;
    }

    tracing::info!(turns = turn, "input exhausted, exiting");
    Ok(())
}
