use anyhow::{Context, Result};
use baccarat_lib::config::{DEFAULT_CUT_CARD_THRESHOLD, DEFAULT_DECKS_COUNT};
use baccarat_lib::GameConfig;
use baccarat_sim::write::{write_summary, write_summary_json};
use baccarat_sim::{BaccaratSimulator, BaccaratSimulatorConfig};
use clap::Parser;

/// Monte Carlo simulation of EZ Baccarat with the Dragon 7 and Panda 8 side bets.
#[derive(Parser, Debug)]
#[command(name = "baccarat_sim", version)]
struct Args {
    /// Number of rounds to simulate
    #[arg(short, long, default_value_t = 1_000_000)]
    rounds: u64,

    /// Number of worker threads
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Decks in the shoe
    #[arg(long, default_value_t = DEFAULT_DECKS_COUNT)]
    decks: usize,

    /// Cards left in the shoe when the cut card comes out
    #[arg(long, default_value_t = DEFAULT_CUT_CARD_THRESHOLD)]
    cut_card: usize,

    /// Base seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Log shoe replacements and worker progress
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(args: &Args) -> Result<BaccaratSimulatorConfig> {
    let game = GameConfig::new()
        .decks_count(args.decks)
        .cut_card_threshold(args.cut_card)
        .build();
    game.validate().context("invalid shoe configuration")?;

    let mut builder = BaccaratSimulatorConfig::new();
    builder
        .game(game)
        .total_rounds(args.rounds)
        .num_workers(args.workers);
    if let Some(seed) = args.seed {
        builder.seed(seed);
    }
    Ok(builder.build())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&args)?;
    let summary = BaccaratSimulator::new(config)
        .run()
        .context("simulation failed")?;

    let stdout = std::io::stdout().lock();
    if args.json {
        write_summary_json(&summary, stdout)?;
    } else {
        write_summary(&summary, stdout)?;
    }
    Ok(())
}
