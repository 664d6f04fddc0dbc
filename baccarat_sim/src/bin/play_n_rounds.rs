use anyhow::{Context, Result};
use baccarat_lib::config::{DEFAULT_CUT_CARD_THRESHOLD, DEFAULT_DECKS_COUNT};
use baccarat_sim::prelude::*;
use clap::Parser;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Plays a number of rounds at a baccarat table with the same bets every round.
#[derive(Parser, Debug)]
#[command(name = "play_n_rounds")]
struct Args {
    /// Number of rounds to play
    rounds: u32,

    /// Bets for every round, e.g. "P:100,D:10". Types are P, B, T, D (Dragon 7) and 8 (Panda 8)
    #[arg(short, long, default_value = "B:10")]
    bets: String,

    /// Starting balance
    #[arg(long, default_value_t = 10_000)]
    balance: u64,

    #[arg(long, default_value_t = DEFAULT_DECKS_COUNT)]
    decks: usize,

    #[arg(long, default_value_t = DEFAULT_CUT_CARD_THRESHOLD)]
    cut_card: usize,

    /// Seed for a reproducible sequence of shoes
    #[arg(long)]
    seed: Option<u64>,

    /// Append one JSON line per round to this file
    #[arg(long)]
    history: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

/// What gets written to the history file for every round played.
#[derive(Serialize)]
struct RoundLog<'a> {
    timestamp: u64,
    round: u32,
    initial_balance: u64,
    final_balance: u64,
    bets: &'a Bets,
    player_hand: Vec<String>,
    banker_hand: Vec<String>,
    player_points: u8,
    banker_points: u8,
    outcome: String,
    net_change: i64,
}

impl<'a> RoundLog<'a> {
    fn new(
        round: u32,
        initial_balance: u64,
        final_balance: u64,
        bets: &'a Bets,
        result: &RoundResult,
    ) -> Self {
        let cards = |hand: &Hand| -> Vec<String> {
            hand.cards().iter().map(|c| c.to_string()).collect()
        };
        RoundLog {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            round,
            initial_balance,
            final_balance,
            bets,
            player_hand: cards(&result.player_hand),
            banker_hand: cards(&result.banker_hand),
            player_points: result.player_points,
            banker_points: result.banker_points,
            outcome: result.outcome.to_string(),
            net_change: result.net_change,
        }
    }
}

fn open_history(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;
    Ok(BufWriter::new(file))
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

    let bets = Bets::parse(&args.bets).context("invalid bets")?;
    let config = GameConfig::new()
        .decks_count(args.decks)
        .cut_card_threshold(args.cut_card)
        .build();
    let mut table = match args.seed {
        Some(seed) => BaccaratTableSim::with_seed(config, seed),
        None => BaccaratTableSim::new(config),
    }
    .context("invalid table configuration")?;
    let mut history = args.history.as_deref().map(open_history).transpose()?;

    let mut balance = args.balance;
    let (mut wins, mut pushes, mut losses) = (0u32, 0u32, 0u32);
    let mut counts = OutcomeCounts::new();
    let mut played = 0u32;

    while played < args.rounds {
        if bets.total() > balance {
            println!(
                "insufficient funds: bets of {} exceed the balance of {}",
                bets.total(),
                balance
            );
            break;
        }

        let initial_balance = balance;
        let result = table.play_round(&bets).context("round could not be dealt")?;
        balance = balance - result.total_bet + result.total_credit;
        played += 1;
        counts.record(result.outcome);
        match result.net_change {
            n if n > 0 => wins += 1,
            0 => pushes += 1,
            _ => losses += 1,
        }

        println!("{:-^80}", format!(" round {} ", played));
        println!("{}", result);
        println!("balance: {}", balance);
        println!();

        if let Some(writer) = history.as_mut() {
            let log = RoundLog::new(played, initial_balance, balance, &bets, &result);
            serde_json::to_writer(&mut *writer, &log)?;
            writer.write_all(b"\n")?;
        }
    }

    if let Some(mut writer) = history {
        writer.flush()?;
    }

    let width = "rounds with a net loss:".len() + 20;
    let numeric_width = 80 - width;
    println!("{}", "-".repeat(80));
    println!("{:-^80}", "stats");
    println!("{:<width$}{:>numeric_width$}", "rounds played:", played);
    for (outcome, count) in counts.iter() {
        println!("{:<width$}{:>numeric_width$}", format!("{}:", outcome), count);
    }
    println!("{:<width$}{:>numeric_width$}", "rounds with a net win:", wins);
    println!("{:<width$}{:>numeric_width$}", "rounds pushed:", pushes);
    println!("{:<width$}{:>numeric_width$}", "rounds with a net loss:", losses);
    println!(
        "{:<width$}{:>numeric_width$}",
        "net result:",
        balance as i64 - args.balance as i64
    );
    println!("{:<width$}{:>numeric_width$}", "final balance:", balance);
    println!("{:<width$}{:>numeric_width$}", "shoes used:", table.shoes_used());
    println!("{}", "-".repeat(80));
    Ok(())
}
