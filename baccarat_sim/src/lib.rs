pub mod game;
pub mod write;

pub use game::prelude::*;

use baccarat_lib::{calculate_payout, BaccaratGameError, BetType, GameConfig, Outcome, Shoe};
use std::fmt::Display;
use std::ops::AddAssign;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prelude {
    pub use super::{
        game::prelude::*, run_simulation, BaccaratSimulator, BaccaratSimulatorConfig,
        BaccaratSimulatorConfigBuilder, OutcomeCounts, SimulationError, SimulationSummary,
    };
}

/// Per outcome tallies of simulated rounds. Merging is plain per outcome addition, so the order
/// in which worker counts are merged never changes the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    counts: [u64; 5],
}

impl OutcomeCounts {
    pub fn new() -> OutcomeCounts {
        OutcomeCounts::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.counts[outcome.index()] += 1;
    }

    pub fn get(&self, outcome: Outcome) -> u64 {
        self.counts[outcome.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn merge(&mut self, other: &OutcomeCounts) {
        for (count, other) in self.counts.iter_mut().zip(other.counts) {
            *count += other;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Outcome, u64)> + '_ {
        Outcome::ALL.iter().map(|o| (*o, self.get(*o)))
    }
}

impl AddAssign for OutcomeCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

impl std::iter::Sum for OutcomeCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(OutcomeCounts::new(), |mut acc, counts| {
            acc += counts;
            acc
        })
    }
}

/// Simple struct for recording the results of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub total_rounds: u64,
    pub outcome_counts: OutcomeCounts,
    pub duration: Duration,
    pub num_workers: usize,
    pub seed: u64,
}

impl SimulationSummary {
    /// Share of rounds that ended in `outcome`, as a percentage.
    pub fn percentage(&self, outcome: Outcome) -> f64 {
        percent(self.outcome_counts.get(outcome) as f64, self.total_rounds)
    }

    /// Player wins including Panda 8 wins, which also pay the Player bet.
    pub fn player_wins(&self) -> u64 {
        self.outcome_counts.get(Outcome::Player) + self.outcome_counts.get(Outcome::Panda8)
    }

    /// Net profit of betting 1 on `bet_type` every round.
    pub fn net_profit(&self, bet_type: BetType) -> i64 {
        self.outcome_counts
            .iter()
            .map(|(outcome, count)| calculate_payout(outcome, bet_type, 1).net_change(1) * count as i64)
            .sum()
    }

    /// Expected value of a bet on `bet_type` as a percentage of the stake.
    pub fn expected_value(&self, bet_type: BetType) -> f64 {
        percent(self.net_profit(bet_type) as f64, self.total_rounds)
    }

    pub fn rounds_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_rounds as f64 / secs
        } else {
            0.0
        }
    }
}

fn percent(value: f64, total_rounds: u64) -> f64 {
    if total_rounds == 0 {
        return 0.0;
    }
    value / total_rounds as f64 * 100.0
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", write::format_summary(self))
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("a simulation needs at least one round")]
    NoRounds,

    #[error("game error: {0}")]
    Game(#[from] BaccaratGameError),

    #[error("simulation worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("failed to spawn simulation worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("sending error: {0}")]
    Channel(String),

    #[error("write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Runs `total_rounds` rounds of baccarat across `num_workers` threads with a randomly chosen
/// base seed and returns the merged outcome counts.
pub fn run_simulation(
    config: GameConfig,
    total_rounds: u64,
    num_workers: usize,
) -> Result<SimulationSummary, SimulationError> {
    let config = BaccaratSimulatorConfig::new()
        .game(config)
        .total_rounds(total_rounds)
        .num_workers(num_workers)
        .build();
    BaccaratSimulator::new(config).run()
}

/// Struct for running a headless Monte Carlo simulation of baccarat. Rounds are split across a
/// fixed number of worker threads, each dealing from its own shoe with its own random source,
/// and the per worker counts are merged once every worker has finished.
pub struct BaccaratSimulator {
    pub config: BaccaratSimulatorConfig,
}

impl BaccaratSimulator {
    pub fn new(config: BaccaratSimulatorConfig) -> Self {
        BaccaratSimulator { config }
    }

    /// Method that runs the simulation. Blocks until every worker has played its share of rounds.
    /// A worker running out of cards mid round aborts the whole run, the cut card should make
    /// that impossible with a sensible configuration.
    pub fn run(&self) -> Result<SimulationSummary, SimulationError> {
        let total_rounds = self.config.total_rounds;
        if total_rounds == 0 {
            return Err(SimulationError::NoRounds);
        }
        let game = self.config.game;
        game.validate()?;

        let num_workers = clamp_workers(self.config.num_workers, total_rounds);
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        info!(
            total_rounds,
            num_workers,
            decks = game.decks_count,
            cut_card = game.cut_card_threshold,
            "starting simulation"
        );
        let start = Instant::now();

        // Every worker sends exactly once, so the channel never blocks a sender
        let (sender, receiver) =
            mpsc::sync_channel::<(usize, Result<OutcomeCounts, BaccaratGameError>)>(num_workers);

        let mut handles = Vec::with_capacity(num_workers);
        let mut spawn_error = None;
        for (id, rounds) in split_rounds(total_rounds, num_workers).into_iter().enumerate() {
            let sender = sender.clone();
            let seed = derive_worker_seed(base_seed, id);
            let spawned = thread::Builder::new()
                .name(format!("baccarat-worker-{}", id))
                .spawn(move || {
                    debug!(worker = id, rounds, "worker started");
                    let result = run_worker(game, rounds, seed);
                    sender
                        .send((id, result))
                        .map_err(|e| SimulationError::Channel(format!("{}", e)))
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    warn!(worker = id, error = %source, "failed to spawn simulation worker");
                    spawn_error = Some(SimulationError::Spawn { worker: id, source });
                    break;
                }
            }
        }
        // Workers that did start still run to completion and are joined below
        drop(sender);

        let mut merged = OutcomeCounts::new();
        let mut game_error = None;
        for (id, result) in receiver {
            match result {
                Ok(counts) => merged += counts,
                Err(e) => {
                    warn!(worker = id, error = %e, "simulation worker aborted");
                    game_error.get_or_insert(e);
                }
            }
        }

        for (id, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(SimulationError::WorkerPanicked(id)),
            }
        }

        if let Some(e) = spawn_error {
            return Err(e);
        }
        if let Some(e) = game_error {
            return Err(SimulationError::Game(e));
        }
        debug_assert_eq!(merged.total(), total_rounds);

        let duration = start.elapsed();
        info!(total_rounds, ?duration, "simulation complete");
        Ok(SimulationSummary {
            total_rounds,
            outcome_counts: merged,
            duration,
            num_workers,
            seed: base_seed,
        })
    }
}

/// Plays `rounds` rounds from shoes derived from `seed`, replacing the shoe whenever the previous
/// round left it past the cut card.
fn run_worker(game: GameConfig, rounds: u64, seed: u64) -> Result<OutcomeCounts, BaccaratGameError> {
    let mut counts = OutcomeCounts::new();
    let mut shoe = Shoe::prepared(game.decks_count, game.cut_card_threshold, seed)?;
    for _ in 0..rounds {
        if shoe.is_past_cut_card() {
            shoe = shoe.replace()?;
        }
        counts.record(deal_round(&mut shoe)?.outcome);
    }
    Ok(counts)
}

/// Upper bound on worker threads for a single run. Fixed rather than derived from the host so
/// a seeded run deals the same rounds on every machine.
pub const MAX_WORKERS: usize = 256;

/// Never more workers than rounds or `MAX_WORKERS`, and always at least one.
pub fn clamp_workers(num_workers: usize, total_rounds: u64) -> usize {
    let max_workers = usize::try_from(total_rounds).unwrap_or(usize::MAX);
    num_workers.min(max_workers).min(MAX_WORKERS).max(1)
}

/// Splits `total_rounds` into `num_workers` equal shares, the remainder all goes to worker 0.
pub fn split_rounds(total_rounds: u64, num_workers: usize) -> Vec<u64> {
    let num_workers = num_workers.max(1);
    let per_worker = total_rounds / num_workers as u64;
    let remainder = total_rounds % num_workers as u64;
    let mut shares = vec![per_worker; num_workers];
    shares[0] += remainder;
    shares
}

/// SplitMix64 over the base seed and worker index, so neighbouring workers get unrelated seeds.
pub fn derive_worker_seed(base_seed: u64, worker: usize) -> u64 {
    let mut z = base_seed.wrapping_add((worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Struct for configuring a `BaccaratSimulator`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaccaratSimulatorConfig {
    pub game: GameConfig,
    pub total_rounds: u64,
    pub num_workers: usize,
    pub seed: Option<u64>,
}

impl BaccaratSimulatorConfig {
    /// Associated method for returning a new `BaccaratSimulatorConfigBuilder` object.
    pub fn new() -> BaccaratSimulatorConfigBuilder {
        BaccaratSimulatorConfigBuilder {
            game: None,
            total_rounds: None,
            num_workers: None,
            seed: None,
        }
    }
}

impl Default for BaccaratSimulatorConfig {
    /// One million rounds on four workers with the standard eight deck shoe.
    fn default() -> Self {
        BaccaratSimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `BaccaratSimulatorConfig`
#[derive(Clone, Copy)]
pub struct BaccaratSimulatorConfigBuilder {
    game: Option<GameConfig>,
    total_rounds: Option<u64>,
    num_workers: Option<usize>,
    seed: Option<u64>,
}

impl BaccaratSimulatorConfigBuilder {
    /// Method for choosing the shoe configuration every worker deals from
    pub fn game(&mut self, game: GameConfig) -> &mut Self {
        self.game = Some(game);
        self
    }

    /// Method for setting the number of rounds simulated across all workers
    pub fn total_rounds(&mut self, rounds: u64) -> &mut Self {
        self.total_rounds = Some(rounds);
        self
    }

    /// Method for setting the number of worker threads
    pub fn num_workers(&mut self, workers: usize) -> &mut Self {
        self.num_workers = Some(workers);
        self
    }

    /// Method for fixing the base seed, making the run reproducible
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(&mut self) -> BaccaratSimulatorConfig {
        BaccaratSimulatorConfig {
            game: self.game.unwrap_or_default(),
            total_rounds: self.total_rounds.unwrap_or(1_000_000),
            num_workers: self.num_workers.unwrap_or(4),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded(rounds: u64, workers: usize, seed: u64) -> BaccaratSimulatorConfig {
        BaccaratSimulatorConfig::new()
            .total_rounds(rounds)
            .num_workers(workers)
            .seed(seed)
            .build()
    }

    #[test]
    fn remainder_goes_to_the_first_worker() {
        assert_eq!(split_rounds(10, 3), vec![4, 3, 3]);
        assert_eq!(split_rounds(9, 3), vec![3, 3, 3]);
        assert_eq!(split_rounds(5, 1), vec![5]);
    }

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(clamp_workers(0, 100), 1);
        assert_eq!(clamp_workers(8, 3), 3);
        assert_eq!(clamp_workers(4, 1_000), 4);
        assert_eq!(clamp_workers(10_000_000, 10_000_000), MAX_WORKERS);
        assert_eq!(clamp_workers(usize::MAX, u64::MAX), MAX_WORKERS);
    }

    #[test]
    fn oversized_worker_requests_are_capped() {
        let summary = BaccaratSimulator::new(seeded(1_000, 100_000, 3)).run().unwrap();
        assert_eq!(summary.num_workers, MAX_WORKERS);
        assert_eq!(summary.outcome_counts.total(), 1_000);
    }

    #[test]
    fn counts_add_up_for_any_worker_count() {
        for (rounds, workers) in [(1_000, 1), (1_001, 4), (3, 10), (1, 1)] {
            let summary = BaccaratSimulator::new(seeded(rounds, workers, 11)).run().unwrap();
            assert_eq!(summary.total_rounds, rounds);
            assert_eq!(summary.outcome_counts.total(), rounds);
            assert!(summary.num_workers <= rounds as usize);
        }
        let summary = BaccaratSimulator::new(seeded(3, 10, 0)).run().unwrap();
        assert_eq!(summary.num_workers, 3);
    }

    #[test]
    fn unseeded_runs_complete() {
        let summary = run_simulation(GameConfig::default(), 2_000, 3).unwrap();
        assert_eq!(summary.outcome_counts.total(), 2_000);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = BaccaratSimulator::new(seeded(20_000, 4, 1234)).run().unwrap();
        let b = BaccaratSimulator::new(seeded(20_000, 4, 1234)).run().unwrap();
        let c = BaccaratSimulator::new(seeded(20_000, 4, 4321)).run().unwrap();
        assert_eq!(a.outcome_counts, b.outcome_counts);
        assert_ne!(a.outcome_counts, c.outcome_counts);
    }

    #[test]
    fn worker_seeds_differ() {
        let seeds: std::collections::HashSet<u64> =
            (0..64).map(|w| derive_worker_seed(7, w)).collect();
        assert_eq!(seeds.len(), 64);
    }

    #[test]
    fn rejects_empty_and_invalid_runs() {
        assert!(matches!(
            BaccaratSimulator::new(seeded(0, 4, 1)).run(),
            Err(SimulationError::NoRounds)
        ));
        let bad_game = GameConfig::new().decks_count(1).cut_card_threshold(52).build();
        assert!(matches!(
            run_simulation(bad_game, 10, 1),
            Err(SimulationError::Game(BaccaratGameError::CutCardOutOfRange { .. }))
        ));
    }

    #[test]
    fn exhausted_shoe_aborts_the_run() {
        // with no cut card margin a single deck runs dry part way through a round
        let game = GameConfig::new().decks_count(1).cut_card_threshold(0).build();
        let config = BaccaratSimulatorConfig::new()
            .game(game)
            .total_rounds(10_000)
            .num_workers(2)
            .seed(5)
            .build();
        assert!(matches!(
            BaccaratSimulator::new(config).run(),
            Err(SimulationError::Game(BaccaratGameError::ShoeEmpty))
        ));
    }

    #[test]
    fn frequencies_are_close_to_the_known_odds() {
        let summary = BaccaratSimulator::new(seeded(200_000, 4, 2024)).run().unwrap();
        let close = |outcome: Outcome, expected: f64, tolerance: f64| {
            let pct = summary.percentage(outcome);
            assert!(
                (pct - expected).abs() < tolerance,
                "{outcome}: {pct:.4}% vs {expected}%"
            );
        };
        close(Outcome::Tie, 9.5156, 0.4);
        close(Outcome::Dragon7, 2.2534, 0.2);
        close(Outcome::Panda8, 3.4543, 0.25);
        close(Outcome::Banker, 43.6064, 0.7);
        close(Outcome::Player, 41.1704, 0.7);
    }

    #[test]
    fn net_profit_uses_the_payout_table() {
        let mut counts = OutcomeCounts::new();
        for _ in 0..3 {
            counts.record(Outcome::Tie);
        }
        counts.record(Outcome::Dragon7);
        counts.record(Outcome::Player);
        let summary = SimulationSummary {
            total_rounds: 5,
            outcome_counts: counts,
            duration: Duration::from_millis(10),
            num_workers: 1,
            seed: 0,
        };
        // banker: 3 pushes, 1 dragon push, 1 loss
        assert_eq!(summary.net_profit(BetType::Banker), -1);
        // tie: 3 wins at 8 to 1, 2 losses
        assert_eq!(summary.net_profit(BetType::Tie), 22);
        assert_eq!(summary.net_profit(BetType::Dragon), 40 - 4);
        assert_eq!(summary.player_wins(), 1);
        assert!((summary.expected_value(BetType::Tie) - 440.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn merge_order_does_not_matter(raw in proptest::collection::vec(proptest::array::uniform5(0u64..1_000_000), 1..16), rotate in 0usize..16) {
            let parts: Vec<OutcomeCounts> = raw.into_iter().map(|counts| OutcomeCounts { counts }).collect();
            let forward: OutcomeCounts = parts.iter().copied().sum();
            let backward: OutcomeCounts = parts.iter().rev().copied().sum();
            let mut rotated = parts.clone();
            let by = rotate % rotated.len();
            rotated.rotate_left(by);
            let rotated: OutcomeCounts = rotated.into_iter().sum();
            prop_assert_eq!(forward, backward);
            prop_assert_eq!(forward, rotated);
        }

        #[test]
        fn shares_cover_every_round(total in 1u64..1_000_000, workers in 1usize..64) {
            let workers = clamp_workers(workers, total);
            let shares = split_rounds(total, workers);
            prop_assert_eq!(shares.len(), workers);
            prop_assert_eq!(shares.iter().sum::<u64>(), total);
            prop_assert!(shares.iter().all(|&s| s > 0));
            prop_assert!(shares[1..].iter().all(|&s| s == shares[shares.len() - 1]));
        }
    }
}
