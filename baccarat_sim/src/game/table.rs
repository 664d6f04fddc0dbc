use crate::game::{deal_round, DealtRound};
use baccarat_lib::{
    calculate_payout, BaccaratGameError, BetType, Bets, GameConfig, Hand, Outcome, PayoutResult,
    Shoe,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt::Display;
use tracing::{info, warn};

/// The settlement of one bet in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BetPayout {
    pub bet_type: BetType,
    pub amount: u64,
    pub result: PayoutResult,
    pub net_change: i64,
}

/// Everything a driver needs to report a played round and settle the bettor's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    pub player_hand: Hand,
    pub banker_hand: Hand,
    pub player_points: u8,
    pub banker_points: u8,
    pub outcome: Outcome,
    pub payouts: Vec<BetPayout>,
    pub total_bet: u64,
    /// Winnings plus returned stakes, the amount to credit back to the bettor.
    pub total_credit: u64,
    pub net_change: i64,
    pub shoe_replaced: bool,
    pub cards_left: usize,
}

impl Display for RoundResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.shoe_replaced {
            writeln!(f, "[dealer] new shoe shuffled and burned")?;
        }
        writeln!(f, "player hand: {}", self.player_hand)?;
        writeln!(f, "banker hand: {}", self.banker_hand)?;
        writeln!(f, "outcome: {}", self.outcome)?;
        for payout in &self.payouts {
            let verdict = match payout.net_change {
                n if n > 0 => format!("WIN (+{})", payout.result.win_amount),
                0 => "PUSH".to_string(),
                _ => "LOSE".to_string(),
            };
            writeln!(f, "  {} bet ({}): {}", payout.bet_type, payout.amount, verdict)?;
        }
        write!(f, "net change: {}, cards left: {}", self.net_change, self.cards_left)
    }
}

/// Struct for a baccarat table that deals rounds from a live shoe and settles bets against them.
/// The table owns its shoe; once the shoe is past the cut card it is swapped for a fresh one
/// before the next round.
pub struct BaccaratTableSim {
    config: GameConfig,
    shoe: Option<Shoe>,
    seeder: StdRng,
    shoes_used: u32,
}

impl BaccaratTableSim {
    /// Associated function to create a new table, shoes are seeded from the operating system.
    pub fn new(config: GameConfig) -> Result<BaccaratTableSim, BaccaratGameError> {
        BaccaratTableSim::from_seeder(config, StdRng::from_entropy())
    }

    /// Creates a table whose sequence of shoes is reproducible.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<BaccaratTableSim, BaccaratGameError> {
        BaccaratTableSim::from_seeder(config, StdRng::seed_from_u64(seed))
    }

    /// Creates a table that deals from `shoe` first. Used to play out stacked shoes.
    pub fn with_shoe(config: GameConfig, shoe: Shoe) -> Result<BaccaratTableSim, BaccaratGameError> {
        let mut table = BaccaratTableSim::new(config)?;
        table.shoe = Some(shoe);
        table.shoes_used = 1;
        Ok(table)
    }

    fn from_seeder(config: GameConfig, seeder: StdRng) -> Result<BaccaratTableSim, BaccaratGameError> {
        config.validate()?;
        Ok(BaccaratTableSim {
            config,
            shoe: None,
            seeder,
            shoes_used: 0,
        })
    }

    /// Plays a single round for `bets`. If the shoe is missing or past the cut card a new one is
    /// brought out first.
    ///
    /// If dealing fails the shoe is discarded and the error returned, the next round starts
    /// from a fresh shoe.
    pub fn play_round(&mut self, bets: &Bets) -> Result<RoundResult, BaccaratGameError> {
        bets.validate()?;

        let (mut shoe, shoe_replaced) = match self.shoe.take() {
            Some(shoe) if !shoe.is_past_cut_card() => (shoe, false),
            Some(shoe) => {
                info!(cards_left = shoe.cards_left(), "cut card reached, preparing a new shoe");
                (self.fresh_shoe()?, true)
            }
            None => {
                info!(decks = self.config.decks_count, "bringing out a new shoe");
                (self.fresh_shoe()?, true)
            }
        };

        let DealtRound {
            player,
            banker,
            outcome,
        } = match deal_round(&mut shoe) {
            Ok(round) => round,
            Err(e) => {
                warn!(error = %e, "round could not be dealt, discarding shoe");
                return Err(e);
            }
        };
        let cards_left = shoe.cards_left();
        self.shoe = Some(shoe);

        Ok(settle(player, banker, outcome, bets, shoe_replaced, cards_left))
    }

    /// Every shoe after the first follows the table's configuration, whatever shoe the table
    /// was started with.
    fn fresh_shoe(&mut self) -> Result<Shoe, BaccaratGameError> {
        self.shoes_used += 1;
        Shoe::prepared(
            self.config.decks_count,
            self.config.cut_card_threshold,
            self.seeder.gen(),
        )
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Cards remaining in the live shoe, `None` before the first round or after a failed one.
    pub fn cards_left(&self) -> Option<usize> {
        self.shoe.as_ref().map(Shoe::cards_left)
    }

    /// Number of shoes brought out at this table so far.
    pub fn shoes_used(&self) -> u32 {
        self.shoes_used
    }
}

fn settle(
    player_hand: Hand,
    banker_hand: Hand,
    outcome: Outcome,
    bets: &Bets,
    shoe_replaced: bool,
    cards_left: usize,
) -> RoundResult {
    let payouts: Vec<BetPayout> = bets
        .iter()
        .map(|(bet_type, amount)| {
            let result = calculate_payout(outcome, bet_type, amount);
            BetPayout {
                bet_type,
                amount,
                result,
                net_change: result.net_change(amount),
            }
        })
        .collect();
    let total_bet = bets.total();
    let total_credit = payouts
        .iter()
        .map(|p| p.result.win_amount + p.result.returned_amount)
        .sum::<u64>();

    RoundResult {
        player_points: player_hand.total_points(),
        banker_points: banker_hand.total_points(),
        player_hand,
        banker_hand,
        outcome,
        payouts,
        total_bet,
        total_credit,
        net_change: total_credit as i64 - total_bet as i64,
        shoe_replaced,
        cards_left,
    }
}
