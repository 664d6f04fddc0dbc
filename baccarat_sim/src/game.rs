//! Module that focuses on dealing a single round of baccarat. `deal_round` is the one path every
//! round goes through, whether it is played at a `BaccaratTableSim` or inside a simulation worker.

pub mod table;
pub mod prelude {
    pub use super::{deal_round, DealtRound};
    pub use crate::game::table::{BaccaratTableSim, BetPayout, RoundResult};
    pub use baccarat_lib::{
        BaccaratGameError, BetType, Bets, Card, GameConfig, Hand, Outcome, PayoutResult, Shoe,
    };
}

pub use prelude::*;

use baccarat_lib::{determine_banker_hit, determine_outcome, determine_player_hit, PlayerDraw};

/// The hands of a finished round and how the round was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealtRound {
    pub player: Hand,
    pub banker: Hand,
    pub outcome: Outcome,
}

/// Deals one round from `shoe`: two cards each, alternating player and banker, then the third
/// card rules for the player followed by the banker.
/// Fails with `BaccaratGameError::ShoeEmpty` if the shoe runs out part way through.
pub fn deal_round(shoe: &mut Shoe) -> Result<DealtRound, BaccaratGameError> {
    let mut player = Hand::new();
    let mut banker = Hand::new();

    player.add_card(shoe.draw()?);
    banker.add_card(shoe.draw()?);
    player.add_card(shoe.draw()?);
    banker.add_card(shoe.draw()?);

    let player_draw = if determine_player_hit(&player, &banker) {
        let card = shoe.draw()?;
        player.add_card(card);
        PlayerDraw::Drew(card)
    } else {
        PlayerDraw::Stood
    };

    if determine_banker_hit(&banker, &player, player_draw) {
        banker.add_card(shoe.draw()?);
    }

    let outcome = determine_outcome(&player, &banker);
    Ok(DealtRound {
        player,
        banker,
        outcome,
    })
}
