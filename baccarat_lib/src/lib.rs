//! Game primitives for EZ Baccarat with the Dragon 7 and Panda 8 side bets: cards, hands, the
//! dealer's shoe, the fixed third card rules and the payout table.

pub mod bet;
pub mod card;
pub mod config;
pub mod error;
pub mod hand;
pub mod payout;
pub mod rules;
pub mod shoe;

pub use bet::{BetType, Bets, MAX_BET_AMOUNT};
pub use card::{Card, Rank, Suit};
pub use config::{GameConfig, GameConfigBuilder};
pub use error::BaccaratGameError;
pub use hand::Hand;
pub use payout::{calculate_payout, PayoutResult};
pub use rules::{determine_banker_hit, determine_outcome, determine_player_hit, Outcome, PlayerDraw};
pub use shoe::Shoe;
