use crate::error::BaccaratGameError;
use crate::shoe::{check_decks, CARDS_PER_DECK};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DECKS_COUNT: usize = 8;
/// Roughly a quarter of a deck.
pub const DEFAULT_CUT_CARD_THRESHOLD: usize = 14;

/// Struct for configuring the shoe used at a table or by a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub decks_count: usize,
    pub cut_card_threshold: usize,
}

impl GameConfig {
    /// Associated method for returning a new `GameConfigBuilder`, unset fields fall back to the
    /// standard casino settings of eight decks and a cut card fourteen cards from the end.
    pub fn new() -> GameConfigBuilder {
        GameConfigBuilder {
            decks_count: None,
            cut_card_threshold: None,
        }
    }

    /// Checks the configuration describes a shoe that can be dealt from.
    pub fn validate(&self) -> Result<(), BaccaratGameError> {
        check_decks(self.decks_count)?;
        let shoe_size = self.shoe_size();
        if self.cut_card_threshold >= shoe_size {
            return Err(BaccaratGameError::CutCardOutOfRange {
                threshold: self.cut_card_threshold,
                shoe_size,
            });
        }
        Ok(())
    }

    pub fn shoe_size(&self) -> usize {
        self.decks_count.saturating_mul(CARDS_PER_DECK)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::new().build()
    }
}

/// Struct to implement builder pattern for `GameConfig`
#[derive(Clone, Copy)]
pub struct GameConfigBuilder {
    decks_count: Option<usize>,
    cut_card_threshold: Option<usize>,
}

impl GameConfigBuilder {
    /// Method for choosing the number of decks in the shoe
    pub fn decks_count(&mut self, decks: usize) -> &mut Self {
        self.decks_count = Some(decks);
        self
    }

    /// Method for setting how many cards remain when the cut card comes out
    pub fn cut_card_threshold(&mut self, threshold: usize) -> &mut Self {
        self.cut_card_threshold = Some(threshold);
        self
    }

    pub fn build(&mut self) -> GameConfig {
        GameConfig {
            decks_count: self.decks_count.unwrap_or(DEFAULT_DECKS_COUNT),
            cut_card_threshold: self
                .cut_card_threshold
                .unwrap_or(DEFAULT_CUT_CARD_THRESHOLD),
        }
    }
}
