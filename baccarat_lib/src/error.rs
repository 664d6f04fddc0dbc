use thiserror::Error;

/// Errors produced by the baccarat game primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BaccaratGameError {
    #[error("shoe is empty")]
    ShoeEmpty,

    #[error("a shoe needs at least one deck")]
    NoDecks,

    #[error("a shoe holds at most {max} decks, got {decks}")]
    TooManyDecks { decks: usize, max: usize },

    #[error("cut card threshold {threshold} must be less than the shoe size of {shoe_size} cards")]
    CutCardOutOfRange { threshold: usize, shoe_size: usize },

    #[error("invalid bet: {0}")]
    InvalidBet(String),
}
