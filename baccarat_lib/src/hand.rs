use crate::card::Card;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A player's or banker's hand for a single round. Totals are derived from the cards on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Associated function to create a new, empty `Hand`.
    pub fn new() -> Hand {
        Hand { cards: Vec::with_capacity(3) }
    }

    /// Method for receiving a card.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The baccarat total of the hand, always in `0..=9`.
    pub fn total_points(&self) -> u8 {
        let sum: u32 = self.cards.iter().map(|c| u32::from(c.point_value())).sum();
        (sum % 10) as u8
    }

    /// True for a two card hand totalling eight or nine.
    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && self.total_points() >= 8
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Hand { cards }
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{} (total: {})", cards, self.total_points())
    }
}
