//! The dealer's shoe. A shoe is built from whole decks in a fixed order, shuffled with its own
//! random source, and is thrown away in favour of a fresh one once play reaches the cut card.

use crate::card::{Card, Rank, Suit};
use crate::error::BaccaratGameError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

pub const CARDS_PER_DECK: usize = 52;
pub const MAX_DECKS_COUNT: usize = 64;

/// Struct representing the dealer's shoe. Cards in `[0, drawn)` have been dealt, cards in
/// `[drawn, len)` remain.
#[derive(Debug)]
pub struct Shoe {
    cards: Vec<Card>,
    drawn: usize,
    decks_count: usize,
    cut_card_threshold: usize,
    rng: StdRng,
}

impl Shoe {
    /// Associated function that builds a new, unshuffled shoe of `decks_count` decks with a random
    /// source seeded from the operating system.
    pub fn new(decks_count: usize, cut_card_threshold: usize) -> Result<Shoe, BaccaratGameError> {
        Shoe::build(decks_count, cut_card_threshold, StdRng::from_entropy())
    }

    /// Same as `Shoe::new` but with a reproducible random source.
    pub fn with_seed(
        decks_count: usize,
        cut_card_threshold: usize,
        seed: u64,
    ) -> Result<Shoe, BaccaratGameError> {
        Shoe::build(decks_count, cut_card_threshold, StdRng::seed_from_u64(seed))
    }

    /// Builds a shoe that deals `cards` in the given order. Replacing a stacked shoe yields a
    /// standard shoe with enough decks to cover the stacked card count.
    pub fn from_cards(
        cards: Vec<Card>,
        cut_card_threshold: usize,
    ) -> Result<Shoe, BaccaratGameError> {
        if cards.is_empty() {
            return Err(BaccaratGameError::NoDecks);
        }
        check_threshold(cards.len(), cut_card_threshold)?;
        Ok(Shoe {
            decks_count: (cards.len() + CARDS_PER_DECK - 1) / CARDS_PER_DECK,
            cards,
            drawn: 0,
            cut_card_threshold,
            rng: StdRng::from_entropy(),
        })
    }

    /// Builds, shuffles and burns a shoe, ready for the first round.
    pub fn prepared(
        decks_count: usize,
        cut_card_threshold: usize,
        seed: u64,
    ) -> Result<Shoe, BaccaratGameError> {
        let mut shoe = Shoe::with_seed(decks_count, cut_card_threshold, seed)?;
        shoe.shuffle();
        shoe.burn()?;
        Ok(shoe)
    }

    fn build(
        decks_count: usize,
        cut_card_threshold: usize,
        rng: StdRng,
    ) -> Result<Shoe, BaccaratGameError> {
        check_decks(decks_count)?;
        check_threshold(decks_count * CARDS_PER_DECK, cut_card_threshold)?;

        let mut cards = Vec::with_capacity(decks_count * CARDS_PER_DECK);
        for _ in 0..decks_count {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    cards.push(Card::new(rank, suit));
                }
            }
        }

        Ok(Shoe {
            cards,
            drawn: 0,
            decks_count,
            cut_card_threshold,
            rng,
        })
    }

    /// Consumes the shoe and returns a brand new one of the same size, shuffled and burned.
    /// The random stream of the old shoe carries over to the new one.
    pub fn replace(self) -> Result<Shoe, BaccaratGameError> {
        debug!(
            cards_left = self.cards_left(),
            decks = self.decks_count,
            "replacing shoe past the cut card"
        );
        let mut shoe = Shoe::build(self.decks_count, self.cut_card_threshold, self.rng)?;
        shoe.shuffle();
        shoe.burn()?;
        Ok(shoe)
    }

    /// Uniformly permutes every card in the shoe and resets the cursor.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.drawn = 0;
    }

    /// Deals the next card. Returns `BaccaratGameError::ShoeEmpty` once every card has been drawn.
    /// The cut card is not consulted here, see `is_past_cut_card`.
    pub fn draw(&mut self) -> Result<Card, BaccaratGameError> {
        let card = *self
            .cards
            .get(self.drawn)
            .ok_or(BaccaratGameError::ShoeEmpty)?;
        self.drawn += 1;
        Ok(card)
    }

    /// Turns over one card and discards as many further cards as its rank indicates (tens and
    /// face cards burn ten). Returns the face up card.
    ///
    /// On error the shoe is left partially burned and must not be dealt from again.
    pub fn burn(&mut self) -> Result<Card, BaccaratGameError> {
        let face_up = self.draw()?;
        for _ in 0..face_up.burn_count() {
            self.draw()?;
        }
        debug!(%face_up, burned = face_up.burn_count() + 1, cards_left = self.cards_left(), "burned cards");
        Ok(face_up)
    }

    pub fn cards_left(&self) -> usize {
        self.cards.len() - self.drawn
    }

    /// True once the remaining cards are at or below the cut card. Checked between rounds.
    pub fn is_past_cut_card(&self) -> bool {
        self.cards_left() <= self.cut_card_threshold
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn decks_count(&self) -> usize {
        self.decks_count
    }

    pub fn cut_card_threshold(&self) -> usize {
        self.cut_card_threshold
    }
}

pub(crate) fn check_decks(decks_count: usize) -> Result<(), BaccaratGameError> {
    if decks_count == 0 {
        return Err(BaccaratGameError::NoDecks);
    }
    if decks_count > MAX_DECKS_COUNT {
        return Err(BaccaratGameError::TooManyDecks {
            decks: decks_count,
            max: MAX_DECKS_COUNT,
        });
    }
    Ok(())
}

fn check_threshold(shoe_size: usize, threshold: usize) -> Result<(), BaccaratGameError> {
    if threshold >= shoe_size {
        return Err(BaccaratGameError::CutCardOutOfRange {
            threshold,
            shoe_size,
        });
    }
    Ok(())
}
