//! Fixed third card rules and outcome classification. Everything here is a pure function of the
//! hands dealt so far.

use crate::card::Card;
use crate::hand::Hand;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The result of a round. `Dragon7` is a banker win with a three card seven, `Panda8` a player win
/// with a three card eight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Player,
    Banker,
    Tie,
    Dragon7,
    Panda8,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Player,
        Outcome::Banker,
        Outcome::Tie,
        Outcome::Dragon7,
        Outcome::Panda8,
    ];

    /// Position of the outcome in `Outcome::ALL`.
    pub fn index(&self) -> usize {
        match self {
            Outcome::Player => 0,
            Outcome::Banker => 1,
            Outcome::Tie => 2,
            Outcome::Dragon7 => 3,
            Outcome::Panda8 => 4,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Outcome::Player => "Player",
            Outcome::Banker => "Banker",
            Outcome::Tie => "Tie",
            Outcome::Dragon7 => "Dragon 7",
            Outcome::Panda8 => "Panda 8",
        };
        write!(f, "{}", name)
    }
}

/// What the player did with their third card decision. The banker's table only needs the
/// drawn card when the player actually drew one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerDraw {
    Stood,
    Drew(Card),
}

/// Decides whether the player draws a third card. Nobody draws when either side has a natural,
/// otherwise the player draws on 0-5.
pub fn determine_player_hit(player: &Hand, banker: &Hand) -> bool {
    if player.is_natural() || banker.is_natural() {
        return false;
    }
    player.total_points() <= 5
}

/// Decides whether the banker draws a third card.
pub fn determine_banker_hit(banker: &Hand, player: &Hand, player_draw: PlayerDraw) -> bool {
    if player.is_natural() || banker.is_natural() {
        return false;
    }

    let banker_total = banker.total_points();
    let third = match player_draw {
        // Player stood on 6 or 7, banker plays like the player
        PlayerDraw::Stood => return banker_total <= 5,
        PlayerDraw::Drew(card) => card.point_value(),
    };

    match banker_total {
        0..=2 => true,
        3 => third != 8,
        4 => (2..=7).contains(&third),
        5 => (4..=7).contains(&third),
        6 => third == 6 || third == 7,
        7 => false,
        // A two card eight or nine is a natural and returned above.
        total => unreachable!("banker total {total} cannot reach the third card table"),
    }
}

/// Compares the final hands and classifies the round.
pub fn determine_outcome(player: &Hand, banker: &Hand) -> Outcome {
    let (p, b) = (player.total_points(), banker.total_points());
    if p == b {
        Outcome::Tie
    } else if p > b {
        if p == 8 && player.len() == 3 {
            Outcome::Panda8
        } else {
            Outcome::Player
        }
    } else if b == 7 && banker.len() == 3 {
        Outcome::Dragon7
    } else {
        Outcome::Banker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Spades)
    }

    fn hand(ranks: &[Rank]) -> Hand {
        ranks.iter().map(|r| card(*r)).collect::<Vec<_>>().into()
    }

    /// A two card hand with the given total that is not a natural.
    fn two_card(total: u8) -> Hand {
        let ranks = match total {
            0 => [Rank::Ten, Rank::King],
            1 => [Rank::Ace, Rank::Ten],
            2 => [Rank::Two, Rank::Ten],
            3 => [Rank::Three, Rank::Ten],
            4 => [Rank::Four, Rank::Ten],
            5 => [Rank::Five, Rank::Ten],
            6 => [Rank::Six, Rank::Ten],
            7 => [Rank::Seven, Rank::Ten],
            _ => panic!("not a drawing total"),
        };
        hand(&ranks)
    }

    #[test]
    fn player_hit_rules() {
        let banker = two_card(3);
        assert!(!determine_player_hit(&hand(&[Rank::Nine, Rank::Ten]), &banker));
        assert!(!determine_player_hit(&two_card(2), &hand(&[Rank::Four, Rank::Four])));
        for total in 0..=5 {
            assert!(determine_player_hit(&two_card(total), &banker), "total {total}");
        }
        assert!(!determine_player_hit(&two_card(6), &banker));
        assert!(!determine_player_hit(&two_card(7), &banker));
    }

    #[test]
    fn banker_draws_like_the_player_when_the_player_stands() {
        let player = two_card(6);
        for total in 0..=7 {
            let expected = total <= 5;
            assert_eq!(
                determine_banker_hit(&two_card(total), &player, PlayerDraw::Stood),
                expected,
                "banker total {total}"
            );
        }
    }

    #[test]
    fn banker_never_draws_against_a_natural() {
        let natural = hand(&[Rank::Four, Rank::Four]);
        assert!(!determine_banker_hit(&two_card(0), &natural, PlayerDraw::Stood));
        assert!(!determine_banker_hit(&natural, &two_card(0), PlayerDraw::Drew(card(Rank::Two))));
    }

    #[test]
    fn banker_third_card_table() {
        let player = hand(&[Rank::Two, Rank::Two, Rank::Ace]);
        // (banker total, player third card values that make the banker draw)
        let table: [(u8, &[u8]); 8] = [
            (0, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            (1, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            (2, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            (3, &[0, 1, 2, 3, 4, 5, 6, 7, 9]),
            (4, &[2, 3, 4, 5, 6, 7]),
            (5, &[4, 5, 6, 7]),
            (6, &[6, 7]),
            (7, &[]),
        ];
        let third_cards = [
            Rank::Ten,
            Rank::Ace,
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
        ];
        for (banker_total, draws) in table {
            for rank in third_cards {
                let third = card(rank);
                let expected = draws.contains(&third.point_value());
                assert_eq!(
                    determine_banker_hit(&two_card(banker_total), &player, PlayerDraw::Drew(third)),
                    expected,
                    "banker {banker_total}, player third card {third}"
                );
            }
        }
    }

    #[test]
    fn outcomes() {
        assert_eq!(determine_outcome(&two_card(4), &two_card(4)), Outcome::Tie);
        assert_eq!(determine_outcome(&two_card(6), &two_card(5)), Outcome::Player);
        assert_eq!(determine_outcome(&two_card(2), &two_card(5)), Outcome::Banker);
        assert_eq!(
            determine_outcome(&hand(&[Rank::Four, Rank::Four]), &two_card(5)),
            Outcome::Player
        );
        assert_eq!(
            determine_outcome(&hand(&[Rank::Two, Rank::Two, Rank::Four]), &two_card(5)),
            Outcome::Panda8
        );
    }

    #[test]
    fn dragon_needs_three_banker_cards() {
        let player = two_card(6);
        let three_card_seven = hand(&[Rank::Two, Rank::Two, Rank::Three]);
        assert_eq!(determine_outcome(&player, &three_card_seven), Outcome::Dragon7);
        assert_eq!(determine_outcome(&player, &two_card(7)), Outcome::Banker);

        // a three card seven against a seven is still a tie
        assert_eq!(determine_outcome(&two_card(7), &three_card_seven), Outcome::Tie);
    }

    #[test]
    fn outcome_indices_match_all() {
        for (i, outcome) in Outcome::ALL.iter().enumerate() {
            assert_eq!(outcome.index(), i);
        }
    }
}
