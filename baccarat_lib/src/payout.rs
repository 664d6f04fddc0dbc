use crate::bet::BetType;
use crate::rules::Outcome;
use serde::{Deserialize, Serialize};

/// The settlement of a single bet. `win_amount` is the profit paid, `returned_amount` the part of
/// the original stake handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayoutResult {
    pub win_amount: u64,
    pub returned_amount: u64,
}

impl PayoutResult {
    fn win(multiplier: u64, amount: u64) -> PayoutResult {
        PayoutResult {
            win_amount: amount.saturating_mul(multiplier),
            returned_amount: amount,
        }
    }

    fn push(amount: u64) -> PayoutResult {
        PayoutResult {
            win_amount: 0,
            returned_amount: amount,
        }
    }

    fn loss() -> PayoutResult {
        PayoutResult::default()
    }

    /// Change to the bettor's balance once the original `bet` is accounted for.
    /// Saturates at the `i64` bounds, which amounts under `MAX_BET_AMOUNT` never reach.
    pub fn net_change(&self, bet: u64) -> i64 {
        let net = i128::from(self.win_amount) + i128::from(self.returned_amount) - i128::from(bet);
        i64::try_from(net).unwrap_or(if net < 0 { i64::MIN } else { i64::MAX })
    }
}

/// Settles a bet of `amount` on `bet_type` against the round's `outcome`.
pub fn calculate_payout(outcome: Outcome, bet_type: BetType, amount: u64) -> PayoutResult {
    use BetType as B;
    use Outcome as O;

    match (outcome, bet_type) {
        (O::Player, B::Player) => PayoutResult::win(1, amount),
        (O::Player, B::Banker | B::Tie | B::Dragon | B::Panda) => PayoutResult::loss(),

        (O::Panda8, B::Player) => PayoutResult::win(1, amount),
        (O::Panda8, B::Panda) => PayoutResult::win(25, amount),
        (O::Panda8, B::Banker | B::Tie | B::Dragon) => PayoutResult::loss(),

        (O::Banker, B::Banker) => PayoutResult::win(1, amount),
        (O::Banker, B::Player | B::Tie | B::Dragon | B::Panda) => PayoutResult::loss(),

        // A three card banker seven pushes the Banker bet.
        (O::Dragon7, B::Banker) => PayoutResult::push(amount),
        (O::Dragon7, B::Dragon) => PayoutResult::win(40, amount),
        (O::Dragon7, B::Player | B::Tie | B::Panda) => PayoutResult::loss(),

        (O::Tie, B::Tie) => PayoutResult::win(8, amount),
        (O::Tie, B::Player | B::Banker) => PayoutResult::push(amount),
        (O::Tie, B::Dragon | B::Panda) => PayoutResult::loss(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settle(outcome: Outcome, bet_type: BetType, amount: u64) -> (u64, u64, i64) {
        let result = calculate_payout(outcome, bet_type, amount);
        (result.win_amount, result.returned_amount, result.net_change(amount))
    }

    #[test]
    fn full_matrix() {
        use BetType::*;
        // win multiplier per bet type in BetType::ALL order, the stake is returned unless None
        let rows: [(Outcome, [Option<u64>; 5]); 5] = [
            (Outcome::Player, [Some(1), None, None, None, None]),
            (Outcome::Panda8, [Some(1), None, None, None, Some(25)]),
            (Outcome::Banker, [None, Some(1), None, None, None]),
            (Outcome::Dragon7, [None, Some(0), None, Some(40), None]),
            (Outcome::Tie, [Some(0), Some(0), Some(8), None, None]),
        ];
        for (outcome, cells) in rows {
            for (bet_type, cell) in [Player, Banker, Tie, Dragon, Panda].into_iter().zip(cells) {
                let expected = match cell {
                    Some(multiplier) => PayoutResult {
                        win_amount: multiplier * 10,
                        returned_amount: 10,
                    },
                    None => PayoutResult::default(),
                };
                assert_eq!(
                    calculate_payout(outcome, bet_type, 10),
                    expected,
                    "{outcome} / {bet_type}"
                );
            }
        }
    }

    #[test]
    fn documented_examples() {
        assert_eq!(settle(Outcome::Tie, BetType::Tie, 10), (80, 10, 80));
        assert_eq!(settle(Outcome::Dragon7, BetType::Banker, 100), (0, 100, 0));
        assert_eq!(settle(Outcome::Panda8, BetType::Panda, 10), (250, 10, 250));
        assert_eq!(settle(Outcome::Player, BetType::Banker, 100).2, -100);
        assert_eq!(settle(Outcome::Dragon7, BetType::Dragon, 5), (200, 5, 200));
    }

    #[test]
    fn largest_bets_settle_without_overflow() {
        let max = crate::bet::MAX_BET_AMOUNT;
        assert_eq!(
            settle(Outcome::Dragon7, BetType::Dragon, max),
            (40 * max, max, 40 * max as i64)
        );
        assert_eq!(settle(Outcome::Banker, BetType::Player, max).2, -(max as i64));

        // amounts beyond the cap saturate instead of wrapping
        let huge = calculate_payout(Outcome::Dragon7, BetType::Dragon, u64::MAX / 20);
        assert_eq!(huge.win_amount, u64::MAX);
        assert_eq!(huge.net_change(u64::MAX / 20), i64::MAX);
        let even = calculate_payout(Outcome::Player, BetType::Player, 1 << 62);
        assert_eq!(even.net_change(1 << 62), 1 << 62);
        assert_eq!(PayoutResult::loss().net_change(u64::MAX), i64::MIN);
    }

    proptest! {
        #[test]
        fn net_change_is_never_below_minus_the_stake(amount in 1u64..1_000_000, o in 0usize..5, b in 0usize..5) {
            let result = calculate_payout(Outcome::ALL[o], BetType::ALL[b], amount);
            let net = result.net_change(amount);
            prop_assert!(net >= -(amount as i64));
            prop_assert!(result.returned_amount == 0 || result.returned_amount == amount);
            if result.returned_amount == 0 {
                prop_assert_eq!(result.win_amount, 0);
            }
        }
    }
}
