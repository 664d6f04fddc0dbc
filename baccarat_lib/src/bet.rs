use crate::error::BaccaratGameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Largest amount a single bet type may carry. Five bets at the top Dragon 7 payout still fit
/// comfortably in an `i64`.
pub const MAX_BET_AMOUNT: u64 = 1_000_000_000_000;

/// The wagers available at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BetType {
    Player,
    Banker,
    Tie,
    Dragon,
    Panda,
}

impl BetType {
    pub const ALL: [BetType; 5] = [
        BetType::Player,
        BetType::Banker,
        BetType::Tie,
        BetType::Dragon,
        BetType::Panda,
    ];

    /// Dragon 7 and Panda 8 may only be played alongside a Player or Banker bet.
    pub fn is_side_bet(&self) -> bool {
        matches!(self, BetType::Dragon | BetType::Panda)
    }
}

impl Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BetType::Player => "Player",
            BetType::Banker => "Banker",
            BetType::Tie => "Tie",
            BetType::Dragon => "Dragon 7",
            BetType::Panda => "Panda 8",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for BetType {
    type Err = BaccaratGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "P" | "PLAYER" => Ok(BetType::Player),
            "B" | "BANKER" => Ok(BetType::Banker),
            "T" | "TIE" => Ok(BetType::Tie),
            "D" | "DRAGON" | "DRAGON7" | "DRAGON 7" => Ok(BetType::Dragon),
            "8" | "PANDA" | "PANDA8" | "PANDA 8" => Ok(BetType::Panda),
            other => Err(BaccaratGameError::InvalidBet(format!(
                "unknown bet type: {}",
                other
            ))),
        }
    }
}

/// The bets placed on a single round, one positive amount per bet type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<BetType, u64>", into = "BTreeMap<BetType, u64>")]
pub struct Bets {
    amounts: BTreeMap<BetType, u64>,
}

impl Bets {
    pub fn new() -> Bets {
        Bets::default()
    }

    /// Adds `amount` to the bet on `bet_type`. Amounts must be positive and the accumulated bet
    /// on a type may not exceed `MAX_BET_AMOUNT`.
    pub fn place(&mut self, bet_type: BetType, amount: u64) -> Result<&mut Self, BaccaratGameError> {
        if amount == 0 {
            return Err(BaccaratGameError::InvalidBet(format!(
                "{} bet must be a positive amount",
                bet_type
            )));
        }
        let current = self.amount(bet_type);
        let total = current
            .checked_add(amount)
            .filter(|total| *total <= MAX_BET_AMOUNT)
            .ok_or_else(|| {
                BaccaratGameError::InvalidBet(format!(
                    "{} bet may not exceed {}",
                    bet_type, MAX_BET_AMOUNT
                ))
            })?;
        self.amounts.insert(bet_type, total);
        Ok(self)
    }

    /// Parses a bet string such as `P:100,D:10`. Repeated types are added together, and
    /// side bets require a Player or Banker bet in the same string.
    pub fn parse(input: &str) -> Result<Bets, BaccaratGameError> {
        let mut bets = Bets::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (kind, amount) = part.split_once(':').ok_or_else(|| {
                BaccaratGameError::InvalidBet(format!("expected <type>:<amount>, got {}", part))
            })?;
            let bet_type = kind.parse::<BetType>()?;
            let amount = amount.trim().parse::<u64>().map_err(|_| {
                BaccaratGameError::InvalidBet(format!("invalid amount: {}", amount.trim()))
            })?;
            bets.place(bet_type, amount)?;
        }
        bets.validate()?;
        Ok(bets)
    }

    /// Checks that at least one bet was placed and that side bets have a base bet.
    pub fn validate(&self) -> Result<(), BaccaratGameError> {
        if self.amounts.is_empty() {
            return Err(BaccaratGameError::InvalidBet("no bets placed".to_string()));
        }
        let has_base = self.amount(BetType::Player) > 0 || self.amount(BetType::Banker) > 0;
        let has_side = self.amounts.keys().any(BetType::is_side_bet);
        if has_side && !has_base {
            return Err(BaccaratGameError::InvalidBet(
                "Dragon 7 and Panda 8 bets require a Player or Banker bet".to_string(),
            ));
        }
        Ok(())
    }

    pub fn amount(&self, bet_type: BetType) -> u64 {
        self.amounts.get(&bet_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.amounts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BetType, u64)> + '_ {
        self.amounts.iter().map(|(k, v)| (*k, *v))
    }
}

impl TryFrom<BTreeMap<BetType, u64>> for Bets {
    type Error = BaccaratGameError;

    fn try_from(value: BTreeMap<BetType, u64>) -> Result<Self, Self::Error> {
        let mut bets = Bets::new();
        for (bet_type, amount) in value {
            bets.place(bet_type, amount)?;
        }
        Ok(bets)
    }
}

impl From<Bets> for BTreeMap<BetType, u64> {
    fn from(value: Bets) -> Self {
        value.amounts
    }
}

impl Display for Bets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .iter()
            .map(|(bet_type, amount)| format!("{}: {}", bet_type, amount))
            .collect::<Vec<String>>();
        write!(f, "{}", parts.join(", "))
    }
}
