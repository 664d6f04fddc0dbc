use crate::{SimulationError, SimulationSummary};
use baccarat_lib::{BetType, Outcome};
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

lazy_static! {
    /// Exact eight deck probabilities of each outcome, in percent.
    pub static ref REFERENCE_OUTCOME_PERCENTAGES: HashMap<Outcome, f64> = HashMap::from([
        (Outcome::Player, 41.1704),
        (Outcome::Panda8, 3.4543),
        (Outcome::Banker, 43.6064),
        (Outcome::Tie, 9.5156),
        (Outcome::Dragon7, 2.2534),
    ]);

    /// Exact eight deck house edge of each bet, as the bettor's expected value in percent.
    pub static ref REFERENCE_EXPECTED_VALUES: HashMap<BetType, f64> = HashMap::from([
        (BetType::Banker, -1.0183),
        (BetType::Player, -1.2351),
        (BetType::Tie, -14.3596),
        (BetType::Dragon, -7.6106),
        (BetType::Panda, -10.1882),
    ]);
}

const WIDTH: usize = 80;

/// Order in which bets are listed in reports.
const REPORT_BETS: [BetType; 5] = [
    BetType::Banker,
    BetType::Player,
    BetType::Tie,
    BetType::Dragon,
    BetType::Panda,
];

fn reference_outcome(outcome: Outcome) -> f64 {
    REFERENCE_OUTCOME_PERCENTAGES
        .get(&outcome)
        .copied()
        .unwrap_or_default()
}

fn reference_ev(bet_type: BetType) -> f64 {
    REFERENCE_EXPECTED_VALUES
        .get(&bet_type)
        .copied()
        .unwrap_or_default()
}

/// Formats `summary` into the fixed width text report.
pub fn format_summary(summary: &SimulationSummary) -> String {
    let mut out = String::new();
    let total = summary.total_rounds;
    let row = |label: &str, count: u64, simulated: f64, reference: f64| {
        format!(
            "{:<22}|{:>14} |{:>12.4}% |{:>12.4}%\n",
            label, count, simulated, reference
        )
    };

    out.push_str(&format!("{:-^WIDTH$}\n", " simulation complete "));
    out.push_str(&format!("{:<22}{:>14}\n", "total rounds", total));
    out.push_str(&format!("{:<22}{:>14}\n", "workers", summary.num_workers));
    out.push_str(&format!("{:<22}{:>14}\n", "seed", summary.seed));
    out.push_str(&format!(
        "{:<22}{:>14} ({:.0} rounds/sec)\n\n",
        "time taken",
        format!("{:.3?}", summary.duration),
        summary.rounds_per_second()
    ));

    out.push_str(&format!(
        "{:<22}|{:>14} |{:>13} |{:>13}\n",
        "outcome", "count", "simulated", "expected"
    ));
    out.push_str(&format!("{}\n", "-".repeat(WIDTH)));
    let player_pct = summary.percentage(Outcome::Player) + summary.percentage(Outcome::Panda8);
    out.push_str(&row(
        "Player (total)",
        summary.player_wins(),
        player_pct,
        reference_outcome(Outcome::Player) + reference_outcome(Outcome::Panda8),
    ));
    for (label, outcome) in [
        ("  Panda 8", Outcome::Panda8),
        ("Banker (non-Dragon)", Outcome::Banker),
        ("Tie", Outcome::Tie),
        ("Dragon 7", Outcome::Dragon7),
    ] {
        out.push_str(&row(
            label,
            summary.outcome_counts.get(outcome),
            summary.percentage(outcome),
            reference_outcome(outcome),
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(WIDTH)));
    out.push_str(&row(
        "Total",
        summary.outcome_counts.total(),
        percent_of(summary.outcome_counts.total(), total),
        100.0,
    ));
    out.push('\n');

    out.push_str(&format!(
        "{:<22}|{:>14} |{:>13} |{:>13}\n",
        "bet (1 per round)", "net profit", "simulated EV", "expected EV"
    ));
    out.push_str(&format!("{}\n", "-".repeat(WIDTH)));
    for bet_type in REPORT_BETS {
        out.push_str(&format!(
            "{:<22}|{:>14} |{:>12.4}% |{:>12.4}%\n",
            bet_type.to_string(),
            summary.net_profit(bet_type),
            summary.expected_value(bet_type),
            reference_ev(bet_type),
        ));
    }
    out.push_str(&format!("{}\n", "=".repeat(WIDTH)));
    out
}

fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// One outcome row of a `SimulationReport`.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    pub outcome: Outcome,
    pub count: u64,
    pub simulated_pct: f64,
    pub expected_pct: f64,
}

/// One bet row of a `SimulationReport`, for a stake of 1 every round.
#[derive(Debug, Clone, Serialize)]
pub struct BetReport {
    pub bet_type: BetType,
    pub net_profit: i64,
    pub simulated_ev_pct: f64,
    pub expected_ev_pct: f64,
}

/// A struct for collecting a `SimulationSummary` into something that can serialize into JSON
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub total_rounds: u64,
    pub num_workers: usize,
    pub seed: u64,
    pub duration_ms: u128,
    pub rounds_per_second: f64,
    pub outcomes: Vec<OutcomeReport>,
    pub bets: Vec<BetReport>,
}

impl From<&SimulationSummary> for SimulationReport {
    fn from(summary: &SimulationSummary) -> Self {
        let outcomes = summary
            .outcome_counts
            .iter()
            .map(|(outcome, count)| OutcomeReport {
                outcome,
                count,
                simulated_pct: summary.percentage(outcome),
                expected_pct: reference_outcome(outcome),
            })
            .collect();
        let bets = REPORT_BETS
            .iter()
            .map(|&bet_type| BetReport {
                bet_type,
                net_profit: summary.net_profit(bet_type),
                simulated_ev_pct: summary.expected_value(bet_type),
                expected_ev_pct: reference_ev(bet_type),
            })
            .collect();
        SimulationReport {
            total_rounds: summary.total_rounds,
            num_workers: summary.num_workers,
            seed: summary.seed,
            duration_ms: summary.duration.as_millis(),
            rounds_per_second: summary.rounds_per_second(),
            outcomes,
            bets,
        }
    }
}

/// A public function to write the text report of `summary` to a writer
pub fn write_summary(
    summary: &SimulationSummary,
    mut writer: impl Write,
) -> Result<(), SimulationError> {
    writer.write_all(format_summary(summary).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Writes `summary` as a single JSON document followed by a newline
pub fn write_summary_json(
    summary: &SimulationSummary,
    mut writer: impl Write,
) -> Result<(), SimulationError> {
    serde_json::to_writer_pretty(&mut writer, &SimulationReport::from(summary))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutcomeCounts;
    use std::time::Duration;

    fn summary() -> SimulationSummary {
        let mut counts = OutcomeCounts::new();
        for (outcome, n) in [
            (Outcome::Player, 41),
            (Outcome::Panda8, 4),
            (Outcome::Banker, 43),
            (Outcome::Tie, 10),
            (Outcome::Dragon7, 2),
        ] {
            for _ in 0..n {
                counts.record(outcome);
            }
        }
        SimulationSummary {
            total_rounds: 100,
            outcome_counts: counts,
            duration: Duration::from_millis(5),
            num_workers: 2,
            seed: 9,
        }
    }

    #[test]
    fn reference_tables_are_complete() {
        let total: f64 = Outcome::ALL.iter().map(|o| reference_outcome(*o)).sum();
        assert!((total - 100.0).abs() < 0.001);
        assert!(BetType::ALL.iter().all(|b| reference_ev(*b) < 0.0));
    }

    #[test]
    fn text_report_lists_every_row() {
        let mut out = Vec::new();
        write_summary(&summary(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        for label in ["Player (total)", "Panda 8", "Banker (non-Dragon)", "Tie", "Dragon 7", "Total"] {
            assert!(text.contains(label), "missing {label}");
        }
        assert!(text.contains("45.0000%"));
        assert!(text.contains("44.6247%"));
    }

    #[test]
    fn json_report() {
        let mut out = Vec::new();
        write_summary_json(&summary(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total_rounds"], 100);
        assert_eq!(value["outcomes"].as_array().unwrap().len(), 5);
        assert_eq!(value["outcomes"][0]["outcome"], "Player");
        assert_eq!(value["bets"][0]["bet_type"], "Banker");
        // banker: 43 wins, 12 pushes (10 ties + 2 dragons), 45 losses
        assert_eq!(value["bets"][0]["net_profit"], -2);
    }
}
