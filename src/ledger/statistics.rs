//! Statistics over the whole bet history.
//!
//! The summary is recomputed from every stored bet on each call. Empty input
//! and empty win/loss partitions yield zeros instead of errors.

use nonempty::NonEmpty;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::ledger::error::LedgerResult;
use crate::ledger::storage::LedgerStorage;
use crate::ledger::time::format_display;
use crate::types::{Bet, Status};

/// Max, mean and min of the outcome magnitudes in one status partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PartitionStats {
    pub max: f64,
    pub mean: f64,
    pub min: f64,
}

impl PartitionStats {
    fn from_outcomes(outcomes: Vec<f64>) -> Self {
        let Some(outcomes) = NonEmpty::from_vec(outcomes) else {
            return Self::default();
        };

        let head = outcomes.head;
        let max = outcomes.iter().copied().fold(head, f64::max);
        let min = outcomes.iter().copied().fold(head, f64::min);
        let mean = outcomes.iter().sum::<f64>() / outcomes.len() as f64;

        Self {
            max: round2(max),
            mean: round2(mean),
            min: round2(min),
        }
    }
}

/// Summary of the stored bets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerStatistics {
    /// Earliest bet, `dd/mm/YYYY HH:MM`
    pub first_bet_at: Option<String>,
    /// Latest bet, `dd/mm/YYYY HH:MM`
    pub last_bet_at: Option<String>,
    pub total_bets: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Share of bets classified as a loss, in percent
    pub loss_probability_pct: f64,
    pub wins: PartitionStats,
    pub losses: PartitionStats,
}

/// Compute the summary of a set of bets. Order of the input does not matter.
pub fn summarize(bets: &[Bet]) -> LedgerStatistics {
    if bets.is_empty() {
        return LedgerStatistics::default();
    }

    let first = bets.iter().map(|b| b.placed_at).min();
    let last = bets.iter().map(|b| b.placed_at).max();

    let (won, lost): (Vec<&Bet>, Vec<&Bet>) = bets.iter().partition(|b| b.status == Status::Win);
    let loss_probability = lost.len() as f64 / bets.len() as f64 * 100.0;

    LedgerStatistics {
        first_bet_at: first.as_ref().map(format_display),
        last_bet_at: last.as_ref().map(format_display),
        total_bets: bets.len(),
        win_count: won.len(),
        loss_count: lost.len(),
        loss_probability_pct: round2(loss_probability),
        wins: PartitionStats::from_outcomes(won.iter().map(|b| b.outcome_pct).collect()),
        losses: PartitionStats::from_outcomes(lost.iter().map(|b| b.outcome_pct).collect()),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// StatisticsAggregator reads the full bet history from storage and summarizes it
pub struct StatisticsAggregator {
    storage: Arc<dyn LedgerStorage>,
}

impl StatisticsAggregator {
    pub fn new(storage: Arc<dyn LedgerStorage>) -> Self {
        Self { storage }
    }

    pub async fn compute(&self) -> LedgerResult<LedgerStatistics> {
        let bets = self.storage.list_bets().await?;
        let statistics = summarize(&bets);

        info!(
            "Statistics over {} bets: loss probability {:.2}%",
            statistics.total_bets, statistics.loss_probability_pct
        );

        Ok(statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::classifier::classify;
    use crate::ledger::time::parse_timestamp;
    use crate::types::{Subject, Wager};

    fn bet(id: i64, at: &str, wager: Wager) -> Bet {
        let outcome = classify(&wager).unwrap();
        let placed_at = parse_timestamp(at).unwrap();
        Bet {
            id,
            placed_at,
            placed_at_display: format_display(&placed_at),
            subject: Subject::Game { game: format!("game {}", id) },
            method_id: 1,
            method_name: "lay 0x1".into(),
            wager,
            outcome_pct: outcome.outcome_pct,
            status: outcome.status,
        }
    }

    fn stake(id: i64, at: &str, stake: f64, return_amount: f64) -> Bet {
        bet(id, at, Wager::StakeReturn { stake, return_amount })
    }

    fn profit(id: i64, at: &str, profit_or_loss: f64) -> Bet {
        bet(id, at, Wager::RiskProfit { risk: 10.0, profit_or_loss })
    }

    #[test]
    fn test_empty_history() {
        let stats = summarize(&[]);
        assert_eq!(stats, LedgerStatistics::default());
        assert!(stats.first_bet_at.is_none());
        assert!(stats.last_bet_at.is_none());
        assert_eq!(stats.loss_probability_pct, 0.0);
    }

    #[test]
    fn test_stake_return_scenario() {
        let bets = vec![
            stake(1, "2024-05-02T18:00", 10.0, 15.0),
            stake(2, "2024-05-01T16:30", 20.0, 20.0),
            stake(3, "2024-05-03T21:45", 5.0, 0.0),
        ];
        let stats = summarize(&bets);

        assert_eq!(stats.total_bets, 3);
        assert_eq!(stats.win_count, 1);
        assert_eq!(stats.loss_count, 2);
        assert_eq!(stats.loss_probability_pct, 66.67);
        assert_eq!(stats.wins, PartitionStats { max: 50.0, mean: 50.0, min: 50.0 });
        assert_eq!(stats.losses, PartitionStats { max: 100.0, mean: 50.0, min: 0.0 });
        assert_eq!(stats.first_bet_at.as_deref(), Some("01/05/2024 16:30"));
        assert_eq!(stats.last_bet_at.as_deref(), Some("03/05/2024 21:45"));
    }

    #[test]
    fn test_only_wins_leaves_loss_partition_zeroed() {
        let bets = vec![
            profit(1, "2024-05-01T10:00", 8.0),
            profit(2, "2024-05-01T11:00", 3.5),
        ];
        let stats = summarize(&bets);

        assert_eq!(stats.loss_probability_pct, 0.0);
        assert_eq!(stats.losses, PartitionStats::default());
        assert_eq!(stats.wins, PartitionStats { max: 8.0, mean: 5.75, min: 3.5 });
    }

    #[test]
    fn test_one_loss_in_three() {
        let bets = vec![
            profit(1, "2024-05-01T10:00", 8.0),
            profit(2, "2024-05-01T11:00", -15.0),
            profit(3, "2024-05-01T12:00", 2.0),
        ];
        let stats = summarize(&bets);

        assert_eq!(stats.loss_probability_pct, 33.33);
        assert_eq!(stats.losses, PartitionStats { max: 15.0, mean: 15.0, min: 15.0 });
    }

    #[test]
    fn test_values_rounded_to_two_decimals() {
        let bets = vec![
            stake(1, "2024-05-01T10:00", 3.0, 4.0),
            stake(2, "2024-05-01T11:00", 3.0, 5.0),
        ];
        let stats = summarize(&bets);

        assert_eq!(stats.wins.min, 33.33);
        assert_eq!(stats.wins.max, 66.67);
        assert_eq!(stats.wins.mean, 50.0);
    }

    #[test]
    fn test_input_order_is_irrelevant() {
        let mut bets = vec![
            stake(1, "2024-05-02T18:00", 10.0, 15.0),
            stake(2, "2024-05-01T16:30", 20.0, 20.0),
            stake(3, "2024-05-03T21:45", 5.0, 0.0),
        ];
        let forward = summarize(&bets);
        bets.reverse();
        assert_eq!(summarize(&bets), forward);
    }
}
