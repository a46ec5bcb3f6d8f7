use serde::{Deserialize, Serialize};

use super::{MatchOutcome, MatchResult};

/// min / median / max of accepted confidences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl ScoreDistribution {
    /// `None` when there are no scores.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            min: sorted[0],
            median,
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Per-household counts and score spread.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub total: usize,
    pub matched: usize,
    pub witness: usize,
    pub unmatched: usize,
    pub conflicts: usize,
    pub scores: Option<ScoreDistribution>,
}

impl MatchStatistics {
    pub fn from_results(results: &[MatchResult], conflicts: usize) -> Self {
        let mut stats = Self {
            total: results.len(),
            conflicts,
            ..Self::default()
        };
        let mut accepted = Vec::new();

        for result in results {
            match result.outcome {
                MatchOutcome::Matched { confidence, .. } => {
                    stats.matched += 1;
                    accepted.push(confidence);
                }
                MatchOutcome::Witness => stats.witness += 1,
                MatchOutcome::Unmatched { .. } => stats.unmatched += 1,
            }
        }

        stats.scores = ScoreDistribution::from_scores(&accepted);
        stats
    }
}

/// Totals across many households. Merging is order independent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub households: usize,
    pub failed_households: usize,
    pub total: usize,
    pub matched: usize,
    pub witness: usize,
    pub unmatched: usize,
    pub conflicts: usize,
    pub inconsistent_households: usize,
    accepted_scores: Vec<f64>,
}

impl BatchSummary {
    pub fn record(&mut self, household: &super::HouseholdMatch) {
        let stats = &household.statistics;
        self.households += 1;
        self.total += stats.total;
        self.matched += stats.matched;
        self.witness += stats.witness;
        self.unmatched += stats.unmatched;
        self.conflicts += stats.conflicts;
        if !household.validation.consistent {
            self.inconsistent_households += 1;
        }
        self.accepted_scores
            .extend(household.results.iter().filter_map(|r| r.confidence()));
    }

    pub fn record_failure(&mut self) {
        self.failed_households += 1;
    }

    pub fn merge(mut self, other: BatchSummary) -> BatchSummary {
        self.households += other.households;
        self.failed_households += other.failed_households;
        self.total += other.total;
        self.matched += other.matched;
        self.witness += other.witness;
        self.unmatched += other.unmatched;
        self.conflicts += other.conflicts;
        self.inconsistent_households += other.inconsistent_households;
        self.accepted_scores.extend(other.accepted_scores);
        self
    }

    pub fn scores(&self) -> Option<ScoreDistribution> {
        ScoreDistribution::from_scores(&self.accepted_scores)
    }
}
