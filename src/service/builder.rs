use super::assigner::ScoreMatrix;
use super::relationship::normalize;
use crate::config::MatchConfig;
use crate::models::{
    ExtractedPerson, FamilyValidationResult, MatchCandidate, MatchOutcome, MatchResult,
    MatchStatistics, UnmatchedReason,
};

/// Turns the thresholded assignment into one `MatchResult` per census row.
pub struct MatchResultBuilder<'a> {
    config: &'a MatchConfig,
}

impl<'a> MatchResultBuilder<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        Self { config }
    }

    /// `persons` is in line order; `row_of[i]` is the score-matrix row of
    /// `persons[i]`, or `None` for rows excluded from scoring.
    pub fn build(
        &self,
        persons: &[&ExtractedPerson],
        row_of: &[Option<usize>],
        matrix: &ScoreMatrix,
        assignment: &[Option<usize>],
    ) -> Vec<MatchResult> {
        persons
            .iter()
            .zip(row_of)
            .map(|(person, row)| {
                let name = person.name.to_string();
                let Some(row) = *row else {
                    return MatchResult {
                        line: person.line,
                        name,
                        outcome: MatchOutcome::Unmatched { reason: UnmatchedReason::MalformedRow },
                        best: None,
                    };
                };

                if let Some(col) = assignment.get(row).copied().flatten() {
                    let pair = matrix.get(row, col).clone();
                    return MatchResult {
                        line: person.line,
                        name,
                        outcome: MatchOutcome::Matched {
                            person_id: pair.person_id,
                            confidence: pair.composite,
                        },
                        best: Some(pair),
                    };
                }

                let best = matrix.best_in_row(row).cloned();
                let outcome = if self.has_presence_signal(person, matrix.row(row)) {
                    MatchOutcome::Witness
                } else {
                    MatchOutcome::Unmatched { reason: UnmatchedReason::NoSignal }
                };
                MatchResult { line: person.line, name, outcome, best }
            })
            .collect()
    }

    /// A recognised relationship label, or a name or relationship that
    /// resembles anyone in the pool, corroborates that the row belongs to
    /// the household. Every pair of the row counts, not just the best one.
    fn has_presence_signal(&self, person: &ExtractedPerson, pairs: &[MatchCandidate]) -> bool {
        if normalize(&person.relationship).is_recognized() {
            return true;
        }
        let floor = self.config.witness_name_floor;
        pairs.iter().any(|pair| {
            pair.scores.name.is_some_and(|s| s >= floor)
                || pair.scores.relationship.is_some_and(|s| s > 0.0)
        })
    }

    pub fn statistics(results: &[MatchResult], validation: &FamilyValidationResult) -> MatchStatistics {
        MatchStatistics::from_results(results, validation.conflicts.len())
    }
}
