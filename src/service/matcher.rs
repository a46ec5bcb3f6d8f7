use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::assigner::{OptimalAssigner, ScoreMatrix};
use super::builder::MatchResultBuilder;
use super::family::{AcceptedMatch, FamilyValidator};
use super::relationship::{normalize, RelationshipCategory};
use super::scorer::{AttributeScorer, ScoringContext};
use super::threshold::ThresholdCalculator;
use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::models::{
    BatchSummary, CandidatePerson, CandidateSet, CensusHousehold, ExtractedPerson, FamilyEdge,
    FamilyGraph, HouseholdMatch, PersonId,
};

/// Everything one household needs, as supplied by the collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdInput {
    pub household: CensusHousehold,
    #[serde(default)]
    pub candidates: Vec<CandidatePerson>,
    #[serde(default)]
    pub edges: Vec<FamilyEdge>,
}

/// Household matching engine. Holds only immutable configuration, so one
/// instance can serve any number of households concurrently.
#[derive(Debug, Clone)]
pub struct HouseholdMatcher {
    config: MatchConfig,
}

impl HouseholdMatcher {
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Match every census row of one household against the candidates.
    ///
    /// Always yields one result per row for well-formed input; only
    /// duplicate candidate ids or duplicate line numbers are errors.
    pub fn match_household(
        &self,
        household: &CensusHousehold,
        candidates: &[CandidatePerson],
        edges: &[FamilyEdge],
    ) -> Result<HouseholdMatch, MatchError> {
        // Phase 1: structural checks
        let mut lines = BTreeSet::new();
        for person in &household.persons {
            if !lines.insert(person.line) {
                return Err(MatchError::DuplicateLine { line: person.line });
            }
        }
        let candidates = CandidateSet::new(candidates.to_vec())?;
        let graph = FamilyGraph::build(edges, candidates.iter());

        // Phase 2: split malformed rows off, keep line order
        let mut persons: Vec<&ExtractedPerson> = household.persons.iter().collect();
        persons.sort_by_key(|p| p.line);

        let mut scored: Vec<&ExtractedPerson> = Vec::with_capacity(persons.len());
        let row_of: Vec<Option<usize>> = persons
            .iter()
            .map(|&p| {
                if p.is_malformed() {
                    tracing::warn!(
                        household = %household.household_id,
                        line = p.line,
                        "row has neither name nor relationship, excluded from scoring"
                    );
                    None
                } else {
                    scored.push(p);
                    Some(scored.len() - 1)
                }
            })
            .collect();

        // Phase 3: household context and threshold, over scoreable rows only
        let completeness = household.completeness();
        let threshold = ThresholdCalculator::new(&self.config.threshold).threshold(
            scored.len(),
            candidates.len(),
            completeness,
        );
        let ctx = ScoringContext {
            census_year: household.census_year,
            head_line: head_line(&scored),
            graph: &graph,
        };

        tracing::info!(
            household = %household.household_id,
            rows = persons.len(),
            scored = scored.len(),
            candidates = candidates.len(),
            threshold,
            completeness,
            "matching household"
        );

        // Phase 4: score matrix
        let scorer = AttributeScorer::new(&self.config);
        let matrix = ScoreMatrix {
            cells: scored
                .iter()
                .map(|p| candidates.iter().map(|c| scorer.score(p, c, &ctx)).collect())
                .collect(),
        };
        for pair in matrix.cells.iter().flatten() {
            tracing::debug!(
                line = pair.line,
                person = %pair.person_id,
                composite = pair.composite,
                scores = ?pair.scores,
                "scored pair"
            );
        }

        // Phase 5: optimal assignment + threshold
        let ids: Vec<PersonId> = candidates.iter().map(|c| c.id).collect();
        let assignment = OptimalAssigner::new(&graph).assign(&matrix, &ids, threshold);

        // Phase 6: family validation over accepted pairs
        let accepted: Vec<AcceptedMatch> = scored
            .iter()
            .zip(&assignment)
            .filter_map(|(p, slot)| {
                slot.map(|col| AcceptedMatch {
                    line: p.line,
                    relationship: normalize(&p.relationship),
                    person_id: ids[col],
                })
            })
            .collect();
        let validation = FamilyValidator::new(&graph).validate(&accepted);

        // Phase 7: results
        let builder = MatchResultBuilder::new(&self.config);
        let results = builder.build(&persons, &row_of, &matrix, &assignment);
        let statistics = MatchResultBuilder::statistics(&results, &validation);

        tracing::info!(
            household = %household.household_id,
            matched = statistics.matched,
            witness = statistics.witness,
            unmatched = statistics.unmatched,
            conflicts = statistics.conflicts,
            "household matched"
        );

        Ok(HouseholdMatch {
            household_id: household.household_id.clone(),
            threshold,
            completeness,
            results,
            validation,
            statistics,
        })
    }

    /// One worker per household; output order follows `inputs`.
    pub fn match_households(&self, inputs: &[HouseholdInput]) -> Vec<Result<HouseholdMatch, MatchError>> {
        inputs
            .par_iter()
            .map(|input| self.match_household(&input.household, &input.candidates, &input.edges))
            .collect()
    }

    /// Reduce per-household outcomes; failures are counted, not dropped.
    pub fn summarize(outcomes: &[Result<HouseholdMatch, MatchError>]) -> BatchSummary {
        outcomes
            .par_iter()
            .map(|outcome| {
                let mut summary = BatchSummary::default();
                match outcome {
                    Ok(household) => summary.record(household),
                    Err(_) => summary.record_failure(),
                }
                summary
            })
            .reduce(BatchSummary::default, BatchSummary::merge)
    }
}

/// Line of the row labelled head; census convention lists the head first
/// when no row carries the label.
fn head_line(rows: &[&ExtractedPerson]) -> Option<u32> {
    rows.iter()
        .find(|p| normalize(&p.relationship) == RelationshipCategory::Head)
        .or_else(|| rows.first())
        .map(|p| p.line)
}
