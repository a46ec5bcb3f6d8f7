use serde::{Deserialize, Serialize};

use super::{EdgeKind, MatchStatistics, PersonId};

/// Per-attribute similarity. `None` means neutral: the attribute is missing
/// on at least one side and is left out of the composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub name: Option<f64>,
    pub relationship: Option<f64>,
    pub age: Option<f64>,
    pub sex: Option<f64>,
    pub position: Option<f64>,
}

/// One evaluated (row, candidate) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub line: u32,
    pub person_id: PersonId,
    pub scores: SubScores,
    pub composite: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// Empty name and empty relationship; never scored.
    MalformedRow,
    /// Nothing corroborates that the row belongs to a known person.
    NoSignal,
}

impl UnmatchedReason {
    pub fn describe(&self) -> &'static str {
        match self {
            UnmatchedReason::MalformedRow => "row has neither a name nor a relationship",
            UnmatchedReason::NoSignal => "no candidate reached the threshold and no name or relationship signal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched { person_id: PersonId, confidence: f64 },
    /// Present in the household but not linkable to a specific person.
    Witness,
    Unmatched { reason: UnmatchedReason },
}

/// Final verdict for one census row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub line: u32,
    pub name: String,
    pub outcome: MatchOutcome,
    /// Assigned pair, or the best-scoring pair for rows left unaccepted.
    pub best: Option<MatchCandidate>,
}

impl MatchResult {
    pub fn confidence(&self) -> Option<f64> {
        match self.outcome {
            MatchOutcome::Matched { confidence, .. } => Some(confidence),
            _ => None,
        }
    }

    pub fn person_id(&self) -> Option<PersonId> {
        match self.outcome {
            MatchOutcome::Matched { person_id, .. } => Some(person_id),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Matched { .. })
    }

    pub fn is_witness(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Witness)
    }

    pub fn is_unmatched(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Unmatched { .. })
    }
}

/// Two accepted matches whose census relationship contradicts the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyConflict {
    pub line_a: u32,
    pub line_b: u32,
    pub person_a: PersonId,
    pub person_b: PersonId,
    /// Relation of `person_a` towards `person_b` implied by the census.
    pub implied: EdgeKind,
    /// Relations of `person_a` towards `person_b` recorded in the tree.
    pub recorded: Vec<EdgeKind>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FamilyValidationResult {
    pub conflicts: Vec<FamilyConflict>,
    pub consistent: bool,
}

impl FamilyValidationResult {
    pub fn from_conflicts(conflicts: Vec<FamilyConflict>) -> Self {
        let consistent = conflicts.is_empty();
        Self { conflicts, consistent }
    }

    /// Conflicts that involve the given census line.
    pub fn for_line(&self, line: u32) -> impl Iterator<Item = &FamilyConflict> {
        self.conflicts
            .iter()
            .filter(move |c| c.line_a == line || c.line_b == line)
    }
}

/// Everything produced for one household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMatch {
    pub household_id: String,
    pub threshold: f64,
    pub completeness: f64,
    pub results: Vec<MatchResult>,
    pub validation: FamilyValidationResult,
    pub statistics: MatchStatistics,
}

impl HouseholdMatch {
    pub fn result_for_line(&self, line: u32) -> Option<&MatchResult> {
        self.results.iter().find(|r| r.line == line)
    }
}
