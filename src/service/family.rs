use super::relationship::RelationshipCategory;
use crate::models::{EdgeKind, FamilyConflict, FamilyGraph, FamilyValidationResult, PersonId};

/// An accepted row as the validator sees it.
#[derive(Debug, Clone, Copy)]
pub struct AcceptedMatch {
    pub line: u32,
    pub relationship: RelationshipCategory,
    pub person_id: PersonId,
}

/// Relation of `a` towards `b` implied by their relationships to the same head.
pub fn implied_relation(a: RelationshipCategory, b: RelationshipCategory) -> Option<EdgeKind> {
    use RelationshipCategory::*;
    match (a, b) {
        (Head, Spouse) | (Spouse, Head) => Some(EdgeKind::Spouse),
        (Head, Child) | (Spouse, Child) => Some(EdgeKind::ParentOf),
        (Child, Head) | (Child, Spouse) => Some(EdgeKind::ChildOf),
        (Child, Child) => Some(EdgeKind::Sibling),
        (Head, Parent) => Some(EdgeKind::ChildOf),
        (Parent, Head) => Some(EdgeKind::ParentOf),
        (Head, Sibling) | (Sibling, Head) | (Sibling, Sibling) => Some(EdgeKind::Sibling),
        (Parent, Sibling) => Some(EdgeKind::ParentOf),
        (Sibling, Parent) => Some(EdgeKind::ChildOf),
        _ => None,
    }
}

/// Cross-checks accepted matches against recorded family edges. Only
/// annotates; never changes an assignment.
pub struct FamilyValidator<'a> {
    graph: &'a FamilyGraph,
}

impl<'a> FamilyValidator<'a> {
    pub fn new(graph: &'a FamilyGraph) -> Self {
        Self { graph }
    }

    pub fn validate(&self, accepted: &[AcceptedMatch]) -> FamilyValidationResult {
        let mut conflicts = Vec::new();

        for (i, a) in accepted.iter().enumerate() {
            for b in &accepted[i + 1..] {
                let Some(implied) = implied_relation(a.relationship, b.relationship) else {
                    continue;
                };
                // No recorded edge is fine: the tree may simply be incomplete.
                let Some(recorded) = self.graph.relations(a.person_id, b.person_id) else {
                    continue;
                };
                if recorded.contains(&implied) {
                    continue;
                }

                tracing::warn!(
                    line_a = a.line,
                    line_b = b.line,
                    person_a = %a.person_id,
                    person_b = %b.person_id,
                    implied = ?implied,
                    recorded = ?recorded,
                    "census relationship contradicts recorded family edge"
                );
                conflicts.push(FamilyConflict {
                    line_a: a.line,
                    line_b: b.line,
                    person_a: a.person_id,
                    person_b: b.person_id,
                    implied,
                    recorded: recorded.iter().copied().collect(),
                });
            }
        }

        FamilyValidationResult::from_conflicts(conflicts)
    }
}
