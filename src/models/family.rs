use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{CandidatePerson, PersonId};

/// Directed relation "a <kind> b" as recorded in the family tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Spouse,
    ParentOf,
    ChildOf,
    Sibling,
}

impl EdgeKind {
    /// The same relation seen from the other end.
    pub fn inverse(self) -> Self {
        match self {
            EdgeKind::ParentOf => EdgeKind::ChildOf,
            EdgeKind::ChildOf => EdgeKind::ParentOf,
            other => other,
        }
    }
}

/// A recorded family edge. Read-only input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyEdge {
    pub person_a: PersonId,
    pub person_b: PersonId,
    pub kind: EdgeKind,
}

impl FamilyEdge {
    pub fn new(person_a: i64, kind: EdgeKind, person_b: i64) -> Self {
        Self {
            person_a: PersonId(person_a),
            person_b: PersonId(person_b),
            kind,
        }
    }
}

/// A candidate's own view of one edge: "candidate <kind> other".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyLink {
    pub kind: EdgeKind,
    pub other: PersonId,
}

/// Both-direction index over every edge known for a household.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    relations: BTreeMap<(PersonId, PersonId), BTreeSet<EdgeKind>>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the explicit edge list with the links carried on each candidate.
    pub fn build<'a>(
        edges: &[FamilyEdge],
        candidates: impl IntoIterator<Item = &'a CandidatePerson>,
    ) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert(edge.person_a, edge.kind, edge.person_b);
        }
        for candidate in candidates {
            for link in &candidate.family {
                graph.insert(candidate.id, link.kind, link.other);
            }
        }
        graph
    }

    pub fn insert(&mut self, a: PersonId, kind: EdgeKind, b: PersonId) {
        if a == b {
            return;
        }
        self.relations.entry((a, b)).or_default().insert(kind);
        self.relations.entry((b, a)).or_default().insert(kind.inverse());
    }

    /// Recorded relations of `a` towards `b`.
    pub fn relations(&self, a: PersonId, b: PersonId) -> Option<&BTreeSet<EdgeKind>> {
        self.relations.get(&(a, b)).filter(|set| !set.is_empty())
    }

    /// Every relation kind `a` holds towards anyone.
    pub fn kinds_of(&self, a: PersonId) -> BTreeSet<EdgeKind> {
        self.relations
            .range((a, PersonId(i64::MIN))..=(a, PersonId(i64::MAX)))
            .flat_map(|(_, kinds)| kinds.iter().copied())
            .collect()
    }

    pub fn connected(&self, a: PersonId, b: PersonId) -> bool {
        self.relations(a, b).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
