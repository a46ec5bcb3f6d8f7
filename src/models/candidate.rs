use indexmap::IndexMap;

use super::{CandidatePerson, PersonId};
use crate::error::MatchError;

/// Candidates offered for one household, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    persons: IndexMap<PersonId, CandidatePerson>,
}

impl CandidateSet {
    /// Rejects duplicate ids; the order of `candidates` does not matter.
    pub fn new(candidates: Vec<CandidatePerson>) -> Result<Self, MatchError> {
        let mut persons = IndexMap::with_capacity(candidates.len());
        for candidate in candidates {
            let id = candidate.id;
            if persons.insert(id, candidate).is_some() {
                return Err(MatchError::DuplicateCandidate { id });
            }
        }
        persons.sort_keys();
        Ok(Self { persons })
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidatePerson> {
        self.persons.values()
    }
}
