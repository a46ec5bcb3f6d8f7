use indexmap::IndexMap;

use super::{GenealogyRepository, TranscriptionSource};
use crate::error::{MatchError, SourceError};
use crate::models::{CandidatePerson, CensusHousehold, FamilyEdge};
use crate::service::HouseholdInput;

/// Households held in memory, typically loaded from a JSON fixture.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    households: IndexMap<String, HouseholdInput>,
}

impl InMemorySource {
    pub fn new(inputs: Vec<HouseholdInput>) -> Self {
        let households = inputs
            .into_iter()
            .map(|input| (input.household.household_id.clone(), input))
            .collect();
        Self { households }
    }

    /// A JSON array of `{ household, candidates, edges }` objects.
    pub fn from_json(text: &str) -> Result<Self, MatchError> {
        let inputs: Vec<HouseholdInput> = serde_json::from_str(text).map_err(|e| MatchError::Source {
            household: "<fixture>".into(),
            source: SourceError::from(e),
        })?;
        Ok(Self::new(inputs))
    }

    pub fn household_ids(&self) -> Vec<String> {
        self.households.keys().cloned().collect()
    }

    fn lookup(&self, household_id: &str) -> Result<&HouseholdInput, SourceError> {
        self.households
            .get(household_id)
            .ok_or_else(|| SourceError::NotFound(household_id.to_string()))
    }
}

impl TranscriptionSource for InMemorySource {
    fn extracted_persons(&self, household_id: &str) -> Result<CensusHousehold, SourceError> {
        self.lookup(household_id).map(|input| input.household.clone())
    }
}

impl GenealogyRepository for InMemorySource {
    fn candidate_persons(
        &self,
        household_id: &str,
    ) -> Result<(Vec<CandidatePerson>, Vec<FamilyEdge>), SourceError> {
        self.lookup(household_id)
            .map(|input| (input.candidates.clone(), input.edges.clone()))
    }
}
