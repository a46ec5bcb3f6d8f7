use rayon::prelude::*;

use super::{GenealogyRepository, TranscriptionSource};
use crate::error::{MatchError, SourceError};
use crate::models::HouseholdMatch;
use crate::service::HouseholdMatcher;

/// Fetches each household from the collaborators and matches it. Nothing
/// is written back; the caller persists what it accepts.
pub struct MatchPipeline<'a, T, R> {
    matcher: &'a HouseholdMatcher,
    transcription: &'a T,
    repository: &'a R,
}

impl<'a, T, R> MatchPipeline<'a, T, R>
where
    T: TranscriptionSource,
    R: GenealogyRepository,
{
    pub fn new(matcher: &'a HouseholdMatcher, transcription: &'a T, repository: &'a R) -> Self {
        Self {
            matcher,
            transcription,
            repository,
        }
    }

    pub fn run_one(&self, household_id: &str) -> Result<HouseholdMatch, MatchError> {
        let source_err = |source: SourceError| MatchError::Source {
            household: household_id.to_string(),
            source,
        };

        let household = self.transcription.extracted_persons(household_id).map_err(source_err)?;
        let (candidates, edges) = self.repository.candidate_persons(household_id).map_err(source_err)?;

        self.matcher.match_household(&household, &candidates, &edges)
    }

    /// Households are independent; each runs on its own rayon worker.
    pub fn run(&self, household_ids: &[String]) -> Vec<Result<HouseholdMatch, MatchError>> {
        household_ids
            .par_iter()
            .map(|id| {
                let outcome = self.run_one(id);
                if let Err(e) = &outcome {
                    tracing::error!("Household {} matching failed: {}", id, e);
                }
                outcome
            })
            .collect()
    }
}
