//! Read-only collaborator interfaces and the per-household driver that
//! pulls from them.

pub mod memory;
pub mod pipeline;

pub use memory::InMemorySource;
pub use pipeline::MatchPipeline;

use crate::error::SourceError;
use crate::models::{CandidatePerson, CensusHousehold, FamilyEdge};

/// Transcription service: census rows per household.
pub trait TranscriptionSource: Send + Sync {
    fn extracted_persons(&self, household_id: &str) -> Result<CensusHousehold, SourceError>;
}

/// Family-tree repository: candidates and their recorded edges per household.
/// Query-only; nothing here can write to the tree.
pub trait GenealogyRepository: Send + Sync {
    fn candidate_persons(
        &self,
        household_id: &str,
    ) -> Result<(Vec<CandidatePerson>, Vec<FamilyEdge>), SourceError>;
}
