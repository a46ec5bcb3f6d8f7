pub mod candidate;
pub mod family;
pub mod person;
pub mod result;
pub mod stats;

pub use candidate::CandidateSet;
pub use family::{EdgeKind, FamilyEdge, FamilyGraph, FamilyLink};
pub use person::{CandidatePerson, CensusHousehold, ExtractedPerson, PersonId, PersonName, Sex};
pub use result::{
    FamilyConflict, FamilyValidationResult, HouseholdMatch, MatchCandidate, MatchOutcome,
    MatchResult, SubScores, UnmatchedReason,
};
pub use stats::{BatchSummary, MatchStatistics, ScoreDistribution};
