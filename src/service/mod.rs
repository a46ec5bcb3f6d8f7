pub mod assigner;
pub mod builder;
pub mod family;
pub mod matcher;
pub mod relationship;
pub mod scorer;
pub mod threshold;

pub use assigner::{OptimalAssigner, ScoreMatrix};
pub use builder::MatchResultBuilder;
pub use family::{AcceptedMatch, FamilyValidator};
pub use matcher::{HouseholdInput, HouseholdMatcher};
pub use relationship::{compatible, normalize, RelationshipCategory};
pub use scorer::{AttributeScorer, ScoringContext};
pub use threshold::ThresholdCalculator;
