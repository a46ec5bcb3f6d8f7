//! Links persons transcribed from one census household to existing people in
//! a family tree: per-attribute scoring, a globally optimal one-to-one
//! assignment, a household-specific acceptance threshold, and a check of the
//! result against recorded family edges.
//!
//! The engine is synchronous and keeps no state between households.

pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod sources;
pub mod telemetry;

pub use config::{AppConfig, MatchConfig};
pub use error::{MatchError, SourceError};
pub use models::{HouseholdMatch, MatchOutcome, MatchResult, MatchStatistics};
pub use service::{HouseholdInput, HouseholdMatcher};
