use thiserror::Error;

use crate::models::PersonId;

/// Caller-side failures. Data-quality problems never end up here; they are
/// reported as `Unmatched` outcomes or family conflicts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("candidate {id} appears more than once in the household")]
    DuplicateCandidate { id: PersonId },

    #[error("census line {line} appears more than once in the household")]
    DuplicateLine { line: u32 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("source failed for household {household}: {source}")]
    Source {
        household: String,
        #[source]
        source: SourceError,
    },
}

/// Failures reported by the transcription service or the family-tree
/// repository.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    #[error("household {0} not found")]
    NotFound(String),

    #[error("could not decode source data: {0}")]
    Decode(String),

    #[error("backend unavailable: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

impl MatchError {
    /// True for errors caused by malformed input rather than by a collaborator.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            MatchError::DuplicateCandidate { .. } | MatchError::DuplicateLine { .. }
        )
    }
}

impl From<config::ConfigError> for MatchError {
    fn from(err: config::ConfigError) -> Self {
        MatchError::Config(err.to_string())
    }
}
