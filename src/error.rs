//! Error types for the scoring pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading artifacts, preparing features or scoring.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Artifact file could not be read or parsed, or its parts disagree in shape
    #[error("failed to load model artifact {}: {reason}", .path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// Artifact bundle lacks one of `model`, `scaler`, `features`, `cols_to_scale_`
    #[error("model artifact is missing required part `{0}`")]
    MissingArtifactPart(&'static str),

    /// Applicant field outside its domain
    #[error("invalid `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Feature vector does not line up with the artifact's feature list
    #[error("feature schema mismatch at {stage}: {reason}")]
    SchemaMismatch { stage: &'static str, reason: String },
}

impl ScoringError {
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ScoringError::ArtifactLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ScoringError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn schema(stage: &'static str, reason: impl Into<String>) -> Self {
        ScoringError::SchemaMismatch {
            stage,
            reason: reason.into(),
        }
    }

    /// Whether the error happened before any prediction could be attempted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScoringError::ArtifactLoad { .. } | ScoringError::MissingArtifactPart(_)
        )
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, ScoringError>;
