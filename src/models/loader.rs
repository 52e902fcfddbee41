//! Model artifact loader

use crate::error::{Result, ScoringError};
use crate::models::artifact::{LinearModel, ModelArtifacts, Scaler};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// On-disk bundle layout. Every part is optional here so a missing part can
/// be reported by name rather than as a generic parse failure.
#[derive(Debug, Deserialize)]
struct ArtifactBundle {
    model: Option<LinearModel>,
    scaler: Option<Scaler>,
    features: Option<Vec<String>>,
    #[serde(rename = "cols_to_scale_", alias = "cols_to_scale")]
    cols_to_scale: Option<Vec<String>>,
}

/// Loader for bundled model artifacts
pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Load and validate the artifact bundle at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ModelArtifacts> {
        let path = path.as_ref();

        info!(path = %path.display(), "Loading model artifact");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::artifact(path, e.to_string()))?;

        let artifacts = Self::from_json_str(&contents, path)?;

        info!(
            features = artifacts.features.len(),
            scaled_columns = artifacts.cols_to_scale.len(),
            scaler = artifacts.scaler.kind(),
            "Model artifact loaded successfully"
        );

        Ok(artifacts)
    }

    /// Parse and validate an artifact bundle. `origin` is only used in errors.
    pub fn from_json_str<P: AsRef<Path>>(json: &str, origin: P) -> Result<ModelArtifacts> {
        let origin = origin.as_ref();

        let bundle: ArtifactBundle = serde_json::from_str(json)
            .map_err(|e| ScoringError::artifact(origin, format!("malformed bundle: {}", e)))?;

        let artifacts = ModelArtifacts {
            model: bundle
                .model
                .ok_or(ScoringError::MissingArtifactPart("model"))?,
            scaler: bundle
                .scaler
                .ok_or(ScoringError::MissingArtifactPart("scaler"))?,
            features: bundle
                .features
                .ok_or(ScoringError::MissingArtifactPart("features"))?,
            cols_to_scale: bundle
                .cols_to_scale
                .ok_or(ScoringError::MissingArtifactPart("cols_to_scale_"))?,
        };

        artifacts
            .validate()
            .map_err(|reason| ScoringError::artifact(origin, reason))?;

        debug!(features = ?artifacts.features, "Artifact feature order");

        Ok(artifacts)
    }
}
