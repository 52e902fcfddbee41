//! End-to-end prediction over one shared artifact

use crate::config::AppConfig;
use crate::error::{Result, ScoringError};
use crate::feature_builder::{FeatureBuilder, FeaturePolicy, FeatureVector};
use crate::models::artifact::ModelArtifacts;
use crate::models::loader::ArtifactLoader;
use crate::models::scorer::{ScoreScale, Scorer};
use crate::types::applicant::ApplicantRecord;
use crate::types::prediction::{PredictionResult, RatingBands};
use std::sync::Arc;
use tracing::info;

const IN_MEMORY_ORIGIN: &str = "<in-memory>";

/// Feature builder and scorer wired to the same immutable artifact.
///
/// Holds no mutable state, so one instance can serve any number of callers.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: Arc<ModelArtifacts>,
    builder: FeatureBuilder,
    scorer: Scorer,
}

impl Predictor {
    /// Wire a builder and scorer to `artifacts`, refusing parts that disagree in shape.
    pub fn new(
        artifacts: Arc<ModelArtifacts>,
        policy: FeaturePolicy,
        scale: ScoreScale,
        bands: RatingBands,
    ) -> Result<Self> {
        artifacts
            .validate()
            .map_err(|reason| ScoringError::artifact(IN_MEMORY_ORIGIN, reason))?;

        Ok(Self {
            builder: FeatureBuilder::new(artifacts.clone(), policy),
            scorer: Scorer::new(artifacts.clone(), scale, bands),
            artifacts,
        })
    }

    /// Predictor with default feature policy, score scale and bands
    pub fn with_defaults(artifacts: Arc<ModelArtifacts>) -> Result<Self> {
        Self::new(
            artifacts,
            FeaturePolicy::default(),
            ScoreScale::default(),
            RatingBands::default(),
        )
    }

    /// Load the configured artifact and build a predictor from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let artifacts = Arc::new(ArtifactLoader::load(&config.artifacts.path)?);

        info!(
            base_score = config.scoring.base_score,
            scale_length = config.scoring.scale_length,
            missing_columns = ?config.features.missing_columns,
            "Predictor initialized"
        );

        Self::new(
            artifacts,
            config.features.clone(),
            config.scoring.score_scale(),
            config.scoring.rating_bands.clone(),
        )
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Build features for the record and score them.
    pub fn predict(&self, record: &ApplicantRecord) -> Result<PredictionResult> {
        let features = self.build_features(record)?;
        self.scorer.score(&features)
    }

    pub fn build_features(&self, record: &ApplicantRecord) -> Result<FeatureVector> {
        self.builder.build(record)
    }
}
