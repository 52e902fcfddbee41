//! Logistic scoring: decision value, default probability, credit score and rating

use crate::error::{Result, ScoringError};
use crate::feature_builder::FeatureVector;
use crate::models::artifact::ModelArtifacts;
use crate::types::prediction::{PredictionResult, Rating, RatingBands};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Affine mapping from non-default probability onto the credit score range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    /// Score of a certain default
    pub base_score: f64,
    /// Width of the score range
    pub scale_length: f64,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            base_score: 300.0,
            scale_length: 600.0,
        }
    }
}

impl ScoreScale {
    pub fn credit_score(&self, non_default_probability: f64) -> f64 {
        self.base_score + non_default_probability * self.scale_length
    }
}

/// Logistic function that never overflows: the exponent is always non-positive.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Scores prepared feature vectors with the artifact's linear model
#[derive(Debug, Clone)]
pub struct Scorer {
    artifacts: Arc<ModelArtifacts>,
    scale: ScoreScale,
    bands: RatingBands,
}

impl Scorer {
    pub fn new(artifacts: Arc<ModelArtifacts>, scale: ScoreScale, bands: RatingBands) -> Self {
        Self {
            artifacts,
            scale,
            bands,
        }
    }

    /// Scorer with the 300-900 scale and default rating bands
    pub fn with_defaults(artifacts: Arc<ModelArtifacts>) -> Self {
        Self::new(artifacts, ScoreScale::default(), RatingBands::default())
    }

    /// Score a feature vector built against the same artifact.
    pub fn score(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let decision = self.decision_value(features)?;
        let result = self.score_decision(decision);

        debug!(
            decision_value = decision,
            default_probability = result.default_probability,
            credit_score = result.credit_score,
            rating = %result.rating,
            "Applicant scored"
        );

        Ok(result)
    }

    /// Log-odds of default, after checking the vector matches the model's columns.
    pub fn decision_value(&self, features: &FeatureVector) -> Result<f64> {
        self.check_schema(features)?;

        if let Some((name, value)) = features.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ScoringError::schema(
                "scoring",
                format!("feature `{}` is not finite ({})", name, value),
            ));
        }

        let decision = self.artifacts.model.decision_function(features.values());
        if !decision.is_finite() {
            return Err(ScoringError::schema(
                "scoring",
                format!("decision value is not finite ({})", decision),
            ));
        }
        Ok(decision)
    }

    /// Map a decision value to probability, score and rating.
    pub fn score_decision(&self, decision: f64) -> PredictionResult {
        let default_probability = sigmoid(decision);
        let non_default_probability = 1.0 - default_probability;
        let raw_credit_score = self.scale.credit_score(non_default_probability);

        PredictionResult {
            default_probability,
            credit_score: raw_credit_score as i64,
            raw_credit_score,
            rating: Rating::from_score(raw_credit_score, &self.bands),
        }
    }

    fn check_schema(&self, features: &FeatureVector) -> Result<()> {
        let expected = &self.artifacts.features;
        let coefficients = self.artifacts.model.coefficients.len();

        if coefficients != expected.len() {
            return Err(ScoringError::schema(
                "scoring",
                format!(
                    "model has {} coefficients but {} features",
                    coefficients,
                    expected.len()
                ),
            ));
        }

        if features.len() != expected.len() {
            return Err(ScoringError::schema(
                "scoring",
                format!("expected {} features, got {}", expected.len(), features.len()),
            ));
        }

        if let Some((position, (got, want))) = features
            .names()
            .iter()
            .zip(expected)
            .enumerate()
            .find(|(_, (got, want))| got != want)
        {
            return Err(ScoringError::schema(
                "scoring",
                format!("column {} is `{}`, model expects `{}`", position, got, want),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_builder::{FeatureBuilder, FeaturePolicy};
    use crate::models::artifact::{LinearModel, Scaler};
    use crate::types::applicant::ApplicantRecord;

    fn artifacts(features: &[&str], coefficients: Vec<f64>, intercept: f64) -> Arc<ModelArtifacts> {
        Arc::new(ModelArtifacts {
            model: LinearModel {
                coefficients,
                intercept,
            },
            scaler: Scaler::MinMax {
                min: vec![],
                scale: vec![],
            },
            cols_to_scale: vec![],
            features: features.iter().map(|f| f.to_string()).collect(),
        })
    }

    #[test]
    fn test_sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!(sigmoid(-745.0) >= 0.0);
        assert!(!sigmoid(f64::MAX).is_nan());
        assert!(!sigmoid(f64::MIN).is_nan());
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_score_decision_maps_onto_scale() {
        let scorer = Scorer::with_defaults(artifacts(&["age"], vec![0.0], 0.0));

        let neutral = scorer.score_decision(0.0);
        assert_eq!(neutral.default_probability, 0.5);
        assert_eq!(neutral.raw_credit_score, 600.0);
        assert_eq!(neutral.credit_score, 600);
        assert_eq!(neutral.rating, Rating::Average);

        let certain_default = scorer.score_decision(1000.0);
        assert_eq!(certain_default.credit_score, 300);
        assert_eq!(certain_default.rating, Rating::Poor);

        let certain_repayment = scorer.score_decision(-1000.0);
        assert_eq!(certain_repayment.credit_score, 900);
        assert_eq!(certain_repayment.rating, Rating::Excellent);
    }

    #[test]
    fn test_credit_score_truncates() {
        let scorer = Scorer::with_defaults(artifacts(&["age"], vec![0.0], 0.0));
        // p = sigmoid(-1) = 0.2689..., score = 300 + 0.7310... * 600 = 738.65...
        let result = scorer.score_decision(-1.0);
        assert_eq!(result.credit_score, 738);
        assert_eq!(result.rating, Rating::Good);
    }

    #[test]
    fn test_custom_scale() {
        let scale = ScoreScale {
            base_score: 0.0,
            scale_length: 100.0,
        };
        let scorer = Scorer::new(artifacts(&["age"], vec![0.0], 0.0), scale, RatingBands::default());

        let result = scorer.score_decision(0.0);
        assert_eq!(result.credit_score, 50);
        assert_eq!(result.rating, Rating::Undefined);
    }

    #[test]
    fn test_score_uses_coefficients_and_intercept() {
        let artifacts = artifacts(&["age", "loan_type_Unsecured"], vec![0.1, 1.0], -3.0);
        let builder = FeatureBuilder::new(artifacts.clone(), FeaturePolicy::default());
        let scorer = Scorer::with_defaults(artifacts);

        let vector = builder.build(&ApplicantRecord::default()).unwrap();
        let decision = scorer.decision_value(&vector).unwrap();
        assert!((decision - (0.1 * 28.0 + 1.0 - 3.0)).abs() < 1e-12);

        let result = scorer.score(&vector).unwrap();
        assert!((result.default_probability - sigmoid(decision)).abs() < 1e-15);
    }

    #[test]
    fn test_schema_mismatch_detected() {
        let built_for = artifacts(&["age", "loan_to_income"], vec![1.0, 1.0], 0.0);
        let scored_by = artifacts(&["loan_to_income", "age"], vec![1.0, 1.0], 0.0);

        let vector = FeatureBuilder::new(built_for, FeaturePolicy::default())
            .build(&ApplicantRecord::default())
            .unwrap();
        let err = Scorer::with_defaults(scored_by).score(&vector).unwrap_err();

        match err {
            ScoringError::SchemaMismatch { stage, reason } => {
                assert_eq!(stage, "scoring");
                assert!(reason.contains("column 0"));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }

        let shorter = artifacts(&["age"], vec![1.0], 0.0);
        let err = Scorer::with_defaults(shorter).score(&vector).unwrap_err();
        assert!(err.to_string().contains("expected 1 features, got 2"));
    }

    #[test]
    fn test_coefficient_count_is_checked() {
        let full = artifacts(&["age", "loan_type_Unsecured"], vec![0.1, 1.0], -3.0);
        let vector = FeatureBuilder::new(full, FeaturePolicy::default())
            .build(&ApplicantRecord::default())
            .unwrap();

        let truncated = artifacts(&["age", "loan_type_Unsecured"], vec![0.1], -3.0);
        match Scorer::with_defaults(truncated).score(&vector) {
            Err(ScoringError::SchemaMismatch { stage, reason }) => {
                assert_eq!(stage, "scoring");
                assert!(reason.contains("1 coefficients but 2 features"));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_feature_is_rejected() {
        // A near-zero scale pushes a large loan-to-income ratio to infinity
        let mut overflowing = (*artifacts(&["age", "loan_to_income"], vec![0.1, 0.0], 0.0)).clone();
        overflowing.scaler = Scaler::Standard {
            mean: vec![0.0],
            scale: vec![1e-308],
        };
        overflowing.cols_to_scale = vec!["loan_to_income".to_string()];
        let overflowing = Arc::new(overflowing);

        let record = ApplicantRecord {
            income: 1.0,
            loan_amount: 1e10,
            ..ApplicantRecord::default()
        };
        let vector = FeatureBuilder::new(overflowing.clone(), FeaturePolicy::default())
            .build(&record)
            .unwrap();
        assert_eq!(vector.get("loan_to_income"), Some(f64::INFINITY));

        match Scorer::with_defaults(overflowing).score(&vector) {
            Err(ScoringError::SchemaMismatch { stage, reason }) => {
                assert_eq!(stage, "scoring");
                assert!(reason.contains("loan_to_income"));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_decision_is_rejected() {
        let huge = artifacts(&["age", "loan_type_Unsecured"], vec![f64::MAX, f64::MAX], 0.0);
        let vector = FeatureBuilder::new(huge.clone(), FeaturePolicy::default())
            .build(&ApplicantRecord::default())
            .unwrap();

        let err = Scorer::with_defaults(huge).decision_value(&vector).unwrap_err();
        assert!(err.to_string().contains("decision value is not finite"));
    }
}
