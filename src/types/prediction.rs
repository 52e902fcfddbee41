//! Prediction output: probability, credit score and rating

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative rating derived from the credit score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Poor,
    Average,
    Good,
    Excellent,
    /// Score outside every band. Unreachable for a probability in [0, 1]
    /// under the default scale and bands.
    Undefined,
}

impl Rating {
    pub const ALL: [Rating; 5] = [
        Rating::Poor,
        Rating::Average,
        Rating::Good,
        Rating::Excellent,
        Rating::Undefined,
    ];

    /// Classify a credit score into a rating band.
    ///
    /// Bands are half-open `[lower, upper)` except the top one, which is closed
    /// at the ceiling.
    pub fn from_score(score: f64, bands: &RatingBands) -> Self {
        if bands.poor <= score && score < bands.average {
            Rating::Poor
        } else if bands.average <= score && score < bands.good {
            Rating::Average
        } else if bands.good <= score && score < bands.excellent {
            Rating::Good
        } else if bands.excellent <= score && score <= bands.ceiling {
            Rating::Excellent
        } else {
            Rating::Undefined
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Poor => "Poor",
            Rating::Average => "Average",
            Rating::Good => "Good",
            Rating::Excellent => "Excellent",
            Rating::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower edges of each rating band plus the inclusive ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBands {
    pub poor: f64,
    pub average: f64,
    pub good: f64,
    pub excellent: f64,
    pub ceiling: f64,
}

impl Default for RatingBands {
    fn default() -> Self {
        Self {
            poor: 300.0,
            average: 500.0,
            good: 650.0,
            excellent: 750.0,
            ceiling: 900.0,
        }
    }
}

/// Result of scoring one applicant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of default (0.0 - 1.0)
    pub default_probability: f64,

    /// Credit score truncated to an integer
    pub credit_score: i64,

    /// Credit score before truncation; the rating is taken from this value
    pub raw_credit_score: f64,

    pub rating: Rating,
}

/// Prediction wrapped with request metadata, as emitted by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringReport {
    /// Unique report identifier
    pub request_id: String,

    /// Caller-supplied label for the applicant, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_ref: Option<String>,

    /// Derived loan-to-income ratio shown alongside the result
    pub loan_to_income: f64,

    pub prediction: PredictionResult,

    /// Report generation timestamp
    pub scored_at: DateTime<Utc>,
}

impl ScoringReport {
    pub fn new(prediction: PredictionResult, loan_to_income: f64) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            applicant_ref: None,
            loan_to_income,
            prediction,
            scored_at: Utc::now(),
        }
    }

    /// Attach a caller-supplied applicant label
    pub fn with_applicant_ref(mut self, applicant_ref: impl Into<String>) -> Self {
        self.applicant_ref = Some(applicant_ref.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_from_score_band_edges() {
        let bands = RatingBands::default();

        assert_eq!(Rating::from_score(300.0, &bands), Rating::Poor);
        assert_eq!(Rating::from_score(499.999, &bands), Rating::Poor);
        assert_eq!(Rating::from_score(500.0, &bands), Rating::Average);
        assert_eq!(Rating::from_score(649.999, &bands), Rating::Average);
        assert_eq!(Rating::from_score(650.0, &bands), Rating::Good);
        assert_eq!(Rating::from_score(749.999, &bands), Rating::Good);
        assert_eq!(Rating::from_score(750.0, &bands), Rating::Excellent);
        assert_eq!(Rating::from_score(900.0, &bands), Rating::Excellent);
    }

    #[test]
    fn test_rating_outside_bands_is_undefined() {
        let bands = RatingBands::default();

        assert_eq!(Rating::from_score(299.999, &bands), Rating::Undefined);
        assert_eq!(Rating::from_score(900.001, &bands), Rating::Undefined);
        assert_eq!(Rating::from_score(f64::NAN, &bands), Rating::Undefined);
    }

    #[test]
    fn test_report_serialization() {
        let prediction = PredictionResult {
            default_probability: 0.25,
            credit_score: 750,
            raw_credit_score: 750.0,
            rating: Rating::Excellent,
        };

        let report = ScoringReport::new(prediction, 2.5).with_applicant_ref("app_001");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"rating\":\"Excellent\""));

        let deserialized: ScoringReport = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.request_id, report.request_id);
        assert_eq!(deserialized.prediction, prediction);
        assert_eq!(deserialized.applicant_ref.as_deref(), Some("app_001"));
    }
}
