//! Loan Default Risk Scorer Library
//!
//! Prepares applicant features against a fitted logistic regression, converts
//! the model output into a default probability, maps it onto a 300-900 credit
//! score and classifies the score into a rating.

pub mod config;
pub mod error;
pub mod feature_builder;
pub mod metrics;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use error::{Result, ScoringError};
pub use feature_builder::{FeatureBuilder, FeaturePolicy, FeatureVector, MissingColumnPolicy};
pub use models::{ArtifactLoader, ModelArtifacts, Predictor, Scorer};
pub use types::{
    applicant::ApplicantRecord,
    prediction::{PredictionResult, Rating, ScoringReport},
};
