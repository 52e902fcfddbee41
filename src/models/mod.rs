//! Model artifact handling and scoring components

pub mod artifact;
pub mod loader;
pub mod predictor;
pub mod scorer;

pub use artifact::{LinearModel, ModelArtifacts, Scaler};
pub use loader::ArtifactLoader;
pub use predictor::Predictor;
pub use scorer::{sigmoid, ScoreScale, Scorer};
