//! Type definitions for the scoring pipeline

pub mod applicant;
pub mod prediction;

pub use applicant::{ApplicantRecord, LoanPurpose, LoanType, ResidenceType};
pub use prediction::{PredictionResult, Rating, RatingBands, ScoringReport};
