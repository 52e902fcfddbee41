//! Feature preparation for default risk scoring.
//!
//! Turns an applicant record into the exact column layout the fitted model
//! was trained on: raw numeric fields, the derived loan-to-income ratio,
//! one-hot categorical flags and placeholder values for inputs the form never
//! collects. The scaler is applied to its fitted columns before the frame is
//! narrowed to the model's feature list.

use crate::error::{Result, ScoringError};
use crate::models::artifact::ModelArtifacts;
use crate::types::applicant::{ApplicantRecord, LoanPurpose, LoanType, ResidenceType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Model inputs the applicant form does not collect. Each is filled with the
/// placeholder value; none of them is measured.
pub const AUXILIARY_FEATURES: [&str; 11] = [
    "number_of_dependants",
    "years_at_current_address",
    "zipcode",
    "sanction_amount",
    "processing_fee",
    "gst",
    "net_disbursement",
    "principal_outstanding",
    "bank_balance_at_application",
    "number_of_closed_accounts",
    "enquiry_count",
];

/// What to do when the artifact expects a column the builder does not produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingColumnPolicy {
    /// Fail with a schema mismatch naming the column
    #[default]
    Reject,
    /// Insert 0 for the column and log a warning
    ZeroFill,
}

/// Defaulting rules applied while building features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePolicy {
    /// Value used for every auxiliary feature
    #[serde(default = "default_placeholder_value")]
    pub placeholder_value: f64,
    #[serde(default)]
    pub missing_columns: MissingColumnPolicy,
}

fn default_placeholder_value() -> f64 {
    1.0
}

impl Default for FeaturePolicy {
    fn default() -> Self {
        Self {
            placeholder_value: default_placeholder_value(),
            missing_columns: MissingColumnPolicy::Reject,
        }
    }
}

/// Named columns assembled from one applicant, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, f64)>,
}

impl FeatureFrame {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.columns[i].1)
    }

    /// Set a column, appending it when absent
    pub fn insert(&mut self, name: &str, value: f64) {
        match self.position(name) {
            Some(i) => self.columns[i].1 = value,
            None => self.columns.push((name.to_string(), value)),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }
}

/// Model-ready feature row, ordered exactly as the artifact's feature list
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Iterate `(name, value)` pairs in model order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Builds feature vectors against a loaded artifact
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    artifacts: Arc<ModelArtifacts>,
    policy: FeaturePolicy,
}

impl FeatureBuilder {
    pub fn new(artifacts: Arc<ModelArtifacts>, policy: FeaturePolicy) -> Self {
        Self { artifacts, policy }
    }

    /// Validate, assemble, scale and order the features for one applicant.
    pub fn build(&self, record: &ApplicantRecord) -> Result<FeatureVector> {
        record.validate()?;

        let mut frame = self.assemble(record);
        self.scale(&mut frame)?;
        self.select(&frame)
    }

    /// Unscaled columns for a record, before any artifact-driven step.
    pub fn assemble(&self, record: &ApplicantRecord) -> FeatureFrame {
        let mut frame = FeatureFrame::default();

        frame.insert("age", f64::from(record.age));
        frame.insert("loan_tenure_months", f64::from(record.loan_tenure_months));
        frame.insert("number_of_open_accounts", f64::from(record.num_open_accounts));
        frame.insert("credit_utilization_ratio", record.credit_utilization_ratio);
        frame.insert("loan_to_income", record.loan_to_income());
        frame.insert("delinquency_ratio", record.delinquency_ratio);
        frame.insert("avg_dpd_per_delinquency", record.avg_dpd_per_delinquency);

        let (owned, rented) = encode_residence(record.residence_type);
        frame.insert("residence_type_Owned", owned);
        frame.insert("residence_type_Rented", rented);

        let (education, home, personal) = encode_purpose(record.loan_purpose);
        frame.insert("loan_purpose_Education", education);
        frame.insert("loan_purpose_Home", home);
        frame.insert("loan_purpose_Personal", personal);

        frame.insert("loan_type_Unsecured", encode_loan_type(record.loan_type));

        for name in AUXILIARY_FEATURES {
            frame.insert(name, self.policy.placeholder_value);
        }
        debug!(
            count = AUXILIARY_FEATURES.len(),
            value = self.policy.placeholder_value,
            "Auxiliary features filled with placeholder"
        );

        frame
    }

    /// Apply the fitted scaler to its columns in place.
    fn scale(&self, frame: &mut FeatureFrame) -> Result<()> {
        let scaler = &self.artifacts.scaler;

        for (column, name) in self.artifacts.cols_to_scale.iter().enumerate() {
            let raw = match frame.get(name) {
                Some(value) => value,
                None => self.fill_missing(name, "scaling")?,
            };
            let scaled = scaler.transform_value(column, raw).ok_or_else(|| {
                ScoringError::schema(
                    "scaling",
                    format!("scaler has no parameters for column {} (`{}`)", column, name),
                )
            })?;
            frame.insert(name, scaled);
        }

        Ok(())
    }

    /// Narrow the frame to the model's features, in model order.
    fn select(&self, frame: &FeatureFrame) -> Result<FeatureVector> {
        let features = &self.artifacts.features;
        let mut values = Vec::with_capacity(features.len());

        for name in features {
            let value = match frame.get(name) {
                Some(value) => value,
                None => self.fill_missing(name, "feature selection")?,
            };
            values.push(value);
        }

        Ok(FeatureVector {
            names: features.clone(),
            values,
        })
    }

    fn fill_missing(&self, name: &str, stage: &'static str) -> Result<f64> {
        match self.policy.missing_columns {
            MissingColumnPolicy::Reject => Err(ScoringError::schema(
                stage,
                format!("artifact expects column `{}` which the builder does not produce", name),
            )),
            MissingColumnPolicy::ZeroFill => {
                warn!(column = %name, stage, "Column missing from assembled features, filling with 0");
                Ok(0.0)
            }
        }
    }
}

fn encode_residence(residence: ResidenceType) -> (f64, f64) {
    match residence {
        ResidenceType::Owned => (1.0, 0.0),
        ResidenceType::Rented => (0.0, 1.0),
        ResidenceType::Mortgage => (0.0, 0.0),
    }
}

fn encode_purpose(purpose: LoanPurpose) -> (f64, f64, f64) {
    match purpose {
        LoanPurpose::Education => (1.0, 0.0, 0.0),
        LoanPurpose::Home => (0.0, 1.0, 0.0),
        LoanPurpose::Personal => (0.0, 0.0, 1.0),
        LoanPurpose::Auto => (0.0, 0.0, 0.0),
    }
}

fn encode_loan_type(loan_type: LoanType) -> f64 {
    match loan_type {
        LoanType::Unsecured => 1.0,
        LoanType::Secured => 0.0,
    }
}
