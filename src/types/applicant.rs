//! Applicant record submitted for default risk assessment

use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed categorical field. Unknown strings are rejected with a
/// validation error naming the field instead of falling back to the baseline.
macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident, $field:literal, [$($variant:ident),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every level, in form order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ScoringError;

            fn from_str(s: &str) -> Result<Self> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|level| level.as_str() == s)
                    .ok_or_else(|| {
                        let expected: Vec<&str> = $name::ALL.iter().map(|l| l.as_str()).collect();
                        ScoringError::validation(
                            $field,
                            format!("expected one of {}, got `{}`", expected.join(", "), s),
                        )
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ScoringError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

categorical!(
    /// Applicant's housing situation. `Mortgage` is the baseline level.
    ResidenceType,
    "residence_type",
    [Owned, Rented, Mortgage]
);

categorical!(
    /// What the loan is for. `Auto` is the baseline level.
    LoanPurpose,
    "loan_purpose",
    [Education, Home, Auto, Personal]
);

categorical!(
    /// Collateral status of the loan. `Secured` is the baseline level.
    LoanType,
    "loan_type",
    [Unsecured, Secured]
);

/// Raw applicant attributes as collected by the input form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    /// Age in years (18-100)
    pub age: u32,

    /// Annual income
    pub income: f64,

    /// Requested loan amount
    pub loan_amount: f64,

    /// Loan tenure in months
    pub loan_tenure_months: u32,

    /// Average days past due per delinquency event
    pub avg_dpd_per_delinquency: f64,

    /// Delinquent months as a percentage of all months (0-100)
    pub delinquency_ratio: f64,

    /// Credit utilization percentage (0-100)
    pub credit_utilization_ratio: f64,

    /// Number of open loan accounts
    #[serde(alias = "number_of_open_accounts")]
    pub num_open_accounts: u32,

    pub residence_type: ResidenceType,

    pub loan_purpose: LoanPurpose,

    pub loan_type: LoanType,
}

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;

impl ApplicantRecord {
    /// Parse a record from JSON, reporting malformed documents as validation errors.
    ///
    /// An unknown categorical level is reported against its own field.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ScoringError::validation("json", e.to_string()))?;

        if let Some(level) = document.get("residence_type").and_then(|v| v.as_str()) {
            level.parse::<ResidenceType>()?;
        }
        if let Some(level) = document.get("loan_purpose").and_then(|v| v.as_str()) {
            level.parse::<LoanPurpose>()?;
        }
        if let Some(level) = document.get("loan_type").and_then(|v| v.as_str()) {
            level.parse::<LoanType>()?;
        }

        serde_json::from_value(document).map_err(|e| ScoringError::validation("json", e.to_string()))
    }

    /// Loan amount divided by income; zero when there is no income.
    pub fn loan_to_income(&self) -> f64 {
        if self.income > 0.0 {
            self.loan_amount / self.income
        } else {
            0.0
        }
    }

    /// Check every field against its domain, failing on the first offender.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(ScoringError::validation(
                "age",
                format!("must be between {} and {}, got {}", MIN_AGE, MAX_AGE, self.age),
            ));
        }

        non_negative("income", self.income)?;
        non_negative("loan_amount", self.loan_amount)?;

        let loan_to_income = self.loan_to_income();
        if !loan_to_income.is_finite() {
            return Err(ScoringError::validation(
                "income",
                format!(
                    "too small for a loan of {}: loan-to-income is {}",
                    self.loan_amount, loan_to_income
                ),
            ));
        }

        non_negative("avg_dpd_per_delinquency", self.avg_dpd_per_delinquency)?;
        percentage("delinquency_ratio", self.delinquency_ratio)?;
        percentage("credit_utilization_ratio", self.credit_utilization_ratio)?;

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScoringError::validation(
            field,
            format!("must be a non-negative number, got {}", value),
        ));
    }
    Ok(())
}

fn percentage(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ScoringError::validation(
            field,
            format!("must be a percentage in [0, 100], got {}", value),
        ));
    }
    Ok(())
}

impl Default for ApplicantRecord {
    /// The input form's initial values
    fn default() -> Self {
        Self {
            age: 28,
            income: 1_200_000.0,
            loan_amount: 2_560_000.0,
            loan_tenure_months: 36,
            avg_dpd_per_delinquency: 20.0,
            delinquency_ratio: 30.0,
            credit_utilization_ratio: 30.0,
            num_open_accounts: 1,
            residence_type: ResidenceType::Owned,
            loan_purpose: LoanPurpose::Education,
            loan_type: LoanType::Unsecured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_to_income() {
        let record = ApplicantRecord::default();
        assert_eq!(record.loan_to_income(), 2_560_000.0 / 1_200_000.0);

        let broke = ApplicantRecord {
            income: 0.0,
            ..ApplicantRecord::default()
        };
        assert_eq!(broke.loan_to_income(), 0.0);
    }

    #[test]
    fn test_validate_rejects_out_of_domain_fields() {
        assert!(ApplicantRecord::default().validate().is_ok());

        let minor = ApplicantRecord {
            age: 17,
            ..ApplicantRecord::default()
        };
        match minor.validate() {
            Err(ScoringError::Validation { field, .. }) => assert_eq!(field, "age"),
            other => panic!("expected age validation error, got {:?}", other),
        }

        let negative = ApplicantRecord {
            loan_amount: -5.0,
            ..ApplicantRecord::default()
        };
        match negative.validate() {
            Err(ScoringError::Validation { field, .. }) => assert_eq!(field, "loan_amount"),
            other => panic!("expected loan_amount validation error, got {:?}", other),
        }

        let overutilized = ApplicantRecord {
            credit_utilization_ratio: 100.5,
            ..ApplicantRecord::default()
        };
        assert!(overutilized.validate().is_err());

        let nan_income = ApplicantRecord {
            income: f64::NAN,
            ..ApplicantRecord::default()
        };
        assert!(nan_income.validate().is_err());
    }

    #[test]
    fn test_categorical_parsing() {
        assert_eq!("Rented".parse::<ResidenceType>().unwrap(), ResidenceType::Rented);
        assert_eq!("Auto".parse::<LoanPurpose>().unwrap(), LoanPurpose::Auto);

        match "Mortage".parse::<ResidenceType>() {
            Err(ScoringError::Validation { field, reason }) => {
                assert_eq!(field, "residence_type");
                assert!(reason.contains("Mortgage"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        // Matching is exact, as on the form
        assert!("secured".parse::<LoanType>().is_err());
    }

    #[test]
    fn test_record_json_roundtrip_uses_form_labels() {
        let record = ApplicantRecord::default();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"residence_type\":\"Owned\""));

        let parsed = ApplicantRecord::from_json(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_from_json_rejects_unknown_category() {
        let json = r#"{
            "age": 30, "income": 100.0, "loan_amount": 50.0, "loan_tenure_months": 12,
            "avg_dpd_per_delinquency": 0.0, "delinquency_ratio": 0.0,
            "credit_utilization_ratio": 0.0, "num_open_accounts": 1,
            "residence_type": "Owned", "loan_purpose": "Vacation", "loan_type": "Secured"
        }"#;

        match ApplicantRecord::from_json(json) {
            Err(ScoringError::Validation { field, reason }) => {
                assert_eq!(field, "loan_purpose");
                assert!(reason.contains("got `Vacation`"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_reports_malformed_documents() {
        match ApplicantRecord::from_json(r#"{"age": 30"#) {
            Err(ScoringError::Validation { field, .. }) => assert_eq!(field, "json"),
            other => panic!("expected validation error, got {:?}", other),
        }

        match ApplicantRecord::from_json(r#"{"age": 30, "loan_type": "Secured"}"#) {
            Err(ScoringError::Validation { field, reason }) => {
                assert_eq!(field, "json");
                assert!(reason.contains("income"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_overflowing_loan_to_income() {
        let record = ApplicantRecord {
            income: 1e-300,
            loan_amount: 1e10,
            ..ApplicantRecord::default()
        };
        assert!(record.loan_to_income().is_infinite());

        match record.validate() {
            Err(ScoringError::Validation { field, reason }) => {
                assert_eq!(field, "income");
                assert!(reason.contains("loan-to-income"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
