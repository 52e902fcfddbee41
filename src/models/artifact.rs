//! Fitted model components: linear classifier, scaler and column schema

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fitted binary logistic regression: one weight per feature plus an intercept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Log-odds of default for a feature row laid out in model order.
    ///
    /// Callers must pass exactly one value per coefficient.
    pub fn decision_function(&self, values: &[f64]) -> f64 {
        let mut log_odds = 0.0;
        for (weight, value) in self.coefficients.iter().zip(values) {
            log_odds += weight * value;
        }
        log_odds + self.intercept
    }
}

/// Fitted per-column linear rescaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// Standardization: `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Min-max in fitted form: `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    pub fn kind(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "standard",
            Scaler::MinMax { .. } => "min_max",
        }
    }

    /// Number of columns the scaler was fitted on
    pub fn len(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transform the value of the `column`-th fitted column, or `None` when
    /// the scaler has no parameters for that column.
    pub fn transform_value(&self, column: usize, value: f64) -> Option<f64> {
        match self {
            Scaler::Standard { mean, scale } => {
                Some((value - mean.get(column)?) / scale.get(column)?)
            }
            Scaler::MinMax { min, scale } => {
                Some(value * scale.get(column)? + min.get(column)?)
            }
        }
    }

    fn check(&self) -> Result<(), String> {
        let (offsets, scale) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
        };

        if offsets.len() != scale.len() {
            return Err(format!(
                "{} scaler has {} offsets but {} scale factors",
                self.kind(),
                offsets.len(),
                scale.len()
            ));
        }
        if offsets.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err(format!("{} scaler has non-finite parameters", self.kind()));
        }
        if let Scaler::Standard { scale, .. } = self {
            if let Some(column) = scale.iter().position(|&s| s == 0.0) {
                return Err(format!("standard scaler has zero scale at column {}", column));
            }
        }
        Ok(())
    }
}

/// Everything needed to turn an applicant into a score.
///
/// Loaded once at startup and never mutated; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub model: LinearModel,
    pub scaler: Scaler,
    /// Columns the scaler applies to, in the scaler's fitted order
    pub cols_to_scale: Vec<String>,
    /// Columns fed to the model, in coefficient order
    pub features: Vec<String>,
}

impl ModelArtifacts {
    /// Check that the four parts agree with each other.
    pub fn validate(&self) -> Result<(), String> {
        if self.features.is_empty() {
            return Err("feature list is empty".to_string());
        }
        if let Some(name) = first_duplicate(&self.features) {
            return Err(format!("duplicate feature `{}`", name));
        }
        if let Some(name) = first_duplicate(&self.cols_to_scale) {
            return Err(format!("duplicate column to scale `{}`", name));
        }
        if self.model.coefficients.len() != self.features.len() {
            return Err(format!(
                "model has {} coefficients but {} features",
                self.model.coefficients.len(),
                self.features.len()
            ));
        }
        if !self.model.intercept.is_finite()
            || self.model.coefficients.iter().any(|c| !c.is_finite())
        {
            return Err("model has non-finite parameters".to_string());
        }

        self.scaler.check()?;
        if self.scaler.len() != self.cols_to_scale.len() {
            return Err(format!(
                "scaler was fitted on {} columns but {} columns are listed for scaling",
                self.scaler.len(),
                self.cols_to_scale.len()
            ));
        }
        Ok(())
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}
