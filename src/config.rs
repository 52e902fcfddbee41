//! Configuration management for the loan risk scorer

use crate::feature_builder::FeaturePolicy;
use crate::models::scorer::ScoreScale;
use crate::types::prediction::RatingBands;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub features: FeaturePolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model artifact location
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Path to the bundled artifact (model, scaler, features, cols_to_scale_)
    pub path: PathBuf,
}

/// Credit score scale and rating bands
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    #[serde(default = "default_scale_length")]
    pub scale_length: f64,
    #[serde(default)]
    pub rating_bands: RatingBands,
}

fn default_base_score() -> f64 {
    300.0
}

fn default_scale_length() -> f64 {
    600.0
}

impl ScoringConfig {
    pub fn score_scale(&self) -> ScoreScale {
        ScoreScale {
            base_score: self.base_score,
            scale_length: self.scale_length,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: default_base_score(),
            scale_length: default_scale_length(),
            rating_bands: RatingBands::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig {
                path: PathBuf::from("artifacts/model_data.json"),
            },
            scoring: ScoringConfig::default(),
            features: FeaturePolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_builder::MissingColumnPolicy;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.artifacts.path, PathBuf::from("artifacts/model_data.json"));
        assert_eq!(config.scoring.score_scale(), ScoreScale::default());
        assert_eq!(config.scoring.rating_bands.excellent, 750.0);
        assert_eq!(config.features.placeholder_value, 1.0);
        assert_eq!(config.features.missing_columns, MissingColumnPolicy::Reject);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/config.toml");
        let config = AppConfig::load_from_path(path).unwrap();

        assert_eq!(config.artifacts.path, PathBuf::from("artifacts/model_data.json"));
        assert_eq!(config.scoring.base_score, 300.0);
        assert_eq!(config.scoring.scale_length, 600.0);
        assert_eq!(config.scoring.rating_bands, RatingBands::default());
        assert_eq!(config.features, FeaturePolicy::default());
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = AppConfig::load_or_default("no/such/config.toml").unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_fill_policy_deserializes() {
        let toml = r#"
            [artifacts]
            path = "artifacts/model_data.json"

            [features]
            placeholder_value = 0.5
            missing_columns = "zero_fill"
        "#;
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.features.missing_columns, MissingColumnPolicy::ZeroFill);
        assert_eq!(config.features.placeholder_value, 0.5);
        assert_eq!(config.scoring.score_scale(), ScoreScale::default());
    }

    #[test]
    fn test_unknown_missing_column_policy_is_rejected() {
        let toml = r#"
            [artifacts]
            path = "artifacts/model_data.json"

            [features]
            missing_columns = "guess"
        "#;
        let result = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();

        assert!(result.is_err());
    }
}
