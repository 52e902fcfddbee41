//! Loan Risk Scorer - Main Entry Point
//!
//! Scores a single applicant from flags or JSON, scores a JSON-Lines batch
//! sequentially, or inspects the loaded model artifact.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use loan_risk_scorer::{
    config::{AppConfig, LogFormat},
    metrics::ScoringMetrics,
    types::applicant::{LoanPurpose, LoanType, ResidenceType},
    ApplicantRecord, ArtifactLoader, Predictor, ScoringReport,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "loan-risk",
    version,
    about = "Assess loan default risk: default probability, credit score and rating"
)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "config/config.toml")]
    config: PathBuf,

    /// Model artifact to use instead of the configured one
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one applicant
    Score(ScoreArgs),
    /// Score every applicant in a JSON-Lines file
    Batch(BatchArgs),
    /// Validate the model artifact and print its schema
    Inspect,
}

#[derive(Debug, Args)]
struct ScoreArgs {
    /// Read the applicant from a JSON file; applicant flags are ignored
    #[arg(long)]
    input: Option<PathBuf>,

    /// Emit a JSON report instead of text
    #[arg(long)]
    json: bool,

    #[arg(long, default_value_t = ApplicantRecord::default().age)]
    age: u32,

    /// Annual income
    #[arg(long, default_value_t = ApplicantRecord::default().income)]
    income: f64,

    #[arg(long, default_value_t = ApplicantRecord::default().loan_amount)]
    loan_amount: f64,

    #[arg(long, default_value_t = ApplicantRecord::default().loan_tenure_months)]
    loan_tenure_months: u32,

    /// Average days past due per delinquency
    #[arg(long, default_value_t = ApplicantRecord::default().avg_dpd_per_delinquency)]
    avg_dpd_per_delinquency: f64,

    /// Delinquency ratio in percent
    #[arg(long, default_value_t = ApplicantRecord::default().delinquency_ratio)]
    delinquency_ratio: f64,

    /// Credit utilization ratio in percent
    #[arg(long, default_value_t = ApplicantRecord::default().credit_utilization_ratio)]
    credit_utilization_ratio: f64,

    #[arg(long, default_value_t = ApplicantRecord::default().num_open_accounts)]
    num_open_accounts: u32,

    /// Owned, Rented or Mortgage
    #[arg(long, default_value_t = ApplicantRecord::default().residence_type)]
    residence_type: ResidenceType,

    /// Education, Home, Auto or Personal
    #[arg(long, default_value_t = ApplicantRecord::default().loan_purpose)]
    loan_purpose: LoanPurpose,

    /// Unsecured or Secured
    #[arg(long, default_value_t = ApplicantRecord::default().loan_type)]
    loan_type: LoanType,
}

impl ScoreArgs {
    fn record(&self) -> Result<ApplicantRecord> {
        if let Some(path) = &self.input {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read applicant file {}", path.display()))?;
            return Ok(ApplicantRecord::from_json(&json)?);
        }

        Ok(ApplicantRecord {
            age: self.age,
            income: self.income,
            loan_amount: self.loan_amount,
            loan_tenure_months: self.loan_tenure_months,
            avg_dpd_per_delinquency: self.avg_dpd_per_delinquency,
            delinquency_ratio: self.delinquency_ratio,
            credit_utilization_ratio: self.credit_utilization_ratio,
            num_open_accounts: self.num_open_accounts,
            residence_type: self.residence_type,
            loan_purpose: self.loan_purpose,
            loan_type: self.loan_type,
        })
    }
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// JSON-Lines file, one applicant per line
    input: PathBuf,

    /// Only print the summary, not one report per applicant
    #[arg(long)]
    summary_only: bool,
}

/// Optional caller label carried next to the applicant fields on a batch line
#[derive(Debug, Default, Deserialize)]
struct BatchLabel {
    #[serde(default)]
    applicant_ref: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(artifact) = &cli.artifact {
        config.artifacts.path = artifact.clone();
    }

    init_logging(&config)?;
    debug!(config = %cli.config.display(), "Configuration loaded");

    match &cli.command {
        Command::Score(args) => score(&config, args),
        Command::Batch(args) => batch(&config, args),
        Command::Inspect => inspect(&config),
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let level = &config.logging.level;
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("loan_risk_scorer={}", level).parse()?)
        .add_directive(format!("loan_risk={}", level).parse()?);

    // Logs go to stderr so reports on stdout stay machine-readable
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    Ok(())
}

fn score(config: &AppConfig, args: &ScoreArgs) -> Result<()> {
    let predictor = Predictor::from_config(config).context("Failed to initialize predictor")?;
    let record = args.record()?;

    let prediction = predictor
        .predict(&record)
        .context("Failed to score applicant")?;
    let report = ScoringReport::new(prediction, record.loan_to_income());

    info!(
        request_id = %report.request_id,
        default_probability = prediction.default_probability,
        credit_score = prediction.credit_score,
        rating = %prediction.rating,
        "Applicant scored"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Loan to Income Ratio: {:.2}", report.loan_to_income);
        println!(
            "Default Probability:  {:.2}%",
            prediction.default_probability * 100.0
        );
        println!("Credit Score:         {}", prediction.credit_score);
        println!("Rating:               {}", prediction.rating);
    }

    Ok(())
}

fn batch(config: &AppConfig, args: &BatchArgs) -> Result<()> {
    let predictor = Predictor::from_config(config).context("Failed to initialize predictor")?;
    let metrics = ScoringMetrics::new();

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open batch file {}", args.input.display()))?;

    info!(input = %args.input.display(), "Scoring batch");

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_number))?;
        if line.trim().is_empty() {
            continue;
        }

        let start_time = Instant::now();

        let record = match ApplicantRecord::from_json(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_number, error = %e, "Failed to parse applicant");
                metrics.record_failure();
                continue;
            }
        };
        let label: BatchLabel = serde_json::from_str(&line).unwrap_or_default();

        match predictor.predict(&record) {
            Ok(prediction) => {
                metrics.record_prediction(start_time.elapsed(), &prediction);

                let mut report = ScoringReport::new(prediction, record.loan_to_income());
                if let Some(applicant_ref) = label.applicant_ref {
                    report = report.with_applicant_ref(applicant_ref);
                }

                if !args.summary_only {
                    println!("{}", serde_json::to_string(&report)?);
                }
            }
            Err(e) => {
                warn!(line = line_number, error = %e, "Applicant could not be scored");
                metrics.record_failure();
            }
        }
    }

    metrics.print_summary();

    Ok(())
}

fn inspect(config: &AppConfig) -> Result<()> {
    let artifacts = ArtifactLoader::load(&config.artifacts.path)
        .with_context(|| format!("Invalid artifact {}", config.artifacts.path.display()))?;

    println!("Artifact:   {}", config.artifacts.path.display());
    println!("Scaler:     {} ({} columns)", artifacts.scaler.kind(), artifacts.scaler.len());
    println!("Intercept:  {:.6}", artifacts.model.intercept);
    println!("Features:   {}", artifacts.feature_count());

    for (name, coefficient) in artifacts.features.iter().zip(&artifacts.model.coefficients) {
        let scaled = if artifacts.cols_to_scale.contains(name) {
            "scaled"
        } else {
            ""
        };
        println!("  {:<32} {:>12.6}  {}", name, coefficient, scaled);
    }

    let unused: Vec<&String> = artifacts
        .cols_to_scale
        .iter()
        .filter(|c| !artifacts.features.contains(c))
        .collect();
    if !unused.is_empty() {
        println!("Scaled but not fed to the model: {}", unused.len());
        for name in unused {
            println!("  {}", name);
        }
    }

    Ok(())
}
