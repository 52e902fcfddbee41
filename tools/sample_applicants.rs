//! Sample Applicant Generator
//!
//! Writes random applicants as JSON Lines for exercising `loan-risk batch`.
//!
//! Usage: sample-applicants [COUNT] [RISKY_RATE] [OUTPUT]

use loan_risk_scorer::types::applicant::{LoanPurpose, LoanType, ResidenceType};
use loan_risk_scorer::ApplicantRecord;
use rand::Rng;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

/// Batch line as read by the scorer
#[derive(Debug, Serialize)]
struct SampleLine {
    applicant_ref: String,
    #[serde(flatten)]
    record: ApplicantRecord,
}

/// Applicant generator for testing
struct ApplicantGenerator {
    rng: rand::rngs::ThreadRng,
    applicant_counter: u64,
}

impl ApplicantGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            applicant_counter: 0,
        }
    }

    fn next_ref(&mut self) -> String {
        self.applicant_counter += 1;
        format!("app_{:08}", self.applicant_counter)
    }

    /// Generate an applicant with a clean repayment history
    fn generate_low_risk(&mut self) -> SampleLine {
        let income = self.rng.gen_range(600_000.0..5_000_000.0_f64).round();
        let record = ApplicantRecord {
            age: self.rng.gen_range(25..65),
            income,
            loan_amount: (income * self.rng.gen_range(0.3..1.5)).round(),
            loan_tenure_months: self.rng.gen_range(6..60),
            avg_dpd_per_delinquency: self.rng.gen_range(0.0..5.0_f64).round(),
            delinquency_ratio: self.rng.gen_range(0.0..10.0_f64).round(),
            credit_utilization_ratio: self.rng.gen_range(0.0..40.0_f64).round(),
            num_open_accounts: self.rng.gen_range(1..=3),
            residence_type: self.random_choice(ResidenceType::ALL),
            loan_purpose: self.random_choice(LoanPurpose::ALL),
            loan_type: LoanType::Secured,
        };

        SampleLine {
            applicant_ref: self.next_ref(),
            record,
        }
    }

    /// Generate an over-leveraged applicant with frequent delinquencies
    fn generate_high_risk(&mut self) -> SampleLine {
        let income = self.rng.gen_range(200_000.0..1_500_000.0_f64).round();
        let record = ApplicantRecord {
            age: self.rng.gen_range(18..35),
            income,
            loan_amount: (income * self.rng.gen_range(2.5..4.5)).round(),
            loan_tenure_months: self.rng.gen_range(24..60),
            avg_dpd_per_delinquency: self.rng.gen_range(10.0..30.0_f64).round(),
            delinquency_ratio: self.rng.gen_range(30.0..90.0_f64).round(),
            credit_utilization_ratio: self.rng.gen_range(60.0..100.0_f64).round(),
            num_open_accounts: self.rng.gen_range(2..=4),
            residence_type: ResidenceType::Rented,
            loan_purpose: self.random_choice(&[LoanPurpose::Personal, LoanPurpose::Home]),
            loan_type: LoanType::Unsecured,
        };

        SampleLine {
            applicant_ref: self.next_ref(),
            record,
        }
    }

    fn random_choice<T: Copy>(&mut self, choices: &[T]) -> T {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_applicants=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100);
    let risky_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.2_f64)
        .clamp(0.0, 1.0);
    let output = args.get(3);

    info!(count, risky_rate, output = ?output, "Generating sample applicants");

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut generator = ApplicantGenerator::new();
    let mut rng = rand::thread_rng();
    let mut high_risk_count = 0;

    for _ in 0..count {
        let line = if rng.gen_bool(risky_rate) {
            high_risk_count += 1;
            generator.generate_high_risk()
        } else {
            generator.generate_low_risk()
        };

        writeln!(writer, "{}", serde_json::to_string(&line)?)?;
    }
    writer.flush()?;

    info!(
        "Completed! Wrote {} applicants ({} low risk, {} high risk)",
        count,
        count - high_risk_count,
        high_risk_count
    );

    Ok(())
}
