//! In-memory statistics for batch scoring runs.

use crate::types::prediction::{PredictionResult, Rating};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Collector for scoring performance and outcome distribution
pub struct ScoringMetrics {
    /// Applicants scored successfully
    pub applicants_scored: AtomicU64,
    /// Applicants rejected by validation or schema checks
    pub applicants_failed: AtomicU64,
    /// Predictions by rating
    ratings: RwLock<HashMap<Rating, u64>>,
    /// Scoring times (in microseconds)
    scoring_times: RwLock<Vec<u64>>,
    /// Default probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Sum of credit scores, for the mean
    credit_score_total: AtomicU64,
    start_time: Instant,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self {
            applicants_scored: AtomicU64::new(0),
            applicants_failed: AtomicU64::new(0),
            ratings: RwLock::new(HashMap::new()),
            scoring_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            credit_score_total: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, scoring_time: Duration, prediction: &PredictionResult) {
        self.applicants_scored.fetch_add(1, Ordering::Relaxed);
        self.credit_score_total
            .fetch_add(prediction.credit_score.max(0) as u64, Ordering::Relaxed);

        if let Ok(mut times) = self.scoring_times.write() {
            times.push(scoring_time.as_micros() as u64);
            // Keep only last 10000
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (prediction.default_probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut ratings) = self.ratings.write() {
            *ratings.entry(prediction.rating).or_insert(0) += 1;
        }
    }

    /// Record an applicant that could not be scored
    pub fn record_failure(&self) {
        self.applicants_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get scoring time statistics
    pub fn get_scoring_stats(&self) -> ScoringStats {
        let mut sorted: Vec<u64> = match self.scoring_times.read() {
            Ok(times) => times.clone(),
            Err(_) => return ScoringStats::default(),
        };
        if sorted.is_empty() {
            return ScoringStats::default();
        }
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ScoringStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Mean integer credit score over successful predictions
    pub fn get_mean_credit_score(&self) -> f64 {
        let scored = self.applicants_scored.load(Ordering::Relaxed);
        if scored == 0 {
            return 0.0;
        }
        self.credit_score_total.load(Ordering::Relaxed) as f64 / scored as f64
    }

    pub fn get_rating_counts(&self) -> HashMap<Rating, u64> {
        self.ratings
            .read()
            .map(|ratings| ratings.clone())
            .unwrap_or_default()
    }

    pub fn get_probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|buckets| *buckets)
            .unwrap_or([0; 10])
    }

    /// Applicants per second since the collector was created
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.applicants_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.applicants_scored.load(Ordering::Relaxed);
        let failed = self.applicants_failed.load(Ordering::Relaxed);
        let timing = self.get_scoring_stats();
        let ratings = self.get_rating_counts();
        let distribution = self.get_probability_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              LOAN RISK SCORER - BATCH SUMMARY                ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Applicants Scored: {:>8}  │  Failed: {:>8}              ║",
            scored, failed
        );
        info!(
            "║ Mean Credit Score: {:>8.1}  │  Throughput: {:>8.1}/s       ║",
            self.get_mean_credit_score(),
            self.get_throughput()
        );
        info!(
            "║ Scoring Time (μs): mean={:>5} p50={:>5} p99={:>5} max={:>5}  ║",
            timing.mean_us, timing.p50_us, timing.p99_us, timing.max_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Ratings:                                                     ║");
        for rating in Rating::ALL {
            let count = ratings.get(&rating).copied().unwrap_or(0);
            if count == 0 && rating == Rating::Undefined {
                continue;
            }
            let pct = if scored > 0 {
                (count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)", rating.as_str(), count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Default Probability Distribution:                            ║");
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default, PartialEq)]
pub struct ScoringStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
