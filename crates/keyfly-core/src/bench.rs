//! Latency benchmarking and rate recommendations.
//!
//! The harness drives real operations through the [`Gateway`] facade, so
//! every benchmark call pays the same rate-limit admission a production
//! call would. Statistics are computed per operation class and turned
//! into recommended minimum delays.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use keyfly_api::GatewayCommand;

use crate::config::GatewayConfig;
use crate::error::CoreError;
use crate::gateway::{Gateway, LockerOp, Operation};
use crate::limiter::OperationClass;

/// Safety margin applied to the measured heavy-class mean.
pub const HEAVY_SAFETY_FACTOR: f64 = 2.0;
/// Never recommend a heavy delay below this, however fast the gateway.
pub const HEAVY_FLOOR_SECS: f64 = 1.0;
pub const LIGHT_SAFETY_FACTOR: f64 = 0.5;
pub const LIGHT_FLOOR_SECS: f64 = 0.2;

/// Scanner worker counts above this gain nothing on the gateways seen
/// in the field.
const MAX_SCAN_WORKERS: u32 = 5;

/// One successful timed call.
#[derive(Debug, Clone, Serialize)]
pub struct LatencySample {
    pub class: OperationClass,
    /// What was called, for report readability (e.g. `gateway/status`).
    pub target: String,
    pub seconds: f64,
}

/// Per-class descriptive statistics.
///
/// `std_dev` is the sample standard deviation (N-1 denominator) and is
/// absent when fewer than two samples exist.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub class: OperationClass,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: Option<f64>,
}

impl ClassSummary {
    /// `None` when no samples exist for the class.
    fn from_samples(class: OperationClass, seconds: &[f64]) -> Option<Self> {
        if seconds.is_empty() {
            return None;
        }
        let mut sorted = seconds.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        #[allow(clippy::cast_precision_loss)]
        let mean = sorted.iter().sum::<f64>() / count as f64;

        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        let std_dev = (count >= 2).then(|| {
            #[allow(clippy::cast_precision_loss)]
            let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        });

        Some(Self {
            class,
            count,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            std_dev,
        })
    }
}

/// A safe minimum inter-request delay derived from measurements.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub class: OperationClass,
    pub recommended_delay_secs: f64,
    pub max_requests_per_sec: f64,
}

impl Recommendation {
    fn for_class(class: OperationClass, mean: f64) -> Self {
        let (factor, floor) = match class {
            OperationClass::Heavy => (HEAVY_SAFETY_FACTOR, HEAVY_FLOOR_SECS),
            OperationClass::Light => (LIGHT_SAFETY_FACTOR, LIGHT_FLOOR_SECS),
        };
        let delay = (mean * factor).max(floor);
        Self {
            class,
            recommended_delay_secs: delay,
            max_requests_per_sec: 1.0 / delay,
        }
    }
}

/// Everything one benchmark run produced. Serializable as the JSON
/// report the CLI persists.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub host: String,
    pub generated_at: DateTime<Utc>,
    pub iterations: u32,
    /// Calls that failed or timed out; excluded from statistics.
    pub skipped: usize,
    pub samples: Vec<LatencySample>,
    pub summaries: Vec<ClassSummary>,
    pub recommendations: Vec<Recommendation>,
    /// Worker count the discovery scanner can safely use against this
    /// gateway, derived from the light-class recommendation.
    pub suggested_scan_workers: Option<u32>,
}

/// Progress notification for long benchmark runs.
#[derive(Debug, Clone, Copy)]
pub struct BenchProgress {
    pub completed: usize,
    pub total: usize,
}

/// Run `iterations` rounds of benchmark calls through `gateway`.
///
/// Each round issues the light-class gateway calls (status, locker list)
/// and a heavy-class status call per configured locker with a real
/// secret. Placeholder credentials are left out so a half-configured
/// setup benchmarks what it can. Failed calls never abort the run.
pub async fn run_benchmark(
    gateway: &Gateway,
    config: &GatewayConfig,
    iterations: u32,
    mut progress: impl FnMut(BenchProgress),
) -> Result<BenchmarkReport, CoreError> {
    let mut targets: Vec<(String, Operation)> = vec![
        (
            "gateway/status".into(),
            Operation::Gateway(GatewayCommand::Status),
        ),
        (
            "gateway/lockers".into(),
            Operation::Gateway(GatewayCommand::ListLockers),
        ),
    ];
    for (name, credential) in &config.lockers {
        if credential.is_placeholder() {
            warn!(locker = %name, "skipping placeholder credential");
            continue;
        }
        targets.push((
            format!("locker/{name}/status"),
            Operation::Locker {
                credential: credential.clone(),
                op: LockerOp::Status,
            },
        ));
    }

    let total = targets.len() * iterations as usize;
    let mut completed = 0;
    let mut samples = Vec::new();
    let mut skipped = 0;

    for _ in 0..iterations {
        for (label, operation) in &targets {
            match gateway.execute(operation).await {
                Ok(result) if result.success => {
                    samples.push(LatencySample {
                        class: operation.class(),
                        target: label.clone(),
                        seconds: result.latency.as_secs_f64(),
                    });
                }
                Ok(result) => {
                    debug!(target = %label, code = result.code, "unsuccessful, skipping");
                    skipped += 1;
                }
                Err(e) => {
                    debug!(target = %label, error = %e, "call failed, skipping");
                    skipped += 1;
                }
            }
            completed += 1;
            progress(BenchProgress { completed, total });
        }
    }

    Ok(summarize(
        &config.host,
        iterations,
        samples,
        skipped,
    ))
}

fn summarize(
    host: &str,
    iterations: u32,
    samples: Vec<LatencySample>,
    skipped: usize,
) -> BenchmarkReport {
    let mut summaries = Vec::new();
    let mut recommendations = Vec::new();
    let mut suggested_scan_workers = None;

    for class in [OperationClass::Heavy, OperationClass::Light] {
        let seconds: Vec<f64> = samples
            .iter()
            .filter(|s| s.class == class)
            .map(|s| s.seconds)
            .collect();
        if let Some(summary) = ClassSummary::from_samples(class, &seconds) {
            let rec = Recommendation::for_class(class, summary.mean);
            if class == OperationClass::Light {
                suggested_scan_workers = Some(scan_workers(rec.recommended_delay_secs));
            }
            summaries.push(summary);
            recommendations.push(rec);
        }
    }

    BenchmarkReport {
        host: host.to_owned(),
        generated_at: Utc::now(),
        iterations,
        skipped,
        samples,
        summaries,
        recommendations,
        suggested_scan_workers,
    }
}

/// `min(1/delay, 5)`, at least one worker.
fn scan_workers(delay_secs: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let raw = (1.0 / delay_secs) as u32;
    raw.clamp(1, MAX_SCAN_WORKERS)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn summary_matches_hand_computed_values() {
        let s = ClassSummary::from_samples(OperationClass::Light, &[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(s.count, 3);
        assert!((s.mean - 0.2).abs() < 1e-12);
        assert_eq!(s.median, 0.2);
        assert_eq!(s.min, 0.1);
        assert_eq!(s.max, 0.3);
        // Sample (N-1) standard deviation of [0.1, 0.2, 0.3] is 0.1.
        assert!((s.std_dev.unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn even_count_median_averages_the_middle_pair() {
        let s = ClassSummary::from_samples(OperationClass::Light, &[0.4, 0.1, 0.2, 0.3]).unwrap();
        assert!((s.median - 0.25).abs() < 1e-12);
    }

    #[test]
    fn single_sample_has_no_std_dev() {
        let s = ClassSummary::from_samples(OperationClass::Heavy, &[0.5]).unwrap();
        assert_eq!(s.std_dev, None);
        assert_eq!(s.mean, 0.5);
    }

    #[test]
    fn no_samples_no_summary() {
        assert!(ClassSummary::from_samples(OperationClass::Heavy, &[]).is_none());
    }

    #[test]
    fn heavy_recommendation_doubles_the_mean() {
        let r = Recommendation::for_class(OperationClass::Heavy, 0.8);
        assert!((r.recommended_delay_secs - 1.6).abs() < 1e-12);
    }

    #[test]
    fn floors_bound_fast_gateways() {
        let heavy = Recommendation::for_class(OperationClass::Heavy, 0.01);
        assert_eq!(heavy.recommended_delay_secs, HEAVY_FLOOR_SECS);
        let light = Recommendation::for_class(OperationClass::Light, 0.01);
        assert_eq!(light.recommended_delay_secs, LIGHT_FLOOR_SECS);
    }

    #[test]
    fn scan_workers_clamped_to_five() {
        assert_eq!(scan_workers(0.2), 5);
        assert_eq!(scan_workers(0.1), 5);
        assert_eq!(scan_workers(0.5), 2);
        assert_eq!(scan_workers(2.0), 1);
    }

    #[test]
    fn summarize_splits_classes() {
        let samples = vec![
            LatencySample {
                class: OperationClass::Light,
                target: "gateway/status".into(),
                seconds: 0.1,
            },
            LatencySample {
                class: OperationClass::Light,
                target: "gateway/status".into(),
                seconds: 0.3,
            },
            LatencySample {
                class: OperationClass::Heavy,
                target: "locker/a/status".into(),
                seconds: 0.6,
            },
        ];
        let report = summarize("gw", 2, samples, 1);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.recommendations.len(), 2);
        // Light mean 0.2 * 0.5 = 0.1, floored to 0.2 -> 5 workers.
        assert_eq!(report.suggested_scan_workers, Some(5));
        let heavy = report
            .recommendations
            .iter()
            .find(|r| r.class == OperationClass::Heavy)
            .unwrap();
        assert!((heavy.recommended_delay_secs - 1.2).abs() < 1e-12);
    }
}
