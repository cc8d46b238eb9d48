//! Z-score anomaly detection over daily cost series.
//!
//! The most recent point of each series is scored against a baseline made
//! of every preceding point. A flat baseline (standard deviation zero)
//! yields a z-score of zero, so a series that was always $0 and suddenly
//! spends is reported as LOW and not flagged. Use the delta commands to
//! catch that case.

use crate::source::SeriesMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Detector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Days of history to fetch.
    pub historical_days: u32,
    /// `|z|` at or above which a point is an anomaly.
    pub z_score_threshold: f64,
    /// Minimum series length; shorter series are skipped.
    pub min_data_points: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            historical_days: 30,
            z_score_threshold: 2.0,
            min_data_points: 7,
        }
    }
}

impl DetectorConfig {
    /// Replace zero or non-positive settings with their defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            historical_days: if self.historical_days == 0 { defaults.historical_days } else { self.historical_days },
            z_score_threshold: if self.z_score_threshold > 0.0 {
                self.z_score_threshold
            } else {
                defaults.z_score_threshold
            },
            min_data_points: if self.min_data_points == 0 { defaults.min_data_points } else { self.min_data_points },
        }
    }
}

/// Human-facing tier derived from `|z|`, independent of the anomaly threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// `|z| < 2`
    Low,
    /// `2 <= |z| < 3`
    Medium,
    /// `3 <= |z| < 4`
    High,
    /// `|z| >= 4`
    Critical,
}

impl Severity {
    /// Step function over the z-score magnitude.
    pub fn from_z_score(z: f64) -> Self {
        let magnitude = z.abs();
        if magnitude >= 4.0 {
            Severity::Critical
        } else if magnitude >= 3.0 {
            Severity::High
        } else if magnitude >= 2.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Anomaly score for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Grouping key.
    pub key: String,
    /// Last point of the series.
    pub current_cost: f64,
    /// Baseline mean.
    pub historical_mean: f64,
    /// Baseline population standard deviation.
    pub historical_std_dev: f64,
    /// Standard deviations from the baseline mean.
    pub z_score: f64,
    /// Deviation from the baseline mean in percent.
    pub percent_deviation: f64,
    /// `|z_score| >= z_score_threshold`.
    pub is_anomaly: bool,
    /// Tier from [`Severity::from_z_score`].
    pub severity: Severity,
}

/// Mean and population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divides by `n`).
    pub std_dev: f64,
}

/// Compute mean and population standard deviation. Empty input gives zeros.
pub fn compute_stats(values: &[f64]) -> Stats {
    if values.is_empty() {
        return Stats { mean: 0.0, std_dev: 0.0 };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Stats {
        mean,
        std_dev: variance.sqrt(),
    }
}

/// Score the last point of a series against the points before it.
fn score(key: &str, series: &[f64], threshold: f64) -> Option<Anomaly> {
    let (&current_cost, baseline) = series.split_last()?;

    let Stats { mean, std_dev } = compute_stats(baseline);
    let z_score = if std_dev > 0.0 { (current_cost - mean) / std_dev } else { 0.0 };
    let percent_deviation = if mean > 0.0 { (current_cost - mean) / mean * 100.0 } else { 0.0 };

    Some(Anomaly {
        key: key.to_string(),
        current_cost,
        historical_mean: mean,
        historical_std_dev: std_dev,
        z_score,
        percent_deviation,
        is_anomaly: z_score.abs() >= threshold,
        severity: Severity::from_z_score(z_score),
    })
}

/// Score every series with enough history, ordered by `|z|` descending.
///
/// Series shorter than `min_data_points` are skipped silently. Empty series
/// are always skipped; a single-point series (reachable only when
/// `min_data_points <= 1`) is scored against an empty baseline.
pub fn detect_anomalies(series: &SeriesMap, config: &DetectorConfig) -> Vec<Anomaly> {
    let mut skipped = 0usize;
    let mut anomalies: Vec<Anomaly> = series
        .iter()
        .filter_map(|(key, points)| {
            if points.len() < config.min_data_points {
                skipped += 1;
                return None;
            }
            score(key, points, config.z_score_threshold)
        })
        .collect();

    anomalies.sort_by(|a, b| b.z_score.abs().total_cmp(&a.z_score.abs()));

    debug!(
        series = series.len(),
        scored = anomalies.len(),
        skipped,
        flagged = anomalies.iter().filter(|a| a.is_anomaly).count(),
        "Scored cost series"
    );

    anomalies
}
