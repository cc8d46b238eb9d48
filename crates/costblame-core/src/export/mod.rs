//! Report documents and their CSV and JSON renderings.

pub mod csv;
pub mod json;

pub use self::csv::CsvExporter;
pub use self::json::JsonExporter;

use crate::analytics::{Anomaly, Delta, count_anomalies};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Delta results after threshold and cap were applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    /// Selected deltas.
    pub deltas: Vec<Delta>,
    /// Minimum signed delta that was kept.
    pub threshold: f64,
    /// Result cap (0 = none).
    pub top_n: usize,
}

/// Anomaly results after selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Selected anomaly scores.
    pub anomalies: Vec<Anomaly>,
    /// Number of entries in `anomalies`.
    pub count: usize,
    /// Number of flagged entries among `anomalies`.
    pub flagged: usize,
}

impl AnomalyReport {
    /// Wrap a selection.
    pub fn new(anomalies: Vec<Anomaly>) -> Self {
        Self {
            count: anomalies.len(),
            flagged: count_anomalies(&anomalies),
            anomalies,
        }
    }
}

/// Renders reports to a string.
pub trait Exporter {
    /// Render a delta report.
    fn export_deltas(&self, report: &DeltaReport) -> Result<String>;

    /// Render an anomaly report.
    fn export_anomalies(&self, report: &AnomalyReport) -> Result<String>;
}

/// Write rendered output to `path`, creating parent directories.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    info!(path = %path.display(), bytes = content.len(), "Wrote export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Severity;

    #[test]
    fn test_anomaly_report_counts() {
        let a = Anomaly {
            key: "x".to_string(),
            current_cost: 1.0,
            historical_mean: 1.0,
            historical_std_dev: 0.0,
            z_score: 0.0,
            percent_deviation: 0.0,
            is_anomaly: false,
            severity: Severity::Low,
        };
        let mut b = a.clone();
        b.is_anomaly = true;
        let report = AnomalyReport::new(vec![a, b]);
        assert_eq!(report.count, 2);
        assert_eq!(report.flagged, 1);
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_output(&path, "Key\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Key\n");
    }
}
