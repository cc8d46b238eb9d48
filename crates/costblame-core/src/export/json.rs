//! JSON exporter for cost reports.

use super::{AnomalyReport, DeltaReport, Exporter};
use crate::error::Result;

/// JSON exporter implementation.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export_deltas(&self, report: &DeltaReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn export_anomalies(&self, report: &AnomalyReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
