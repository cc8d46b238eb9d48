//! CSV exporter for cost reports.

use super::{AnomalyReport, DeltaReport, Exporter};
use crate::error::{Error, Result};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Format an amount with 2 decimal places.
    fn format_amount(value: f64) -> String {
        format!("{:.2}", value)
    }

    fn yes_no(flag: bool) -> &'static str {
        if flag { "Yes" } else { "No" }
    }

    fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
        let data = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(data).map_err(|e| Error::Parse(format!("invalid UTF-8 in CSV: {}", e)))
    }
}

impl Exporter for CsvExporter {
    fn export_deltas(&self, report: &DeltaReport) -> Result<String> {
        let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(Vec::new());

        writer.write_record([
            "Key",
            "Current Cost",
            "Prior Cost",
            "Absolute Delta",
            "Percent Change",
            "New Spender",
            "Currency",
        ])?;

        for d in &report.deltas {
            writer.write_record([
                d.key.clone(),
                Self::format_amount(d.current_cost),
                Self::format_amount(d.prior_cost),
                Self::format_amount(d.absolute_delta),
                Self::format_amount(d.percent_change),
                Self::yes_no(d.is_new_spender).to_string(),
                d.currency.clone(),
            ])?;
        }

        writer.flush()?;
        Self::finish(writer)
    }

    fn export_anomalies(&self, report: &AnomalyReport) -> Result<String> {
        let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(Vec::new());

        writer.write_record([
            "Key",
            "Current Cost",
            "Historical Mean",
            "Historical Std Dev",
            "Z-Score",
            "Percent Deviation",
            "Anomaly",
            "Severity",
        ])?;

        for a in &report.anomalies {
            writer.write_record([
                a.key.clone(),
                Self::format_amount(a.current_cost),
                Self::format_amount(a.historical_mean),
                Self::format_amount(a.historical_std_dev),
                Self::format_amount(a.z_score),
                Self::format_amount(a.percent_deviation),
                Self::yes_no(a.is_anomaly).to_string(),
                a.severity.to_string(),
            ])?;
        }

        writer.flush()?;
        Self::finish(writer)
    }
}
