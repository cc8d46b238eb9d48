//! `cost-blame anomaly`: z-score anomaly detection over daily cost series.

use super::OutputArgs;
use crate::context::AppContext;
use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use costblame_core::analytics::select_anomalies;
use costblame_core::export::{AnomalyReport, CsvExporter, Exporter, JsonExporter, write_output};
use costblame_core::{CostSource, DetectorConfig, GroupBy, SeriesQuery, detect_anomalies};
use tracing::{debug, info};

/// Arguments for `anomaly`.
#[derive(Args, Debug)]
pub struct AnomalyArgs {
    /// Group by: service, linked_account, region, usage_type
    #[arg(long, default_value = "service")]
    pub group_by: String,

    /// Number of days of historical data to analyze
    #[arg(long, default_value_t = 30)]
    pub historical_days: u32,

    /// Z-score threshold for anomaly detection
    #[arg(long, default_value_t = 2.0)]
    pub threshold: f64,

    /// Minimum data points required per series
    #[arg(long, default_value_t = 7)]
    pub min_data_points: usize,

    /// Number of results to show (0 for all)
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Show only detected anomalies
    #[arg(long)]
    pub anomalies_only: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Execute anomaly command.
pub async fn execute(ctx: &AppContext, args: AnomalyArgs) -> Result<()> {
    let group_by: GroupBy = args.group_by.parse().context("invalid --group-by")?;
    let config = DetectorConfig {
        historical_days: args.historical_days,
        z_score_threshold: args.threshold,
        min_data_points: args.min_data_points,
    }
    .normalized();

    info!(
        historical_days = config.historical_days,
        z_score_threshold = config.z_score_threshold,
        "Analyzing historical cost data"
    );

    let source = ctx.open_source().await?;
    let query = SeriesQuery::ending_today(group_by, config.historical_days);
    let series = source
        .fetch_daily_series(&query)
        .await
        .context("anomaly detection failed: historical cost query failed")?;

    let scored = detect_anomalies(&series, &config);
    let report = AnomalyReport::new(select_anomalies(&scored, args.anomalies_only, args.top));
    debug!(total = scored.len(), shown = report.count, flagged = report.flagged, "Anomaly detection complete");

    if ctx.wants_json(args.output.json) {
        println!("{}", JsonExporter.export_anomalies(&report)?);
    } else {
        println!("{}", "Cost anomalies".bold().cyan());
        println!(
            "  {}",
            format!(
                "{} days by {}, z-score threshold {:.1}, min {} points",
                config.historical_days, group_by, config.z_score_threshold, config.min_data_points
            )
            .dimmed()
        );
        println!();
        output::print_anomaly_table(&report);
    }

    if let Some(path) = &args.output.csv {
        let csv = CsvExporter.export_anomalies(&report)?;
        write_output(path, &csv).with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("{} Wrote {} rows to {}", "✓".green(), report.count, path.display());
    }

    Ok(())
}
