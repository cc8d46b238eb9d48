//! Command implementations for the cost-blame CLI.

pub mod anomaly;
pub mod blame;
pub mod new_spend;
pub mod spike;

use crate::context::AppContext;
use crate::output;
use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use costblame_core::analytics::Delta;
use costblame_core::export::{CsvExporter, DeltaReport, Exporter, JsonExporter, write_output};
use costblame_core::notify::{SlackNotifier, build_spike_message};
use costblame_core::{Breakdown, TimeWindow, compare_periods};
use std::path::PathBuf;
use tracing::debug;

/// Output options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the results to a CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Webhook options for the delta commands.
#[derive(Args, Debug, Clone, Default)]
pub struct NotifyArgs {
    /// Post the top movers to the webhook from the config file
    #[arg(long)]
    pub notify: bool,

    /// Post the top movers to this incoming webhook URL
    #[arg(long, value_name = "URL")]
    pub slack_webhook: Option<String>,
}

impl NotifyArgs {
    fn webhook<'a>(&'a self, ctx: &'a AppContext) -> Result<Option<&'a str>> {
        if let Some(url) = self.slack_webhook.as_deref() {
            return Ok(Some(url));
        }
        if !self.notify {
            return Ok(None);
        }
        match ctx.config.slack_webhook.as_deref() {
            Some(url) => Ok(Some(url)),
            None => bail!("--notify requires slack_webhook in the config file or COST_BLAME_SLACK_WEBHOOK"),
        }
    }
}

/// A parsed delta request, ready to run.
pub struct DeltaRequest<'a> {
    pub title: &'a str,
    pub window: TimeWindow,
    pub breakdown: Breakdown,
    pub output: &'a OutputArgs,
    pub notify: &'a NotifyArgs,
}

/// Query both periods, select rows with `select`, then print, export and notify.
pub async fn run_delta_report<F>(ctx: &AppContext, request: DeltaRequest<'_>, select: F) -> Result<()>
where
    F: FnOnce(&[Delta]) -> DeltaReport,
{
    let webhook = request.notify.webhook(ctx)?;
    let source = ctx.open_source().await?;

    let deltas = compare_periods(source.as_ref(), &request.window, &request.breakdown)
        .await
        .context("cost query failed")?;
    let report = select(&deltas);
    debug!(total = deltas.len(), shown = report.deltas.len(), "Selected deltas");

    if ctx.wants_json(request.output.json) {
        println!("{}", JsonExporter.export_deltas(&report)?);
    } else {
        if request.window.includes_today() {
            output::warn_incomplete_today(&request.window);
        }
        output::print_title(request.title, &request.window, &request.breakdown);
        output::print_delta_table(&report.deltas);
    }

    if let Some(path) = &request.output.csv {
        let csv = CsvExporter.export_deltas(&report)?;
        write_output(path, &csv).with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("{} Wrote {} rows to {}", "✓".green(), report.deltas.len(), path.display());
    }

    if let Some(url) = webhook {
        let message = build_spike_message(&report.deltas, report.top_n).context("notification failed")?;
        SlackNotifier::new()?.send(url, &message).await.context("notification failed")?;
        eprintln!("{} Sent {} movers to webhook", "✓".green(), message.attachments.len());
    }

    Ok(())
}
