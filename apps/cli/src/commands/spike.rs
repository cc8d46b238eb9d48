//! `cost-blame spike`: rank period-over-period cost changes.

use super::{DeltaRequest, NotifyArgs, OutputArgs, run_delta_report};
use crate::context::AppContext;
use anyhow::{Context, Result};
use clap::Args;
use costblame_core::analytics::select_deltas;
use costblame_core::export::DeltaReport;
use costblame_core::{Breakdown, Granularity, GroupBy, TimeWindow};

/// Arguments for `spike`.
#[derive(Args, Debug)]
pub struct SpikeArgs {
    /// Time window (48h, 7d, 30d)
    #[arg(long, default_value = "7d")]
    pub last: String,

    /// Granularity: DAILY or HOURLY
    #[arg(long, default_value = "DAILY")]
    pub granularity: String,

    /// Minimum USD delta to report (signed; negative values include decreases)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Group by: service, linked_account, region, usage_type
    #[arg(long, default_value = "service")]
    pub group_by: String,

    /// Optional tag dimension to group by
    #[arg(long)]
    pub tag_key: Option<String>,

    /// Only include these member accounts (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub accounts: Vec<String>,

    /// Number of results to show (0 for all)
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub notify: NotifyArgs,
}

/// Execute spike command.
pub async fn execute(ctx: &AppContext, args: SpikeArgs) -> Result<()> {
    let window = TimeWindow::parse(&args.last).context("window parsing failed")?;
    let group_by: GroupBy = args.group_by.parse().context("invalid --group-by")?;
    let granularity: Granularity = args.granularity.parse().context("invalid --granularity")?;

    let breakdown = Breakdown::new(group_by)
        .with_granularity(granularity)
        .with_tag(args.tag_key, Vec::new())
        .with_accounts(args.accounts);

    let (threshold, top_n) = (args.threshold, args.top);
    run_delta_report(
        ctx,
        DeltaRequest {
            title: "Cost spikes",
            window,
            breakdown,
            output: &args.output,
            notify: &args.notify,
        },
        |deltas| DeltaReport {
            deltas: select_deltas(deltas, threshold, top_n),
            threshold,
            top_n,
        },
    )
    .await
}
