//! `cost-blame new-spend`: spenders that appeared in the current period.

use super::{DeltaRequest, NotifyArgs, OutputArgs, run_delta_report};
use crate::context::AppContext;
use anyhow::{Context, Result};
use clap::Args;
use costblame_core::analytics::select_new_spenders;
use costblame_core::export::DeltaReport;
use costblame_core::{Breakdown, Granularity, GroupBy, TimeWindow};

/// Arguments for `new-spend`.
#[derive(Args, Debug)]
pub struct NewSpendArgs {
    /// Time window (48h, 7d, 30d)
    #[arg(long, default_value = "30d")]
    pub last: String,

    /// Granularity: DAILY or HOURLY
    #[arg(long, default_value = "DAILY")]
    pub granularity: String,

    /// Minimum current spend to consider
    #[arg(long, default_value_t = 50.0)]
    pub min_current: f64,

    /// Group by: service, linked_account, region, usage_type
    #[arg(long, default_value = "service")]
    pub group_by: String,

    /// Optional tag dimension to group by
    #[arg(long)]
    pub tag_key: Option<String>,

    /// Number of results to show (0 for all)
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub notify: NotifyArgs,
}

/// Execute new-spend command.
pub async fn execute(ctx: &AppContext, args: NewSpendArgs) -> Result<()> {
    let window = TimeWindow::parse(&args.last).context("window parsing failed")?;
    let group_by: GroupBy = args.group_by.parse().context("invalid --group-by")?;
    let granularity: Granularity = args.granularity.parse().context("invalid --granularity")?;

    let breakdown = Breakdown::new(group_by)
        .with_granularity(granularity)
        .with_tag(args.tag_key, Vec::new());

    let (min_current, top_n) = (args.min_current, args.top);
    run_delta_report(
        ctx,
        DeltaRequest {
            title: "New spenders",
            window,
            breakdown,
            output: &args.output,
            notify: &args.notify,
        },
        |deltas| DeltaReport {
            deltas: select_new_spenders(deltas, min_current, top_n),
            threshold: 0.0,
            top_n,
        },
    )
    .await
}
