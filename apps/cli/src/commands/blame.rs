//! `cost-blame blame`: attribute cost changes to tag values.

use super::{DeltaRequest, NotifyArgs, OutputArgs, run_delta_report};
use crate::context::AppContext;
use anyhow::{Context, Result};
use clap::Args;
use costblame_core::analytics::select_deltas;
use costblame_core::export::DeltaReport;
use costblame_core::{Breakdown, Granularity, GroupBy, TimeWindow};

/// Arguments for `blame`.
#[derive(Args, Debug)]
pub struct BlameArgs {
    /// Time window (48h, 7d, 30d)
    #[arg(long, default_value = "30d")]
    pub last: String,

    /// Granularity: DAILY or HOURLY
    #[arg(long, default_value = "DAILY")]
    pub granularity: String,

    /// Tag key to group by
    #[arg(long, required = true)]
    pub tag_key: String,

    /// Only include these tag values (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub tag_values: Vec<String>,

    /// Only include these member accounts (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub accounts: Vec<String>,

    /// Minimum USD delta to report (signed; negative values include decreases)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Number of results to show (0 for all)
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub notify: NotifyArgs,
}

/// Execute blame command.
pub async fn execute(ctx: &AppContext, args: BlameArgs) -> Result<()> {
    let window = TimeWindow::parse(&args.last).context("window parsing failed")?;
    let granularity: Granularity = args.granularity.parse().context("invalid --granularity")?;

    let breakdown = Breakdown::new(GroupBy::Service)
        .with_granularity(granularity)
        .with_tag(Some(args.tag_key), args.tag_values)
        .with_accounts(args.accounts);

    let (threshold, top_n) = (args.threshold, args.top);
    run_delta_report(
        ctx,
        DeltaRequest {
            title: "Cost changes by tag",
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
