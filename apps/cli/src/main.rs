//! cost-blame - attribute AWS cost spikes from the command line
//!
//! Compares equal-length billing periods to find which services, accounts,
//! regions or tags moved spend, and scores daily cost series for anomalies.

mod commands;
mod context;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use costblame_core::CostBlameConfig;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{anomaly, blame, new_spend, spike};
use context::AppContext;

/// cost-blame - find out who moved the AWS bill
#[derive(Parser, Debug)]
#[command(
    name = "cost-blame",
    author,
    version,
    about = "Attribute AWS cost spikes to services, accounts, regions and tags",
    long_about = "cost-blame compares the current billing period with the one before it and ranks\nwhat changed. It can also score daily cost series for statistical anomalies.\nData comes from AWS Cost Explorer, or from a local billing export with --input."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (defaults: ~/.cost-blame/config.toml, ./.cost-blame.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// AWS profile
    #[arg(long, global = true)]
    profile: Option<String>,

    /// AWS region [default: us-east-1]
    #[arg(long, global = true)]
    region: Option<String>,

    /// Billing export (.json or .jsonl) to analyse instead of querying AWS
    #[arg(long, global = true, value_name = "PATH")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank cost changes between the current and prior period
    ///
    /// Groups spend by a billing dimension (optionally split by a tag) and
    /// lists the biggest movers first.
    Spike(spike::SpikeArgs),

    /// Attribute cost changes to the values of a cost-allocation tag
    ///
    /// Groups spend by service and tag so each row names a team, project or
    /// environment.
    Blame(blame::BlameArgs),

    /// List spenders that appeared in the current period
    NewSpend(new_spend::NewSpendArgs),

    /// Score each series' latest day against its history
    ///
    /// Uses the z-score of the most recent day relative to the preceding
    /// days, with LOW/MEDIUM/HIGH/CRITICAL severity tiers.
    Anomaly(anomaly::AnomalyArgs),
}

fn log_level(args: &Args, config: &CostBlameConfig) -> Level {
    if args.debug {
        return Level::DEBUG;
    }
    match args.log_level.as_deref().or(config.log_level.as_deref()).unwrap_or("warn") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration errors are reported after logging is up
    let loaded = CostBlameConfig::discover_and_load(args.config.as_deref());
    let level = log_level(&args, loaded.as_ref().unwrap_or(&CostBlameConfig::default()));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = loaded.context("failed to load configuration")?;
    config.merge(&CostBlameConfig {
        profile: args.profile,
        region: args.region,
        input: args.input,
        ..CostBlameConfig::default()
    });

    let ctx = AppContext::new(config);

    match args.command {
        Command::Spike(cmd) => spike::execute(&ctx, cmd).await?,
        Command::Blame(cmd) => blame::execute(&ctx, cmd).await?,
        Command::NewSpend(cmd) => new_spend::execute(&ctx, cmd).await?,
        Command::Anomaly(cmd) => anomaly::execute(&ctx, cmd).await?,
    }

    Ok(())
}
