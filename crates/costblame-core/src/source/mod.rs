//! Billing data sources.
//!
//! A [`CostSource`] answers two questions: how much did each grouping key
//! cost over an interval, and what does each key's daily cost series look
//! like over a lookback window. Implementations must drain any pagination
//! and fail the whole request if any part of it fails.

#[cfg(feature = "aws")]
pub mod cost_explorer;
pub mod file;

#[cfg(feature = "aws")]
pub use cost_explorer::CostExplorerSource;
pub use file::FileCostSource;

use crate::analytics::{Delta, compute_deltas};
use crate::error::{Error, Result};
use crate::grouping::{GroupBy, Granularity};
use crate::timewin::{TimeWindow, start_of_day};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use tracing::info;

/// Grouping key to summed cost, in first-seen order.
pub type CostMap = IndexMap<String, f64>;

/// Grouping key to daily costs in ascending date order.
pub type SeriesMap = IndexMap<String, Vec<f64>>;

/// How costs are broken down and filtered.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    /// Primary dimension.
    pub group_by: GroupBy,
    /// Bucket size.
    pub granularity: Granularity,
    /// Optional cost-allocation tag added as a second grouping dimension.
    pub tag_key: Option<String>,
    /// Restrict to these values of `tag_key`.
    pub tag_values: Vec<String>,
    /// Restrict to these member accounts.
    pub account_ids: Vec<String>,
}

impl Breakdown {
    /// Daily breakdown by a single dimension with no filters.
    pub fn new(group_by: GroupBy) -> Self {
        Self {
            group_by,
            granularity: Granularity::Daily,
            tag_key: None,
            tag_values: Vec::new(),
            account_ids: Vec::new(),
        }
    }

    /// Set the bucket size.
    #[must_use]
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Group by a tag as well, optionally restricted to some of its values.
    #[must_use]
    pub fn with_tag(mut self, tag_key: Option<String>, tag_values: Vec<String>) -> Self {
        self.tag_key = tag_key.filter(|k| !k.is_empty());
        self.tag_values = tag_values;
        self
    }

    /// Restrict to member accounts.
    #[must_use]
    pub fn with_accounts(mut self, account_ids: Vec<String>) -> Self {
        self.account_ids = account_ids;
        self
    }
}

/// A single interval query.
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuery {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
    /// Grouping and filters.
    pub breakdown: Breakdown,
}

/// A lookback query for per-key daily series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    /// Dimension whose values become series keys.
    pub group_by: GroupBy,
    /// Number of days before `end`.
    pub historical_days: u32,
    /// Window end (exclusive), at a UTC midnight.
    pub end: DateTime<Utc>,
}

impl SeriesQuery {
    /// Lookback ending at the start of today (UTC).
    pub fn ending_today(group_by: GroupBy, historical_days: u32) -> Self {
        Self::ending_at(group_by, historical_days, Utc::now())
    }

    /// Lookback ending at the start of the UTC day containing `now`.
    pub fn ending_at(group_by: GroupBy, historical_days: u32, now: DateTime<Utc>) -> Self {
        Self {
            group_by,
            historical_days,
            end: start_of_day(now).unwrap_or(now),
        }
    }

    /// Window start (inclusive). Fails when the lookback reaches past the representable range.
    pub fn start(&self) -> Result<DateTime<Utc>> {
        Duration::try_days(i64::from(self.historical_days))
            .and_then(|lookback| self.end.checked_sub_signed(lookback))
            .ok_or_else(|| Error::Config(format!("historical days out of range: {}", self.historical_days)))
    }
}

/// Billing data collaborator.
#[async_trait]
pub trait CostSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Summed cost per grouping key over `[query.start, query.end)`.
    async fn fetch_costs(&self, query: &CostQuery) -> Result<CostMap>;

    /// Daily cost series per key over the lookback window.
    async fn fetch_daily_series(&self, query: &SeriesQuery) -> Result<SeriesMap>;
}

/// Fetch both periods of a window and compute the full, unfiltered delta list.
pub async fn compare_periods(
    source: &dyn CostSource,
    window: &TimeWindow,
    breakdown: &Breakdown,
) -> Result<Vec<Delta>> {
    info!(
        source = source.name(),
        group_by = %breakdown.group_by,
        granularity = %breakdown.granularity,
        "Querying current period"
    );
    let current = source
        .fetch_costs(&CostQuery {
            start: window.current_start,
            end: window.current_end,
            breakdown: breakdown.clone(),
        })
        .await?;

    info!(source = source.name(), "Querying prior period");
    let prior = source
        .fetch_costs(&CostQuery {
            start: window.prior_start,
            end: window.prior_end,
            breakdown: breakdown.clone(),
        })
        .await?;

    Ok(compute_deltas(&current, &prior))
}
