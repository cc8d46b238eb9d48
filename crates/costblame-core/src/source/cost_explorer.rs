//! AWS Cost Explorer backed cost source.

use super::{CostMap, CostQuery, CostSource, SeriesMap, SeriesQuery};
use crate::error::{Error, Result};
use crate::grouping::{Granularity, GroupBy, build_group_key};
use crate::timewin::format_billing_date;
use async_trait::async_trait;
use aws_sdk_costexplorer::{
    Client,
    error::DisplayErrorContext,
    operation::get_cost_and_usage::GetCostAndUsageOutput,
    types::{
        DateInterval, Dimension, DimensionValues, Expression, Granularity as CeGranularity, GroupDefinition,
        GroupDefinitionType, TagValues,
    },
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Cost metric summed for every query.
pub const COST_METRIC: &str = "UnblendedCost";

/// Queries `GetCostAndUsage`, draining `NextPageToken` pagination.
pub struct CostExplorerSource {
    client: Client,
}

impl CostExplorerSource {
    /// Build a client from the default credential chain, an optional named profile and a region.
    pub async fn connect(profile: Option<&str>, region: &str) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        info!(region, profile = profile.unwrap_or("default"), "Connected to Cost Explorer");
        Self {
            client: Client::new(&config),
        }
    }

    /// Run one query to completion, handing every page to `on_page`.
    async fn paginate<F>(
        &self,
        start: &str,
        end: &str,
        granularity: CeGranularity,
        group_by: Vec<GroupDefinition>,
        filter: Option<Expression>,
        mut on_page: F,
    ) -> Result<()>
    where
        F: FnMut(&GetCostAndUsageOutput) + Send,
    {
        let interval = DateInterval::builder()
            .start(start)
            .end(end)
            .build()
            .map_err(|e| Error::Query(format!("invalid date interval {start}..{end}: {e}")))?;

        let mut next_token: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let output = self
                .client
                .get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(granularity.clone())
                .metrics(COST_METRIC)
                .set_group_by(Some(group_by.clone()))
                .set_filter(filter.clone())
                .set_next_page_token(next_token.take())
                .send()
                .await
                .map_err(|e| Error::Query(format!("{start}..{end}: {}", DisplayErrorContext(&e))))?;

            pages += 1;
            on_page(&output);

            match output.next_page_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(start, end, pages, "Drained Cost Explorer pages");
        Ok(())
    }
}

fn dimension_group(group_by: GroupBy) -> GroupDefinition {
    GroupDefinition::builder()
        .r#type(GroupDefinitionType::Dimension)
        .key(group_by.dimension())
        .build()
}

fn group_definitions(query: &CostQuery) -> Vec<GroupDefinition> {
    let mut groups = vec![dimension_group(query.breakdown.group_by)];
    if let Some(tag_key) = &query.breakdown.tag_key {
        groups.push(
            GroupDefinition::builder()
                .r#type(GroupDefinitionType::Tag)
                .key(tag_key)
                .build(),
        );
    }
    groups
}

fn build_filter(query: &CostQuery) -> Option<Expression> {
    let mut clauses = Vec::new();

    if !query.breakdown.account_ids.is_empty() {
        clauses.push(
            Expression::builder()
                .dimensions(
                    DimensionValues::builder()
                        .key(Dimension::LinkedAccount)
                        .set_values(Some(query.breakdown.account_ids.clone()))
                        .build(),
                )
                .build(),
        );
    }

    if let Some(tag_key) = &query.breakdown.tag_key {
        if !query.breakdown.tag_values.is_empty() {
            clauses.push(
                Expression::builder()
                    .tags(
                        TagValues::builder()
                            .key(tag_key)
                            .set_values(Some(query.breakdown.tag_values.clone()))
                            .build(),
                    )
                    .build(),
            );
        }
    }

    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(Expression::builder().set_and(Some(clauses)).build()),
    }
}

fn ce_granularity(granularity: Granularity) -> CeGranularity {
    match granularity {
        Granularity::Daily => CeGranularity::Daily,
        Granularity::Hourly => CeGranularity::Hourly,
    }
}

fn group_amount(group: &aws_sdk_costexplorer::types::Group) -> Option<f64> {
    group
        .metrics()
        .and_then(|m| m.get(COST_METRIC))
        .and_then(|v| v.amount())
        .and_then(|a| a.parse::<f64>().ok())
}

fn date_bounds(start: DateTime<Utc>, end: DateTime<Utc>, granularity: Granularity) -> (String, String) {
    (format_billing_date(start, granularity), format_billing_date(end, granularity))
}

#[async_trait]
impl CostSource for CostExplorerSource {
    fn name(&self) -> &str {
        "cost-explorer"
    }

    async fn fetch_costs(&self, query: &CostQuery) -> Result<CostMap> {
        let granularity = query.breakdown.granularity;
        let (start, end) = date_bounds(query.start, query.end, granularity);
        let mut costs = CostMap::new();

        self.paginate(
            &start,
            &end,
            ce_granularity(granularity),
            group_definitions(query),
            build_filter(query),
            |page| {
                for bucket in page.results_by_time() {
                    for group in bucket.groups() {
                        if let Some(amount) = group_amount(group) {
                            *costs.entry(build_group_key(group.keys())).or_insert(0.0) += amount;
                        }
                    }
                }
            },
        )
        .await?;

        Ok(costs)
    }

    async fn fetch_daily_series(&self, query: &SeriesQuery) -> Result<SeriesMap> {
        let (start, end) = date_bounds(query.start()?, query.end, Granularity::Daily);
        let mut series = SeriesMap::new();

        self.paginate(
            &start,
            &end,
            CeGranularity::Daily,
            vec![dimension_group(query.group_by)],
            None,
            |page| {
                for bucket in page.results_by_time() {
                    for group in bucket.groups() {
                        if let Some(amount) = group_amount(group) {
                            series.entry(build_group_key(group.keys())).or_default().push(amount);
                        }
                    }
                }
            },
        )
        .await?;

        Ok(series)
    }
}
