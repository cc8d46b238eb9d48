//! Local billing-export cost source.
//!
//! Reads line items from a `.json` document (`{"records": [...]}`) or a
//! `.jsonl` file with one record per line, and answers queries the way the
//! billing API would: daily queries widen to whole UTC days, tag dimensions
//! render as `key$value`, and keys keep first-seen order.

use super::{CostMap, CostQuery, CostSource, SeriesMap, SeriesQuery};
use crate::error::{Error, Result};
use crate::grouping::{GroupBy, Granularity, UNKNOWN_GROUP_KEY, build_group_key, tag_dimension_value};
use crate::timewin::start_of_day;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn unknown() -> String {
    UNKNOWN_GROUP_KEY.to_string()
}

/// One billing line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Usage time, RFC 3339 or `YYYY-MM-DD`.
    pub timestamp: String,
    /// AWS service name.
    #[serde(default = "unknown")]
    pub service: String,
    /// Member account id.
    #[serde(default = "unknown")]
    pub linked_account: String,
    /// Region code.
    #[serde(default = "unknown")]
    pub region: String,
    /// Usage type.
    #[serde(default = "unknown")]
    pub usage_type: String,
    /// Cost-allocation tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Unblended cost in USD.
    pub amount: f64,
}

/// `.json` export layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingExport {
    /// Currency of every amount; only USD is supported.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Line items.
    pub records: Vec<CostRecord>,
}

fn default_currency() -> String {
    crate::analytics::CURRENCY.to_string()
}

#[derive(Debug, Clone)]
struct LineItem {
    at: DateTime<Utc>,
    record: CostRecord,
}

impl LineItem {
    fn dimension(&self, group_by: GroupBy) -> &str {
        match group_by {
            GroupBy::Service => &self.record.service,
            GroupBy::LinkedAccount => &self.record.linked_account,
            GroupBy::Region => &self.record.region,
            GroupBy::UsageType => &self.record.usage_type,
        }
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.record.tags.get(key).map(String::as_str)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

/// Cost source backed by a billing export on disk.
#[derive(Debug, Clone)]
pub struct FileCostSource {
    path: PathBuf,
    items: Vec<LineItem>,
}

impl FileCostSource {
    /// Load and validate every record in `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_jsonl = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

        let records = if is_jsonl {
            parse_jsonl(&content)?
        } else {
            let export: BillingExport = serde_json::from_str(&content)
                .map_err(|e| Error::Parse(format!("{}: {}", path.display(), e)))?;
            if export.currency != crate::analytics::CURRENCY {
                return Err(Error::Parse(format!(
                    "{}: unsupported currency {}",
                    path.display(),
                    export.currency
                )));
            }
            export.records
        };

        let source = Self::from_records(path, records)?;
        info!(path = %path.display(), records = source.items.len(), "Loaded billing export");
        Ok(source)
    }

    /// Build from in-memory records; `origin` is used in error messages.
    pub fn from_records(origin: &Path, records: Vec<CostRecord>) -> Result<Self> {
        let items = records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| -> Result<LineItem> {
                let at = parse_timestamp(&record.timestamp).ok_or_else(|| {
                    Error::Parse(format!(
                        "{}: record {}: invalid timestamp {:?}",
                        origin.display(),
                        idx + 1,
                        record.timestamp
                    ))
                })?;
                Ok(LineItem { at, record })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path: origin.to_path_buf(),
            items,
        })
    }
}

fn parse_jsonl(content: &str) -> Result<Vec<CostRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| Error::Parse(format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}

#[async_trait]
impl CostSource for FileCostSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_costs(&self, query: &CostQuery) -> Result<CostMap> {
        let breakdown = &query.breakdown;
        let (start, end) = match breakdown.granularity {
            Granularity::Daily => (
                start_of_day(query.start).unwrap_or(query.start),
                start_of_day(query.end).unwrap_or(query.end),
            ),
            Granularity::Hourly => (query.start, query.end),
        };

        let mut costs = CostMap::new();
        for item in self.items.iter().filter(|i| i.at >= start && i.at < end) {
            if !breakdown.account_ids.is_empty() && !breakdown.account_ids.contains(&item.record.linked_account) {
                continue;
            }

            let mut values = vec![item.dimension(breakdown.group_by).to_string()];
            if let Some(tag_key) = &breakdown.tag_key {
                let tag_value = item.tag(tag_key);
                if !breakdown.tag_values.is_empty()
                    && !breakdown.tag_values.iter().any(|v| v == tag_value.unwrap_or(""))
                {
                    continue;
                }
                values.push(tag_dimension_value(tag_key, tag_value));
            }

            *costs.entry(build_group_key(&values)).or_insert(0.0) += item.record.amount;
        }

        debug!(
            path = %self.path.display(),
            start = %start,
            end = %end,
            keys = costs.len(),
            "Aggregated billing export"
        );
        Ok(costs)
    }

    async fn fetch_daily_series(&self, query: &SeriesQuery) -> Result<SeriesMap> {
        let start = query.start()?;
        let mut buckets: IndexMap<String, BTreeMap<NaiveDate, f64>> = IndexMap::new();

        for item in self.items.iter().filter(|i| i.at >= start && i.at < query.end) {
            let key = build_group_key(&[item.dimension(query.group_by)]);
            *buckets.entry(key).or_default().entry(item.at.date_naive()).or_insert(0.0) += item.record.amount;
        }

        Ok(buckets
            .into_iter()
            .map(|(key, days)| (key, days.into_values().collect()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Breakdown;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(ts: &str, service: &str, account: &str, team: Option<&str>, amount: f64) -> CostRecord {
        CostRecord {
            timestamp: ts.to_string(),
            service: service.to_string(),
            linked_account: account.to_string(),
            region: "us-east-1".to_string(),
            usage_type: "BoxUsage".to_string(),
            tags: team.map(|t| [("team".to_string(), t.to_string())].into_iter().collect()).unwrap_or_default(),
            amount,
        }
    }

    fn source() -> FileCostSource {
        FileCostSource::from_records(
            Path::new("memory"),
            vec![
                record("2024-03-01", "Amazon EC2", "111", Some("web"), 10.0),
                record("2024-03-01T12:00:00Z", "Amazon EC2", "111", Some("data"), 5.0),
                record("2024-03-02", "Amazon S3", "222", None, 2.5),
                record("2024-03-03", "Amazon EC2", "222", Some("web"), 7.0),
                record("2024-02-28", "Amazon EC2", "111", Some("web"), 100.0),
            ],
        )
        .unwrap()
    }

    fn query(breakdown: Breakdown) -> CostQuery {
        CostQuery {
            start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
            breakdown,
        }
    }

    #[tokio::test]
    async fn test_fetch_costs_by_service() {
        let costs = source().fetch_costs(&query(Breakdown::new(GroupBy::Service))).await.unwrap();
        assert_eq!(costs.len(), 2);
        assert_eq!(costs["Amazon EC2"], 22.0);
        assert_eq!(costs["Amazon S3"], 2.5);
        assert_eq!(costs.get_index(0).unwrap().0, "Amazon EC2");
    }

    #[tokio::test]
    async fn test_fetch_costs_with_tag_group_and_filter() {
        let b = Breakdown::new(GroupBy::Service).with_tag(Some("team".to_string()), Vec::new());
        let costs = source().fetch_costs(&query(b)).await.unwrap();
        assert_eq!(costs["Amazon EC2 | team$web"], 17.0);
        assert_eq!(costs["Amazon EC2 | team$data"], 5.0);
        assert_eq!(costs["Amazon S3 | team$"], 2.5);

        let b = Breakdown::new(GroupBy::Service).with_tag(Some("team".to_string()), vec!["web".to_string()]);
        let costs = source().fetch_costs(&query(b)).await.unwrap();
        assert_eq!(costs.len(), 1);
        assert_eq!(costs["Amazon EC2 | team$web"], 17.0);
    }

    #[tokio::test]
    async fn test_fetch_costs_account_filter() {
        let b = Breakdown::new(GroupBy::LinkedAccount).with_accounts(vec!["222".to_string()]);
        let costs = source().fetch_costs(&query(b)).await.unwrap();
        assert_eq!(costs.len(), 1);
        assert_eq!(costs["222"], 9.5);
    }

    #[tokio::test]
    async fn test_daily_query_widens_to_whole_days() {
        let mut q = query(Breakdown::new(GroupBy::Service));
        q.start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        let costs = source().fetch_costs(&q).await.unwrap();
        assert_eq!(costs["Amazon EC2"], 22.0);

        q.breakdown.granularity = Granularity::Hourly;
        let costs = source().fetch_costs(&q).await.unwrap();
        assert_eq!(costs["Amazon EC2"], 7.0);
    }

    #[tokio::test]
    async fn test_fetch_daily_series() {
        let q = SeriesQuery {
            group_by: GroupBy::Service,
            historical_days: 5,
            end: Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
        };
        let series = source().fetch_daily_series(&q).await.unwrap();
        assert_eq!(series["Amazon EC2"], vec![100.0, 15.0, 7.0]);
        assert_eq!(series["Amazon S3"], vec![2.5]);
    }

    #[tokio::test]
    async fn test_fetch_daily_series_huge_lookback_is_an_error() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let q = SeriesQuery::ending_at(GroupBy::Service, 200_000_000, now);
        let err = source().fetch_daily_series(&q).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn test_open_jsonl() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"timestamp":"2024-03-01","service":"Amazon EC2","amount":1.5}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"timestamp":"2024-03-02","service":"AWS Lambda","amount":0.5}}"#).unwrap();
        let source = FileCostSource::open(file.path()).unwrap();
        assert_eq!(source.items.len(), 2);
        assert_eq!(source.items[0].record.region, "Unknown");
    }

    #[test]
    fn test_open_jsonl_reports_line() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"timestamp":"2024-03-01","amount":1.5}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        let err = FileCostSource::open(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_open_json_document() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"currency":"USD","records":[{{"timestamp":"2024-03-01T05:00:00Z","service":"Amazon RDS","amount":3.0}}]}}"#
        )
        .unwrap();
        let source = FileCostSource::open(file.path()).unwrap();
        assert_eq!(source.items.len(), 1);
    }

    #[test]
    fn test_open_rejects_other_currency() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"currency":"EUR","records":[]}}"#).unwrap();
        assert!(matches!(FileCostSource::open(file.path()), Err(Error::Parse(_))));
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let err = FileCostSource::from_records(Path::new("memory"), vec![record("yesterday", "EC2", "1", None, 1.0)])
            .unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }
}
