//! cost-blame core: attribute AWS spend changes and flag anomalous cost series.
//!
//! The analytics in [`analytics`] and [`timewin`] are pure functions over
//! already-fetched data. [`source`] provides the billing collaborators
//! (AWS Cost Explorer or a local billing export), while [`export`] and
//! [`notify`] turn results into CSV, JSON and webhook messages.

pub mod analytics;
pub mod config;
pub mod error;
pub mod export;
pub mod grouping;
pub mod notify;
pub mod source;
pub mod timewin;

pub use analytics::{Anomaly, Delta, DetectorConfig, Severity, compute_deltas, compute_stats, detect_anomalies};
pub use config::CostBlameConfig;
pub use error::{Error, Result};
pub use grouping::{Granularity, GroupBy, build_group_key};
pub use source::{Breakdown, CostMap, CostQuery, CostSource, SeriesMap, SeriesQuery, compare_periods};
pub use timewin::TimeWindow;
