//! Cost-delta and anomaly analytics.
//!
//! Pure, synchronous computations over already-fetched cost data:
//! period-over-period deltas, z-score anomaly scoring, and the filtering
//! applied at the presentation boundary.

pub mod anomaly;
pub mod delta;
pub mod selection;

pub use anomaly::{Anomaly, DetectorConfig, Severity, Stats, compute_stats, detect_anomalies};
pub use delta::{
    CURRENCY, Delta, NEW_SPEND_PERCENT_SENTINEL, NEW_SPENDER_THRESHOLD, PercentChange, compute_deltas,
};
pub use selection::{count_anomalies, select_anomalies, select_deltas, select_new_spenders};
