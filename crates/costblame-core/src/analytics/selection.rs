//! Filtering and capping applied before results are shown or exported.
//!
//! Analytics always return complete lists; these helpers apply the
//! caller's threshold and `top_n` at the presentation boundary. A `top_n`
//! of zero means no cap.

use super::anomaly::Anomaly;
use super::delta::Delta;

fn cap<T>(mut items: Vec<T>, top_n: usize) -> Vec<T> {
    if top_n > 0 {
        items.truncate(top_n);
    }
    items
}

/// Keep deltas whose signed `absolute_delta` is at least `threshold`, then cap.
///
/// The comparison is signed: with the default threshold of zero, decreases
/// are dropped.
pub fn select_deltas(deltas: &[Delta], threshold: f64, top_n: usize) -> Vec<Delta> {
    let kept = deltas.iter().filter(|d| d.absolute_delta >= threshold).cloned().collect();
    cap(kept, top_n)
}

/// Keep new spenders with current spend of at least `min_current`, then cap.
pub fn select_new_spenders(deltas: &[Delta], min_current: f64, top_n: usize) -> Vec<Delta> {
    let kept = deltas
        .iter()
        .filter(|d| d.is_new_spender && d.current_cost >= min_current)
        .cloned()
        .collect();
    cap(kept, top_n)
}

/// Optionally keep only flagged anomalies, then cap.
pub fn select_anomalies(anomalies: &[Anomaly], anomalies_only: bool, top_n: usize) -> Vec<Anomaly> {
    let kept = anomalies.iter().filter(|a| !anomalies_only || a.is_anomaly).cloned().collect();
    cap(kept, top_n)
}

/// Number of flagged anomalies.
pub fn count_anomalies(anomalies: &[Anomaly]) -> usize {
    anomalies.iter().filter(|a| a.is_anomaly).count()
}
