//! Period-over-period cost deltas.

use crate::source::CostMap;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Percent change reported when spend appears from nothing.
pub const NEW_SPEND_PERCENT_SENTINEL: f64 = 9999.0;

/// Prior spend below this (and current spend at or above it) marks a new spender.
pub const NEW_SPENDER_THRESHOLD: f64 = 0.01;

/// Currency of every amount the tool handles.
pub const CURRENCY: &str = "USD";

/// Cost change for one grouping key between two periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Grouping key.
    pub key: String,
    /// Spend in the current period.
    pub current_cost: f64,
    /// Spend in the prior period.
    pub prior_cost: f64,
    /// `current_cost - prior_cost`.
    pub absolute_delta: f64,
    /// Relative change in percent, or [`NEW_SPEND_PERCENT_SENTINEL`].
    pub percent_change: f64,
    /// Crossed from negligible to material spend.
    pub is_new_spender: bool,
    /// Always [`CURRENCY`].
    pub currency: String,
}

/// Interpretation of [`Delta::percent_change`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentChange {
    /// Ordinary relative change.
    Finite(f64),
    /// Prior spend was zero and current spend is not.
    Unbounded,
}

impl Delta {
    /// Compute the delta for one key.
    pub fn new(key: impl Into<String>, current_cost: f64, prior_cost: f64) -> Self {
        let absolute_delta = current_cost - prior_cost;
        let percent_change = if prior_cost > 0.0 {
            absolute_delta / prior_cost * 100.0
        } else if current_cost > 0.0 {
            NEW_SPEND_PERCENT_SENTINEL
        } else {
            0.0
        };

        Self {
            key: key.into(),
            current_cost,
            prior_cost,
            absolute_delta,
            percent_change,
            is_new_spender: prior_cost < NEW_SPENDER_THRESHOLD && current_cost >= NEW_SPENDER_THRESHOLD,
            currency: CURRENCY.to_string(),
        }
    }

    /// True when the percent change is the new-spend sentinel.
    pub fn is_unbounded_increase(&self) -> bool {
        self.prior_cost <= 0.0 && self.current_cost > 0.0
    }

    /// Percent change with the sentinel decoded.
    pub fn percent(&self) -> PercentChange {
        if self.is_unbounded_increase() {
            PercentChange::Unbounded
        } else {
            PercentChange::Finite(self.percent_change)
        }
    }
}

/// Compute deltas over the union of keys in both periods.
///
/// A key missing from one period counts as zero spend there. The result
/// holds every key exactly once, ordered by signed `absolute_delta`
/// descending, so a large increase ranks above a decrease of equal
/// magnitude. Ties keep union order: current-period keys in their map
/// order, then keys seen only in the prior period.
pub fn compute_deltas(current: &CostMap, prior: &CostMap) -> Vec<Delta> {
    let keys: IndexSet<&String> = current.keys().chain(prior.keys()).collect();

    let mut deltas: Vec<Delta> = keys
        .into_iter()
        .map(|key| {
            let curr = current.get(key).copied().unwrap_or(0.0);
            let prev = prior.get(key).copied().unwrap_or(0.0);
            Delta::new(key.clone(), curr, prev)
        })
        .collect();

    deltas.sort_by(|a, b| b.absolute_delta.total_cmp(&a.absolute_delta));

    debug!(
        current_keys = current.len(),
        prior_keys = prior.len(),
        deltas = deltas.len(),
        "Computed cost deltas"
    );

    deltas
}
