use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Per-trade interest figures computed by the backend from its variable-rate
/// history. Each field independently supersedes the static estimate derived
/// from the trade's own `margin_rate` when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedTradeInfo {
    /// Interest the position accrues per day, as of now
    #[serde(default)]
    pub daily_interest_amount: Option<f64>,

    /// Cumulative interest accrued to date (or to close), accounting for
    /// rate changes over the holding period
    #[serde(default)]
    pub total_interest_with_variable_rate: Option<f64>,

    /// Time-weighted average rate over the holding period (%)
    #[serde(default)]
    pub average_weighted_interest_rate: Option<f64>,
}

/// Snapshot map of trade id → extended interest info.
///
/// Extended info arrives incrementally — one backend fetch per trade, each
/// resolving on its own. Merges therefore build a fresh map instead of
/// mutating in place: a statistics pass holding the previous snapshot keeps
/// reading consistent data, and consumers simply recompute with the new map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendedInfoMap {
    entries: HashMap<Uuid, ExtendedTradeInfo>,
}

impl ExtendedInfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the extended info for a trade.
    #[must_use]
    pub fn get(&self, trade_id: &Uuid) -> Option<&ExtendedTradeInfo> {
        self.entries.get(trade_id)
    }

    /// Number of trades with extended info present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a new map with one entry added or replaced.
    /// The receiver is left untouched.
    #[must_use]
    pub fn with_entry(&self, trade_id: Uuid, info: ExtendedTradeInfo) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(trade_id, info);
        Self { entries }
    }

    /// Return a new map with all of `other`'s entries layered on top of
    /// this one. The receiver is left untouched.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (id, info) in &other.entries {
            entries.insert(*id, info.clone());
        }
        Self { entries }
    }

    /// Return a new map retaining only the given trade ids.
    /// Used after a trade list refresh to drop info for deleted trades.
    #[must_use]
    pub fn retained(&self, keep: &[Uuid]) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(id, _)| keep.contains(*id))
            .map(|(id, info)| (*id, info.clone()))
            .collect();
        Self { entries }
    }
}
