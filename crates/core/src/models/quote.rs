use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current market quotes per symbol, persisted inside the journal snapshot.
///
/// An external poller refreshes this periodically; the statistics engine
/// only reads it. Quotes that fail to parse as finite positive numbers are
/// treated as absent — the engine skips the symbol rather than erroring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteBoard {
    /// Symbol → latest known market price
    pub quotes: HashMap<String, f64>,

    /// Tracks when each symbol's quote was last refreshed.
    /// Used to prune quotes that have gone stale.
    pub last_updated: HashMap<String, NaiveDate>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the quote for a symbol, if present and usable.
    /// Non-finite or non-positive stored values are filtered out here.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.quotes
            .get(&symbol.to_uppercase())
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Insert or update a quote. The symbol is uppercased.
    pub fn set(&mut self, symbol: &str, price: f64, as_of: NaiveDate) {
        let key = symbol.to_uppercase();
        self.quotes.insert(key.clone(), price);
        self.last_updated.insert(key, as_of);
    }

    /// Remove a symbol's quote. Returns true if one was present.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let key = symbol.to_uppercase();
        self.last_updated.remove(&key);
        self.quotes.remove(&key).is_some()
    }

    /// Return a new board with `fresh` quotes layered on top of this one.
    /// The receiver is left untouched, so a statistics pass reading the old
    /// board is never corrupted by a concurrent refresh.
    #[must_use]
    pub fn merged(&self, fresh: &HashMap<String, f64>, as_of: NaiveDate) -> Self {
        let mut board = self.clone();
        for (symbol, price) in fresh {
            board.set(symbol, *price, as_of);
        }
        board
    }

    /// True if the board holds at least one usable (finite, positive) quote.
    #[must_use]
    pub fn has_valid_quote(&self) -> bool {
        self.quotes.values().any(|p| p.is_finite() && *p > 0.0)
    }

    /// Number of symbols with a stored quote (usable or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// When the symbol's quote was last refreshed.
    #[must_use]
    pub fn last_refreshed(&self, symbol: &str) -> Option<NaiveDate> {
        self.last_updated.get(&symbol.to_uppercase()).copied()
    }

    /// Drop quotes last refreshed before `before`.
    /// Returns the number of symbols removed.
    pub fn prune_stale_before(&mut self, before: NaiveDate) -> usize {
        let stale: Vec<String> = self
            .last_updated
            .iter()
            .filter(|(_, updated)| **updated < before)
            .map(|(symbol, _)| symbol.clone())
            .collect();
        for symbol in &stale {
            self.quotes.remove(symbol);
            self.last_updated.remove(symbol);
        }
        stale.len()
    }

    /// Clear all quotes.
    pub fn clear(&mut self) {
        self.quotes.clear();
        self.last_updated.clear();
    }
}
