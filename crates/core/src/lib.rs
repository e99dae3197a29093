pub mod api;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use log::warn;
use models::{
    extended::{ExtendedInfoMap, ExtendedTradeInfo},
    journal::Journal,
    statistics::{StatisticsSummary, SymbolStatistics},
    trade::{Trade, TradeSortOrder},
};
use services::{journal_service::JournalService, statistics_service::StatisticsService};
use std::collections::HashMap;
use storage::manager::SnapshotStore;

use api::traits::{QuoteSource, TradeDataSource};
use errors::CoreError;

/// Main entry point for the Trade Tracker core library.
/// Holds the journal state and all services needed to operate on it.
#[must_use]
pub struct TradeTracker {
    journal: Journal,
    journal_service: JournalService,
    statistics_service: StatisticsService,
    /// Per-trade variable-rate interest figures, replaced wholesale on
    /// every merge so in-flight reads keep a consistent snapshot.
    extended: ExtendedInfoMap,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for TradeTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeTracker")
            .field("trades", &self.journal.trades.len())
            .field("quoted_symbols", &self.journal.quotes.len())
            .field("extended_infos", &self.extended.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl TradeTracker {
    /// Create a brand new empty journal.
    pub fn create_new() -> Self {
        Self::build(Journal::default())
    }

    /// Load an existing journal from snapshot bytes.
    /// Use this for WASM / browser builds where the frontend handles persistence.
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        let journal = SnapshotStore::load_from_bytes(data)?;
        Ok(Self::build(journal))
    }

    /// Save the current journal to snapshot bytes.
    /// Returns raw bytes the frontend can persist however it likes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = SnapshotStore::save_to_bytes(&self.journal)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from a snapshot file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Self, CoreError> {
        let journal = SnapshotStore::load_from_file(path)?;
        Ok(Self::build(journal))
    }

    /// Save to a snapshot file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str) -> Result<(), CoreError> {
        SnapshotStore::save_to_file(&self.journal, path)?;
        self.dirty = false;
        Ok(())
    }

    // ── Trade Management ────────────────────────────────────────────

    /// Record a buy action: a new open trade enters the journal.
    pub fn record_buy(
        &mut self,
        symbol: impl Into<String>,
        entry_price: f64,
        quantity: f64,
        entry_date: NaiveDate,
        margin_rate: f64,
    ) -> Result<uuid::Uuid, CoreError> {
        let trade = Trade::buy(symbol, entry_price, quantity, entry_date, margin_rate);
        let id = trade.id;
        self.journal_service.open_trade(&mut self.journal, trade)?;
        self.dirty = true;
        Ok(id)
    }

    /// Record a buy action with notes attached.
    #[allow(clippy::too_many_arguments)]
    pub fn record_buy_with_notes(
        &mut self,
        symbol: impl Into<String>,
        entry_price: f64,
        quantity: f64,
        entry_date: NaiveDate,
        margin_rate: f64,
        notes: impl Into<String>,
    ) -> Result<uuid::Uuid, CoreError> {
        let trade =
            Trade::buy_with_notes(symbol, entry_price, quantity, entry_date, margin_rate, notes);
        let id = trade.id;
        self.journal_service.open_trade(&mut self.journal, trade)?;
        self.dirty = true;
        Ok(id)
    }

    /// Record a sell action: the open trade gains its exit leg and is
    /// closed from here on.
    pub fn close_trade(
        &mut self,
        trade_id: uuid::Uuid,
        exit_price: Option<f64>,
        exit_date: NaiveDate,
    ) -> Result<(), CoreError> {
        self.journal_service
            .close_trade(&mut self.journal, trade_id, exit_price, exit_date)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a trade from the journal entirely.
    /// Its extended interest info, if any, goes with it.
    pub fn delete_trade(&mut self, trade_id: uuid::Uuid) -> Result<(), CoreError> {
        self.journal_service.delete_trade(&mut self.journal, trade_id)?;
        let remaining: Vec<uuid::Uuid> = self.journal.trades.iter().map(|t| t.id).collect();
        self.extended = self.extended.retained(&remaining);
        self.dirty = true;
        Ok(())
    }

    /// Set or clear notes on an existing trade.
    pub fn set_trade_notes(
        &mut self,
        trade_id: uuid::Uuid,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        self.journal_service
            .set_notes(&mut self.journal, trade_id, notes)?;
        self.dirty = true;
        Ok(())
    }

    /// Get a single trade by its ID.
    #[must_use]
    pub fn get_trade(&self, trade_id: uuid::Uuid) -> Option<&Trade> {
        self.journal.trades.iter().find(|t| t.id == trade_id)
    }

    /// Get all trades, newest entry date first.
    #[must_use]
    pub fn get_trades(&self) -> Vec<&Trade> {
        self.journal_service.get_trades(&self.journal)
    }

    /// Get trades filtered by symbol (case-insensitive).
    /// Returns newest-first, consistent with `get_trades()`.
    #[must_use]
    pub fn get_trades_for_symbol(&self, symbol: &str) -> Vec<&Trade> {
        let upper = symbol.to_uppercase();
        let mut trades: Vec<&Trade> = self
            .journal
            .trades
            .iter()
            .filter(|t| t.symbol == upper)
            .collect();
        trades.reverse(); // internal storage is oldest-first; reverse for newest-first
        trades
    }

    /// Get all open trades, newest-first.
    #[must_use]
    pub fn get_open_trades(&self) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> =
            self.journal.trades.iter().filter(|t| t.is_open()).collect();
        trades.reverse();
        trades
    }

    /// Get all closed trades, newest-first.
    #[must_use]
    pub fn get_closed_trades(&self) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> =
            self.journal.trades.iter().filter(|t| t.is_closed()).collect();
        trades.reverse();
        trades
    }

    /// Get trades entered within a date range (inclusive).
    /// Trades without an entry date are not included.
    #[must_use]
    pub fn get_trades_in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self
            .journal
            .trades
            .iter()
            .filter(|t| t.entry_date.is_some_and(|d| d >= from && d <= to))
            .collect();
        trades.reverse();
        trades
    }

    /// Search trades by matching query against symbol and notes (case-insensitive).
    #[must_use]
    pub fn search_trades(&self, query: &str) -> Vec<&Trade> {
        let q = query.to_lowercase();
        self.journal
            .trades
            .iter()
            .filter(|t| {
                t.symbol.to_lowercase().contains(&q)
                    || t.notes.as_deref().unwrap_or("").to_lowercase().contains(&q)
            })
            .collect()
    }

    /// Get trades sorted by a specific order.
    #[must_use]
    pub fn get_trades_sorted(&self, order: &TradeSortOrder) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self.journal.trades.iter().collect();
        match order {
            TradeSortOrder::EntryDateDesc => trades.sort_by(|a, b| b.entry_date.cmp(&a.entry_date)),
            TradeSortOrder::EntryDateAsc => trades.sort_by(|a, b| a.entry_date.cmp(&b.entry_date)),
            TradeSortOrder::CostDesc => trades.sort_by(|a, b| {
                b.total_cost()
                    .partial_cmp(&a.total_cost())
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            TradeSortOrder::CostAsc => trades.sort_by(|a, b| {
                a.total_cost()
                    .partial_cmp(&b.total_cost())
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            TradeSortOrder::SymbolAsc => trades.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
            TradeSortOrder::SymbolDesc => trades.sort_by(|a, b| b.symbol.cmp(&a.symbol)),
        }
        trades
    }

    /// Get the total number of trades without materializing a sorted vector.
    #[must_use]
    pub fn trade_count(&self) -> usize {
        self.journal.trades.len()
    }

    /// Get all unique symbols that appear in the journal, sorted.
    #[must_use]
    pub fn get_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .journal
            .trades
            .iter()
            .map(|t| t.symbol.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    /// Symbols with at least one open position, sorted.
    /// These are the symbols worth polling quotes for.
    #[must_use]
    pub fn get_held_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .journal
            .trades
            .iter()
            .filter(|t| t.is_open())
            .map(|t| t.symbol.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    // ── Statistics ──────────────────────────────────────────────────

    /// Full statistics summary as of today.
    #[must_use]
    pub fn statistics(&self) -> StatisticsSummary {
        self.statistics_at(chrono::Utc::now().date_naive())
    }

    /// Full statistics summary with an explicit reference date.
    /// Same inputs, same date — same summary, bit for bit.
    #[must_use]
    pub fn statistics_at(&self, today: NaiveDate) -> StatisticsSummary {
        self.statistics_service.summarize(
            &self.journal.trades,
            &self.extended,
            Some(&self.journal.quotes),
            today,
        )
    }

    /// Per-symbol statistics as of today.
    #[must_use]
    pub fn symbol_statistics(&self, symbol: &str) -> SymbolStatistics {
        self.symbol_statistics_at(symbol, chrono::Utc::now().date_naive())
    }

    /// Per-symbol statistics with an explicit reference date.
    #[must_use]
    pub fn symbol_statistics_at(&self, symbol: &str, today: NaiveDate) -> SymbolStatistics {
        self.statistics_service.symbol_summary(
            symbol,
            &self.journal.trades,
            &self.extended,
            Some(&self.journal.quotes),
            today,
        )
    }

    // ── Extended Interest Info ──────────────────────────────────────

    /// Merge one trade's variable-rate interest figures.
    ///
    /// Builds a fresh map rather than mutating in place; a statistics
    /// pass holding the previous snapshot stays consistent. Re-run
    /// `statistics()` after merging to fold the new figures in.
    pub fn merge_extended_info(&mut self, trade_id: uuid::Uuid, info: ExtendedTradeInfo) {
        self.extended = self.extended.with_entry(trade_id, info);
    }

    /// Get the extended info currently held for a trade.
    #[must_use]
    pub fn extended_info(&self, trade_id: uuid::Uuid) -> Option<&ExtendedTradeInfo> {
        self.extended.get(&trade_id)
    }

    /// Number of trades with extended info present.
    #[must_use]
    pub fn extended_info_count(&self) -> usize {
        self.extended.len()
    }

    /// Drop all extended info; statistics fall back to the static
    /// margin-rate estimates.
    pub fn clear_extended_info(&mut self) {
        self.extended = ExtendedInfoMap::new();
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Insert or update a single quote.
    pub fn set_quote(&mut self, symbol: &str, price: f64, as_of: NaiveDate) {
        self.journal.quotes.set(symbol, price, as_of);
        self.dirty = true;
    }

    /// Layer a batch of fresh quotes onto the board (copy-on-write merge).
    pub fn merge_quotes(&mut self, fresh: &HashMap<String, f64>, as_of: NaiveDate) {
        if fresh.is_empty() {
            return;
        }
        self.journal.quotes = self.journal.quotes.merged(fresh, as_of);
        self.dirty = true;
    }

    /// Get the usable quote for a symbol, if any.
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<f64> {
        self.journal.quotes.get(symbol)
    }

    /// Number of symbols with a stored quote.
    #[must_use]
    pub fn quote_count(&self) -> usize {
        self.journal.quotes.len()
    }

    /// When a symbol's quote was last refreshed.
    #[must_use]
    pub fn quote_last_refreshed(&self, symbol: &str) -> Option<NaiveDate> {
        self.journal.quotes.last_refreshed(symbol)
    }

    /// Drop quotes last refreshed before `before`.
    /// Returns the number of symbols removed.
    pub fn prune_quotes_before(&mut self, before: NaiveDate) -> usize {
        let removed = self.journal.quotes.prune_stale_before(before);
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    /// Clear all quotes.
    pub fn clear_quotes(&mut self) {
        self.journal.quotes.clear();
        self.dirty = true;
    }

    // ── Backend Sync ────────────────────────────────────────────────

    /// Replace the journal's trade list from the backend.
    /// Extended info for trades that no longer exist is dropped.
    pub async fn refresh_trades(
        &mut self,
        source: &dyn TradeDataSource,
    ) -> Result<usize, CoreError> {
        let trades = source.fetch_trades().await?;
        let count = trades.len();
        self.journal_service.replace_trades(&mut self.journal, trades);

        let remaining: Vec<uuid::Uuid> = self.journal.trades.iter().map(|t| t.id).collect();
        self.extended = self.extended.retained(&remaining);
        self.dirty = true;
        Ok(count)
    }

    /// Fetch variable-rate interest figures, one request per trade,
    /// merging each result as it resolves. A single failed fetch is
    /// logged and skipped — partial extended info is expected, and the
    /// statistics fall back to static estimates for the gaps.
    /// Returns the number of trades whose info was merged.
    pub async fn refresh_extended_info(
        &mut self,
        source: &dyn TradeDataSource,
    ) -> Result<usize, CoreError> {
        let ids: Vec<uuid::Uuid> = self.journal.trades.iter().map(|t| t.id).collect();
        let mut merged = 0;

        for id in ids {
            match source.fetch_extended_info(id).await {
                Ok(Some(info)) => {
                    self.extended = self.extended.with_entry(id, info);
                    merged += 1;
                }
                Ok(None) => {}
                // Auth failures affect every remaining request — stop here
                Err(CoreError::Unauthorized) => return Err(CoreError::Unauthorized),
                Err(e) => warn!("extended info fetch failed for trade {id}: {e}"),
            }
        }

        Ok(merged)
    }

    /// Fetch current quotes for all held symbols and merge them in.
    /// Returns the number of symbols that received a fresh quote.
    pub async fn refresh_quotes(
        &mut self,
        source: &dyn QuoteSource,
        as_of: NaiveDate,
    ) -> Result<usize, CoreError> {
        let symbols = self.get_held_symbols();
        if symbols.is_empty() {
            return Ok(0);
        }

        let fresh = source.fetch_quotes(&symbols).await?;
        let count = fresh.len();
        self.merge_quotes(&fresh, as_of);
        Ok(count)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all trades as a JSON string.
    pub fn export_trades_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.journal.trades)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize trades to JSON: {e}")))
    }

    /// Export all trades as a CSV string.
    /// Columns: id, symbol, entry_price, quantity, entry_date, exit_price, exit_date, margin_rate, notes
    #[must_use]
    pub fn export_trades_to_csv(&self) -> String {
        let mut csv = String::from(
            "id,symbol,entry_price,quantity,entry_date,exit_price,exit_date,margin_rate,notes\n",
        );
        for trade in &self.journal.trades {
            let notes = trade.notes.as_deref().unwrap_or("");
            // Escape CSV: quote fields containing commas, quotes, or newlines
            let escaped_notes = if notes.contains(',') || notes.contains('"') || notes.contains('\n')
            {
                format!("\"{}\"", notes.replace('"', "\"\""))
            } else {
                notes.to_string()
            };
            let fmt_date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
            let fmt_price = |p: Option<f64>| p.map(|p| p.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                trade.id,
                trade.symbol,
                trade.entry_price,
                trade.quantity,
                fmt_date(trade.entry_date),
                fmt_price(trade.exit_price),
                fmt_date(trade.exit_date),
                trade.margin_rate,
                escaped_notes,
            ));
        }
        csv
    }

    /// Import trades from a JSON string. All trades are validated first;
    /// if any trade fails validation, none are imported (all-or-nothing).
    /// Returns the number of trades imported.
    pub fn import_trades_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let trades: Vec<Trade> = serde_json::from_str(json)?;
        let count = trades.len();

        // Phase 1: Validate all trades against a temporary journal state
        let mut temp_journal = self.journal.clone();
        for trade in &trades {
            self.journal_service
                .import_trade(&mut temp_journal, trade.clone())?;
        }

        // Phase 2: All valid — apply to real journal
        self.journal = temp_journal;
        self.dirty = true;
        Ok(count)
    }

    /// Export the full journal as JSON (unencrypted snapshot for debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.journal)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize journal: {e}")))
    }

    // ── Dirty State ─────────────────────────────────────────────────

    /// Returns `true` if the journal has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(journal: Journal) -> Self {
        Self {
            journal,
            journal_service: JournalService::new(),
            statistics_service: StatisticsService::new(),
            extended: ExtendedInfoMap::new(),
            dirty: false,
        }
    }
}
