use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::journal::Journal;
use crate::models::trade::Trade;

/// Manages the trade journal: buy (open), sell (close), delete.
///
/// Pure business logic — no I/O, no API calls. Easy to test.
/// The journal's trade list is kept sorted by entry date.
pub struct JournalService;

impl JournalService {
    pub fn new() -> Self {
        Self
    }

    /// Record a buy action: validate and insert a new open trade.
    pub fn open_trade(&self, journal: &mut Journal, trade: Trade) -> Result<(), CoreError> {
        self.validate_new_trade(&trade)?;
        Self::binary_insert(&mut journal.trades, trade);
        Ok(())
    }

    /// Record a sell action: set the exit leg on an open trade.
    ///
    /// The trade becomes closed by virtue of the exit date being recorded;
    /// closing an already-closed trade is rejected rather than re-stamped.
    pub fn close_trade(
        &self,
        journal: &mut Journal,
        trade_id: Uuid,
        exit_price: Option<f64>,
        exit_date: NaiveDate,
    ) -> Result<(), CoreError> {
        let trade = journal
            .trades
            .iter_mut()
            .find(|t| t.id == trade_id)
            .ok_or_else(|| CoreError::TradeNotFound(trade_id.to_string()))?;

        if trade.is_closed() {
            return Err(CoreError::ValidationError(format!(
                "Trade {} is already closed",
                trade_id
            )));
        }

        if let Some(entry_date) = trade.entry_date {
            if exit_date < entry_date {
                return Err(CoreError::ValidationError(format!(
                    "Exit date {exit_date} is before entry date {entry_date}"
                )));
            }
        }

        Self::validate_not_future(exit_date, "Exit")?;

        if let Some(price) = exit_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Exit price must be a positive number, got {price}"
                )));
            }
        }

        trade.exit_price = exit_price;
        trade.exit_date = Some(exit_date);
        Ok(())
    }

    /// Validate and insert a trade that may already carry an exit leg
    /// (JSON import). Entry validation matches `open_trade`; the exit leg,
    /// when present, must be internally consistent.
    pub fn import_trade(&self, journal: &mut Journal, trade: Trade) -> Result<(), CoreError> {
        self.validate_new_trade(&trade)?;

        if let (Some(entry_date), Some(exit_date)) = (trade.entry_date, trade.exit_date) {
            if exit_date < entry_date {
                return Err(CoreError::ValidationError(format!(
                    "Exit date {exit_date} is before entry date {entry_date}"
                )));
            }
        }
        if let Some(price) = trade.exit_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Exit price must be a positive number, got {price}"
                )));
            }
        }

        Self::binary_insert(&mut journal.trades, trade);
        Ok(())
    }

    /// Remove a trade by its id.
    pub fn delete_trade(&self, journal: &mut Journal, trade_id: Uuid) -> Result<(), CoreError> {
        let idx = journal
            .trades
            .iter()
            .position(|t| t.id == trade_id)
            .ok_or_else(|| CoreError::TradeNotFound(trade_id.to_string()))?;
        journal.trades.remove(idx);
        Ok(())
    }

    /// Set or clear the notes on an existing trade.
    pub fn set_notes(
        &self,
        journal: &mut Journal,
        trade_id: Uuid,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let trade = journal
            .trades
            .iter_mut()
            .find(|t| t.id == trade_id)
            .ok_or_else(|| CoreError::TradeNotFound(trade_id.to_string()))?;
        trade.notes = notes;
        Ok(())
    }

    /// Replace the whole trade list (backend refresh). Re-sorts by entry
    /// date; records are not validated here — malformed figures degrade
    /// inside the statistics engine instead of failing the refresh.
    pub fn replace_trades(&self, journal: &mut Journal, mut trades: Vec<Trade>) {
        trades.sort_by_key(|t| t.entry_date);
        journal.trades = trades;
    }

    /// Get all trades sorted by entry date (newest first for display).
    pub fn get_trades<'a>(&self, journal: &'a Journal) -> Vec<&'a Trade> {
        let mut trades: Vec<&Trade> = journal.trades.iter().collect();
        trades.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        trades
    }

    /// Validate a trade before it enters the journal from a buy action.
    ///
    /// Rules:
    /// - Entry price and quantity must be positive finite numbers
    /// - Margin rate must be finite and non-negative
    /// - An entry date is required and must not be in the future
    fn validate_new_trade(&self, trade: &Trade) -> Result<(), CoreError> {
        if !trade.entry_price.is_finite() || trade.entry_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Entry price must be a positive number, got {}",
                trade.entry_price
            )));
        }
        if !trade.quantity.is_finite() || trade.quantity <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity must be a positive number, got {}",
                trade.quantity
            )));
        }
        if !trade.margin_rate.is_finite() || trade.margin_rate < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Margin rate must be a non-negative number, got {}",
                trade.margin_rate
            )));
        }

        let entry_date = trade.entry_date.ok_or_else(|| {
            CoreError::ValidationError("A buy action requires an entry date".into())
        })?;
        Self::validate_not_future(entry_date, "Entry")?;

        Ok(())
    }

    /// Allow +1 day tolerance for timezone differences, like the rest of
    /// the product's date handling.
    fn validate_not_future(date: NaiveDate, which: &str) -> Result<(), CoreError> {
        let today = Utc::now().date_naive();
        if let Some(tomorrow) = today.succ_opt() {
            if date > tomorrow {
                return Err(CoreError::ValidationError(format!(
                    "{which} date {date} is in the future"
                )));
            }
        }
        Ok(())
    }

    /// Binary insert into an entry-date-sorted Vec<Trade> in O(log n).
    fn binary_insert(trades: &mut Vec<Trade>, trade: Trade) {
        let pos = trades
            .binary_search_by_key(&trade.entry_date, |t| t.entry_date)
            .unwrap_or_else(|pos| pos);
        trades.insert(pos, trade);
    }
}

impl Default for JournalService {
    fn default() -> Self {
        Self::new()
    }
}
