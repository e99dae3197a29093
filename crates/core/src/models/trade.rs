use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sort order for trade listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeSortOrder {
    /// Newest entry date first (default for display)
    EntryDateDesc,
    /// Oldest entry date first
    EntryDateAsc,
    /// Largest position cost first
    CostDesc,
    /// Smallest position cost first
    CostAsc,
    /// Alphabetical by symbol
    SymbolAsc,
    /// Reverse alphabetical by symbol
    SymbolDesc,
}

/// A single margin trade in the journal.
///
/// A trade is OPEN until a close action records an `exit_date`; the
/// classification is derived from that one field and nothing else.
/// Exit price is usually present on a closed trade but may be missing,
/// in which case the trade still pays interest but realizes no profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier
    pub id: Uuid,

    /// Instrument ticker, uppercased (e.g., "AAPL", "TSLA")
    pub symbol: String,

    /// Price paid per share at entry
    pub entry_price: f64,

    /// Number of shares (always positive)
    pub quantity: f64,

    /// Date the position was opened (no time component — daily granularity).
    /// Records arriving from the backend may lack it; such trades are
    /// excluded from day-count figures but still counted in totals.
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,

    /// Price received per share at close, if the position was closed
    #[serde(default)]
    pub exit_price: Option<f64>,

    /// Date the position was closed. Presence of this field alone
    /// classifies the trade as closed.
    #[serde(default)]
    pub exit_date: Option<NaiveDate>,

    /// Annual interest rate (%) charged on the position's notional value
    pub margin_rate: f64,

    /// Optional free-text notes (e.g., reason, broker, memo)
    #[serde(default)]
    pub notes: Option<String>,
}

impl Trade {
    /// Create a new open trade from a buy action.
    pub fn buy(
        symbol: impl Into<String>,
        entry_price: f64,
        quantity: f64,
        entry_date: NaiveDate,
        margin_rate: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into().to_uppercase(),
            entry_price,
            quantity,
            entry_date: Some(entry_date),
            exit_price: None,
            exit_date: None,
            margin_rate,
            notes: None,
        }
    }

    /// Create a new open trade with notes attached.
    pub fn buy_with_notes(
        symbol: impl Into<String>,
        entry_price: f64,
        quantity: f64,
        entry_date: NaiveDate,
        margin_rate: f64,
        notes: impl Into<String>,
    ) -> Self {
        let mut trade = Self::buy(symbol, entry_price, quantity, entry_date, margin_rate);
        trade.notes = Some(notes.into());
        trade
    }

    /// A trade is closed once an exit date is recorded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.exit_date.is_some()
    }

    /// A trade is open while no exit date is recorded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.exit_date.is_none()
    }

    /// Notional cost of the position (entry price × quantity), unrounded.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.entry_price * self.quantity
    }
}
