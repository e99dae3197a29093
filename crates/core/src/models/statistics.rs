use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Full statistics summary over the trade journal.
///
/// Recomputed from scratch on every input change — never persisted.
/// Monthly series are keyed `YYYY-MM`; `BTreeMap` keeps them in
/// chronological order for chart rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    /// Number of open positions
    pub open_count: usize,

    /// Number of closed positions
    pub closed_count: usize,

    /// Total cost of open positions (entry price × quantity, rounded per trade)
    pub open_position_cost: f64,

    /// Total shares held across open positions
    pub open_shares: f64,

    /// Average interest rate (%) weighted by position cost.
    /// Open positions preferred; falls back to closed positions when
    /// nothing is open.
    pub average_credit_rate_pct: f64,

    /// Total invested in closed trades (denominator for ROI)
    pub total_invested_closed: f64,

    /// Realized profit on closed trades
    pub total_profit: f64,

    /// Realized profit minus interest paid on closed trades
    pub total_profit_after_interest: f64,

    /// Unrealized profit on open trades at current quotes.
    /// Stays at its previous value when no position could be priced.
    pub total_potential_profit: f64,

    /// Unrealized profit minus interest accrued so far
    pub total_potential_profit_after_interest: f64,

    /// Realized + unrealized profit
    pub total_combined_profit: f64,

    /// Realized + unrealized profit, both net of interest
    pub total_combined_profit_after_interest: f64,

    /// Interest paid over the life of closed trades
    pub total_interest_paid: f64,

    /// Interest accrued to date on open trades
    pub total_interest_accrued: f64,

    /// Return on investment (%): total_profit / total_invested_closed × 100
    pub roi_pct: f64,

    /// Realized profit per symbol
    pub profit_by_symbol: HashMap<String, f64>,

    /// Trade count per symbol (open and closed)
    pub trades_by_symbol: HashMap<String, usize>,

    /// Realized profit bucketed by exit month (`YYYY-MM`)
    pub monthly_profit: BTreeMap<String, f64>,

    /// Interest paid bucketed by exit month (`YYYY-MM`)
    pub monthly_interest: BTreeMap<String, f64>,

    /// 5th percentile of the per-trade return distribution
    pub value_at_risk: f64,

    /// Mean of returns at or below the VaR percentile
    pub expected_shortfall: f64,

    /// Heuristic drawdown figure — 15% of open position cost
    pub max_drawdown: f64,

    /// Mean per-trade return over its standard deviation, unannualized
    pub sharpe_ratio: f64,

    /// Closed trades bucketed by days held
    pub holding_periods: HoldingPeriods,

    /// Open trades accruing the most interest to date, at most five,
    /// largest accrual first
    pub upcoming_interest: Vec<UpcomingInterest>,
}

/// Count of closed trades per holding-period bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingPeriods {
    /// Held 1–7 days
    pub days_1_7: usize,
    /// Held 8–30 days
    pub days_8_30: usize,
    /// Held 31–90 days
    pub days_31_90: usize,
    /// Held 91 days or longer
    pub days_91_plus: usize,
}

impl HoldingPeriods {
    /// Record a closed trade's holding period in its bucket.
    pub fn record(&mut self, days_held: i64) {
        match days_held {
            ..=7 => self.days_1_7 += 1,
            8..=30 => self.days_8_30 += 1,
            31..=90 => self.days_31_90 += 1,
            _ => self.days_91_plus += 1,
        }
    }

    /// Total closed trades recorded across all buckets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.days_1_7 + self.days_8_30 + self.days_31_90 + self.days_91_plus
    }
}

/// An open trade ranked by interest accrued to date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingInterest {
    /// The trade this entry describes
    pub trade_id: Uuid,

    /// Instrument symbol
    pub symbol: String,

    /// Interest accruing per day
    pub daily_interest: f64,

    /// Days the position has been held so far
    pub days_held: i64,

    /// daily_interest × days_held — the ranking key
    pub accrued_interest: f64,
}

/// Statistics restricted to a single symbol's trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolStatistics {
    /// The symbol these figures describe
    pub symbol: String,

    /// Trades on this symbol, open and closed
    pub trade_count: usize,

    /// Open positions on this symbol
    pub open_count: usize,

    /// Closed positions on this symbol
    pub closed_count: usize,

    /// Shares held across open positions
    pub open_shares: f64,

    /// Cost of open positions
    pub open_cost: f64,

    /// Average entry price across open positions (cost-weighted)
    pub average_entry_price: f64,

    /// Realized profit on closed trades
    pub total_profit: f64,

    /// Unrealized profit at the current quote (0 when unpriced)
    pub total_potential_profit: f64,

    /// Interest paid on closed trades
    pub total_interest_paid: f64,

    /// Interest accrued on open trades
    pub total_interest_accrued: f64,

    /// Profitable closed trades / closed trades × 100
    pub win_rate_pct: f64,

    /// open_shares × current quote, falling back to the average entry
    /// price when no quote is available
    pub current_value: f64,
}
