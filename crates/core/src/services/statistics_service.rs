use chrono::NaiveDate;
use log::{debug, warn};

use crate::models::extended::{ExtendedInfoMap, ExtendedTradeInfo};
use crate::models::quote::QuoteBoard;
use crate::models::statistics::{StatisticsSummary, SymbolStatistics, UpcomingInterest};
use crate::models::trade::Trade;

/// Days per year for the simple daily-rate interest model.
const DAYS_PER_YEAR: f64 = 365.0;

/// Fraction of open position cost reported as the drawdown figure.
/// TODO: replace with a real drawdown over stored quote history once the
/// backend exposes per-symbol price series.
const DRAWDOWN_FRACTION: f64 = 0.15;

/// Maximum entries in the upcoming-interest ranking.
const UPCOMING_LIMIT: usize = 5;

/// Computes trade statistics: open/closed totals, profit breakdowns,
/// interest accrual, risk approximations, and chart-ready series.
///
/// Pure business logic — no I/O, no clock access. The reference date is a
/// parameter, so the same inputs always produce the same summary. Nothing
/// here returns an error: a trade with malformed numbers contributes zero
/// to the figures it cannot support and the rest of the journal still
/// aggregates.
pub struct StatisticsService;

impl StatisticsService {
    pub fn new() -> Self {
        Self
    }

    /// Build the full statistics summary for a trade list.
    ///
    /// Single pass over the trades, then derived figures, then — when a
    /// quote board with at least one usable price is supplied — the
    /// potential-profit pass over open positions.
    pub fn summarize(
        &self,
        trades: &[Trade],
        extended: &ExtendedInfoMap,
        quotes: Option<&QuoteBoard>,
        today: NaiveDate,
    ) -> StatisticsSummary {
        let mut summary = StatisticsSummary::default();

        // Weighted-rate accumulators, open and closed side
        let mut open_rate_weighted = 0.0;
        let mut open_rate_cost = 0.0;
        let mut closed_rate_weighted = 0.0;
        let mut closed_rate_cost = 0.0;

        // Per-trade realized returns for the risk figures
        let mut returns: Vec<f64> = Vec::new();

        let mut upcoming: Vec<UpcomingInterest> = Vec::new();

        for trade in trades {
            *summary
                .trades_by_symbol
                .entry(trade.symbol.clone())
                .or_insert(0) += 1;

            let entry_price = positive_or_none(trade.entry_price);
            let quantity = positive_or_none(trade.quantity);
            if entry_price.is_none() || quantity.is_none() {
                warn!(
                    "trade {} ({}): non-positive entry price or quantity, contributes zero",
                    trade.id, trade.symbol
                );
            }
            let total_cost = match (entry_price, quantity) {
                (Some(p), Some(q)) => round2(p * q),
                _ => 0.0,
            };
            let rate = rate_or_zero(trade.margin_rate);
            let info = extended.get(&trade.id);

            if trade.is_open() {
                summary.open_count += 1;
                summary.open_position_cost += total_cost;
                summary.open_shares += quantity.unwrap_or(0.0);

                let days = trade.entry_date.map(|d| days_held(d, today));
                let daily = daily_interest(info, total_cost, rate);
                summary.total_interest_accrued += accrued_interest(info, daily, days);

                let weight_rate = weighted_rate(info, rate);
                open_rate_weighted += weight_rate * total_cost;
                open_rate_cost += total_cost;

                if let Some(days) = days {
                    if daily > 0.0 {
                        upcoming.push(UpcomingInterest {
                            trade_id: trade.id,
                            symbol: trade.symbol.clone(),
                            daily_interest: daily,
                            days_held: days,
                            accrued_interest: round2(daily * days as f64),
                        });
                    }
                }
            } else {
                summary.closed_count += 1;
                summary.total_invested_closed += total_cost;

                // is_open() was false, so exit_date is present
                let exit_date = trade.exit_date.unwrap_or(today);
                let days = trade.entry_date.map(|d| days_held(d, exit_date));
                let daily = daily_interest(info, total_cost, rate);
                let interest = accrued_interest(info, daily, days);
                summary.total_interest_paid += interest;
                *summary
                    .monthly_interest
                    .entry(month_key(exit_date))
                    .or_insert(0.0) += interest;

                if let Some(days) = days {
                    summary.holding_periods.record(days);
                }

                let weight_rate = weighted_rate(info, rate);
                closed_rate_weighted += weight_rate * total_cost;
                closed_rate_cost += total_cost;

                if let (Some(exit_price), Some(entry), Some(qty)) =
                    (trade.exit_price.and_then(positive_or_none), entry_price, quantity)
                {
                    let profit = round2((exit_price - entry) * qty);
                    summary.total_profit += profit;
                    *summary
                        .profit_by_symbol
                        .entry(trade.symbol.clone())
                        .or_insert(0.0) += profit;
                    *summary
                        .monthly_profit
                        .entry(month_key(exit_date))
                        .or_insert(0.0) += profit;
                    if total_cost > 0.0 {
                        returns.push(profit / total_cost);
                    }
                }
            }
        }

        // Derived figures
        summary.open_position_cost = round2(summary.open_position_cost);
        summary.total_invested_closed = round2(summary.total_invested_closed);
        summary.total_profit = round2(summary.total_profit);
        summary.total_interest_paid = round2(summary.total_interest_paid);
        summary.total_interest_accrued = round2(summary.total_interest_accrued);
        summary.total_profit_after_interest =
            round2(summary.total_profit - summary.total_interest_paid);

        summary.average_credit_rate_pct = if open_rate_cost > 0.0 {
            round2(open_rate_weighted / open_rate_cost)
        } else if closed_rate_cost > 0.0 {
            round2(closed_rate_weighted / closed_rate_cost)
        } else {
            0.0
        };

        summary.roi_pct = if summary.total_invested_closed > 0.0 {
            round2(summary.total_profit / summary.total_invested_closed * 100.0)
        } else {
            0.0
        };

        self.fill_risk_figures(&mut summary, &mut returns);
        summary.max_drawdown = round2(DRAWDOWN_FRACTION * summary.open_position_cost);

        upcoming.sort_by(|a, b| {
            b.accrued_interest
                .partial_cmp(&a.accrued_interest)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        upcoming.truncate(UPCOMING_LIMIT);
        summary.upcoming_interest = upcoming;

        // Combined totals start at the realized side; the quote pass folds
        // in unrealized profit when prices are available.
        summary.total_combined_profit = summary.total_profit;
        summary.total_combined_profit_after_interest = summary.total_profit_after_interest;

        if let Some(quotes) = quotes {
            self.apply_quotes(&mut summary, trades, extended, quotes, today);
        }

        summary
    }

    /// Potential-profit pass over open positions at current quotes.
    ///
    /// Re-entrant by design: quote refreshes arrive on their own cadence,
    /// and consumers re-apply them to the current summary. Trades whose
    /// symbol has no usable quote are skipped; when nothing at all could be
    /// priced the potential-profit fields keep their previous values.
    pub fn apply_quotes(
        &self,
        summary: &mut StatisticsSummary,
        trades: &[Trade],
        extended: &ExtendedInfoMap,
        quotes: &QuoteBoard,
        today: NaiveDate,
    ) {
        if !quotes.has_valid_quote() {
            return;
        }

        let mut potential = 0.0;
        let mut potential_after_interest = 0.0;
        let mut priced_any = false;

        for trade in trades.iter().filter(|t| t.is_open()) {
            let price = match quotes.get(&trade.symbol) {
                Some(p) => p,
                None => {
                    debug!("no quote for {}, skipping in potential-profit pass", trade.symbol);
                    continue;
                }
            };
            let (entry, qty) = match (
                positive_or_none(trade.entry_price),
                positive_or_none(trade.quantity),
            ) {
                (Some(e), Some(q)) => (e, q),
                _ => continue,
            };

            let trade_potential = round2((price - entry) * qty);
            let total_cost = round2(entry * qty);
            let rate = rate_or_zero(trade.margin_rate);
            let info = extended.get(&trade.id);
            let days = trade.entry_date.map(|d| days_held(d, today));
            let daily = daily_interest(info, total_cost, rate);
            let accrued = accrued_interest(info, daily, days);

            potential += trade_potential;
            potential_after_interest += trade_potential - accrued;
            priced_any = true;
        }

        if !priced_any {
            return;
        }

        summary.total_potential_profit = round2(potential);
        summary.total_potential_profit_after_interest = round2(potential_after_interest);
        summary.total_combined_profit =
            round2(summary.total_profit + summary.total_potential_profit);
        summary.total_combined_profit_after_interest = round2(
            summary.total_profit_after_interest + summary.total_potential_profit_after_interest,
        );
    }

    /// Statistics restricted to a single symbol, with win rate and the
    /// position's current value.
    pub fn symbol_summary(
        &self,
        symbol: &str,
        trades: &[Trade],
        extended: &ExtendedInfoMap,
        quotes: Option<&QuoteBoard>,
        today: NaiveDate,
    ) -> SymbolStatistics {
        let upper = symbol.to_uppercase();
        let mut stats = SymbolStatistics {
            symbol: upper.clone(),
            ..SymbolStatistics::default()
        };

        let mut profitable_closed = 0usize;
        let mut potential = 0.0;
        let mut priced_any = false;

        for trade in trades.iter().filter(|t| t.symbol == upper) {
            stats.trade_count += 1;

            let entry_price = positive_or_none(trade.entry_price);
            let quantity = positive_or_none(trade.quantity);
            let total_cost = match (entry_price, quantity) {
                (Some(p), Some(q)) => round2(p * q),
                _ => 0.0,
            };
            let rate = rate_or_zero(trade.margin_rate);
            let info = extended.get(&trade.id);

            if trade.is_open() {
                stats.open_count += 1;
                stats.open_cost += total_cost;
                stats.open_shares += quantity.unwrap_or(0.0);

                let days = trade.entry_date.map(|d| days_held(d, today));
                let daily = daily_interest(info, total_cost, rate);
                stats.total_interest_accrued += accrued_interest(info, daily, days);

                if let (Some(price), Some(entry), Some(qty)) =
                    (quotes.and_then(|q| q.get(&upper)), entry_price, quantity)
                {
                    potential += round2((price - entry) * qty);
                    priced_any = true;
                }
            } else {
                stats.closed_count += 1;

                let exit_date = trade.exit_date.unwrap_or(today);
                let days = trade.entry_date.map(|d| days_held(d, exit_date));
                let daily = daily_interest(info, total_cost, rate);
                stats.total_interest_paid += accrued_interest(info, daily, days);

                if let (Some(exit_price), Some(entry), Some(qty)) =
                    (trade.exit_price.and_then(positive_or_none), entry_price, quantity)
                {
                    let profit = round2((exit_price - entry) * qty);
                    stats.total_profit += profit;
                    if profit > 0.0 {
                        profitable_closed += 1;
                    }
                }
            }
        }

        stats.open_cost = round2(stats.open_cost);
        stats.total_profit = round2(stats.total_profit);
        stats.total_interest_paid = round2(stats.total_interest_paid);
        stats.total_interest_accrued = round2(stats.total_interest_accrued);
        if priced_any {
            stats.total_potential_profit = round2(potential);
        }

        stats.average_entry_price = if stats.open_shares > 0.0 {
            round2(stats.open_cost / stats.open_shares)
        } else {
            0.0
        };

        stats.win_rate_pct = if stats.closed_count > 0 {
            round2(profitable_closed as f64 / stats.closed_count as f64 * 100.0)
        } else {
            0.0
        };

        let unit_price = quotes
            .and_then(|q| q.get(&upper))
            .unwrap_or(stats.average_entry_price);
        stats.current_value = round2(stats.open_shares * unit_price);

        stats
    }

    /// VaR, expected shortfall, and Sharpe from the collected per-trade
    /// returns. Per-trade realized returns, not a time-indexed series — a
    /// deliberate simplification carried over from the product.
    fn fill_risk_figures(&self, summary: &mut StatisticsSummary, returns: &mut [f64]) {
        let n = returns.len();
        if n == 0 {
            return;
        }

        returns.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let var_index = ((n as f64 * 0.05).floor() as usize).min(n - 1);
        summary.value_at_risk = returns[var_index];

        let tail = &returns[..=var_index];
        summary.expected_shortfall = tail.iter().sum::<f64>() / tail.len() as f64;

        if n >= 2 {
            let mean = returns.iter().sum::<f64>() / n as f64;
            let variance =
                returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n as f64;
            let stddev = variance.sqrt();
            if stddev > 0.0 {
                summary.sharpe_ratio = mean / stddev;
            }
        }
    }
}

impl Default for StatisticsService {
    fn default() -> Self {
        Self::new()
    }
}

// ── Shared numeric helpers ──────────────────────────────────────────

/// Round half-up to 2 decimals. Applied when each derived monetary value
/// is finalized, matching display rounding.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole days between two calendar dates, floored at one — a position
/// opened and closed the same day still pays one day of interest.
fn days_held(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().max(1)
}

/// A usable monetary input: finite and strictly positive.
fn positive_or_none(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// A usable rate: finite and non-negative. Anything else degrades to zero.
fn rate_or_zero(rate: f64) -> f64 {
    if rate.is_finite() && rate >= 0.0 {
        rate
    } else {
        0.0
    }
}

/// `YYYY-MM` bucket key for the monthly series.
fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Daily interest for a position: the backend's variable-rate figure when
/// present, else the simple model `cost × rate / 100 / 365`.
fn daily_interest(info: Option<&ExtendedTradeInfo>, total_cost: f64, rate: f64) -> f64 {
    if let Some(daily) = info
        .and_then(|i| i.daily_interest_amount)
        .filter(|d| d.is_finite() && *d >= 0.0)
    {
        return round2(daily);
    }
    round2(total_cost * rate / 100.0 / DAYS_PER_YEAR)
}

/// Interest accrued over the holding period: the backend's cumulative
/// variable-rate figure when present, else `daily × days`. Without an
/// entry date there is no day count, so only the backend figure can
/// contribute.
fn accrued_interest(info: Option<&ExtendedTradeInfo>, daily: f64, days: Option<i64>) -> f64 {
    if let Some(total) = info
        .and_then(|i| i.total_interest_with_variable_rate)
        .filter(|t| t.is_finite() && *t >= 0.0)
    {
        return round2(total);
    }
    match days {
        Some(days) => round2(daily * days as f64),
        None => 0.0,
    }
}

/// The rate that enters the cost-weighted average: the backend's
/// time-weighted figure when present, else the trade's static margin rate.
fn weighted_rate(info: Option<&ExtendedTradeInfo>, rate: f64) -> f64 {
    info.and_then(|i| i.average_weighted_interest_rate)
        .filter(|r| r.is_finite() && *r >= 0.0)
        .unwrap_or(rate)
}
