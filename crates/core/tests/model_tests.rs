use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

use trade_tracker_core::models::extended::{ExtendedInfoMap, ExtendedTradeInfo};
use trade_tracker_core::models::journal::Journal;
use trade_tracker_core::models::quote::QuoteBoard;
use trade_tracker_core::models::statistics::{HoldingPeriods, StatisticsSummary};
use trade_tracker_core::models::trade::Trade;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Trade
// ═══════════════════════════════════════════════════════════════════

mod trade {
    use super::*;

    #[test]
    fn buy_uppercases_symbol() {
        let t = Trade::buy("aapl", 100.0, 10.0, d(2025, 1, 15), 20.0);
        assert_eq!(t.symbol, "AAPL");
    }

    #[test]
    fn buy_preserves_uppercase_symbol() {
        let t = Trade::buy("TSLA", 100.0, 10.0, d(2025, 1, 15), 20.0);
        assert_eq!(t.symbol, "TSLA");
    }

    #[test]
    fn buy_sets_entry_leg() {
        let t = Trade::buy("AAPL", 185.5, 12.0, d(2025, 1, 15), 23.0);
        assert_eq!(t.entry_price, 185.5);
        assert_eq!(t.quantity, 12.0);
        assert_eq!(t.entry_date, Some(d(2025, 1, 15)));
        assert_eq!(t.margin_rate, 23.0);
    }

    #[test]
    fn buy_has_no_exit_leg() {
        let t = Trade::buy("AAPL", 100.0, 10.0, d(2025, 1, 15), 20.0);
        assert_eq!(t.exit_price, None);
        assert_eq!(t.exit_date, None);
        assert_eq!(t.notes, None);
    }

    #[test]
    fn buy_with_notes_attaches_notes() {
        let t = Trade::buy_with_notes("AAPL", 100.0, 10.0, d(2025, 1, 15), 20.0, "earnings play");
        assert_eq!(t.notes.as_deref(), Some("earnings play"));
    }

    #[test]
    fn unique_ids() {
        let a = Trade::buy("AAPL", 100.0, 10.0, d(2025, 1, 15), 20.0);
        let b = Trade::buy("AAPL", 100.0, 10.0, d(2025, 1, 15), 20.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn new_trade_is_open() {
        let t = Trade::buy("AAPL", 100.0, 10.0, d(2025, 1, 15), 20.0);
        assert!(t.is_open());
        assert!(!t.is_closed());
    }

    #[test]
    fn exit_date_alone_classifies_as_closed() {
        let mut t = Trade::buy("AAPL", 100.0, 10.0, d(2025, 1, 15), 20.0);
        t.exit_date = Some(d(2025, 2, 1));
        // no exit price — still closed
        assert!(t.is_closed());
        assert!(!t.is_open());
    }

    #[test]
    fn exit_price_alone_does_not_close() {
        let mut t = Trade::buy("AAPL", 100.0, 10.0, d(2025, 1, 15), 20.0);
        t.exit_price = Some(120.0);
        assert!(t.is_open());
    }

    #[test]
    fn total_cost() {
        let t = Trade::buy("AAPL", 100.0, 3.0, d(2025, 1, 15), 20.0);
        assert_eq!(t.total_cost(), 300.0);
    }

    #[test]
    fn serde_roundtrip() {
        let mut t = Trade::buy_with_notes("AAPL", 100.0, 10.0, d(2025, 1, 15), 23.0, "memo");
        t.exit_price = Some(120.0);
        t.exit_date = Some(d(2025, 2, 1));

        let json = serde_json::to_string(&t).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = format!(
            r#"{{"id":"{}","symbol":"AAPL","entry_price":100.0,"quantity":10.0,"margin_rate":20.0}}"#,
            Uuid::new_v4()
        );
        let t: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(t.entry_date, None);
        assert_eq!(t.exit_price, None);
        assert_eq!(t.exit_date, None);
        assert_eq!(t.notes, None);
        assert!(t.is_open());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ExtendedInfoMap
// ═══════════════════════════════════════════════════════════════════

mod extended_info {
    use super::*;

    fn info(daily: f64) -> ExtendedTradeInfo {
        ExtendedTradeInfo {
            daily_interest_amount: Some(daily),
            total_interest_with_variable_rate: None,
            average_weighted_interest_rate: None,
        }
    }

    #[test]
    fn empty_by_default() {
        let map = ExtendedInfoMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn with_entry_adds() {
        let id = Uuid::new_v4();
        let map = ExtendedInfoMap::new().with_entry(id, info(5.0));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&id).unwrap().daily_interest_amount, Some(5.0));
    }

    #[test]
    fn with_entry_leaves_receiver_untouched() {
        let id = Uuid::new_v4();
        let original = ExtendedInfoMap::new();
        let _updated = original.with_entry(id, info(5.0));
        assert!(original.is_empty());
        assert!(original.get(&id).is_none());
    }

    #[test]
    fn with_entry_replaces_existing() {
        let id = Uuid::new_v4();
        let map = ExtendedInfoMap::new()
            .with_entry(id, info(5.0))
            .with_entry(id, info(7.5));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&id).unwrap().daily_interest_amount, Some(7.5));
    }

    #[test]
    fn merged_layers_other_on_top() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let base = ExtendedInfoMap::new().with_entry(a, info(1.0)).with_entry(b, info(2.0));
        let fresh = ExtendedInfoMap::new().with_entry(b, info(9.0));

        let merged = base.merged(&fresh);
        assert_eq!(merged.get(&a).unwrap().daily_interest_amount, Some(1.0));
        assert_eq!(merged.get(&b).unwrap().daily_interest_amount, Some(9.0));
        // receiver untouched
        assert_eq!(base.get(&b).unwrap().daily_interest_amount, Some(2.0));
    }

    #[test]
    fn retained_drops_unlisted_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let map = ExtendedInfoMap::new().with_entry(a, info(1.0)).with_entry(b, info(2.0));

        let kept = map.retained(&[a]);
        assert_eq!(kept.len(), 1);
        assert!(kept.get(&a).is_some());
        assert!(kept.get(&b).is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let id = Uuid::new_v4();
        let map = ExtendedInfoMap::new().with_entry(
            id,
            ExtendedTradeInfo {
                daily_interest_amount: Some(5.5),
                total_interest_with_variable_rate: Some(120.0),
                average_weighted_interest_rate: Some(21.3),
            },
        );
        let json = serde_json::to_string(&map).unwrap();
        let back: ExtendedInfoMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&id).unwrap().total_interest_with_variable_rate, Some(120.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  QuoteBoard
// ═══════════════════════════════════════════════════════════════════

mod quote_board {
    use super::*;

    #[test]
    fn empty_by_default() {
        let board = QuoteBoard::new();
        assert!(board.is_empty());
        assert_eq!(board.len(), 0);
        assert!(!board.has_valid_quote());
    }

    #[test]
    fn set_and_get_uppercases() {
        let mut board = QuoteBoard::new();
        board.set("aapl", 185.0, d(2025, 1, 15));
        assert_eq!(board.get("AAPL"), Some(185.0));
        assert_eq!(board.get("aapl"), Some(185.0));
    }

    #[test]
    fn get_filters_non_positive() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", 0.0, d(2025, 1, 15));
        board.set("TSLA", -5.0, d(2025, 1, 15));
        assert_eq!(board.get("AAPL"), None);
        assert_eq!(board.get("TSLA"), None);
        assert!(!board.has_valid_quote());
    }

    #[test]
    fn get_filters_non_finite() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", f64::NAN, d(2025, 1, 15));
        board.set("TSLA", f64::INFINITY, d(2025, 1, 15));
        assert_eq!(board.get("AAPL"), None);
        assert_eq!(board.get("TSLA"), None);
    }

    #[test]
    fn has_valid_quote_with_one_good_price() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", f64::NAN, d(2025, 1, 15));
        board.set("TSLA", 250.0, d(2025, 1, 15));
        assert!(board.has_valid_quote());
    }

    #[test]
    fn remove_returns_presence() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", 185.0, d(2025, 1, 15));
        assert!(board.remove("aapl"));
        assert!(!board.remove("AAPL"));
        assert_eq!(board.get("AAPL"), None);
        assert_eq!(board.last_refreshed("AAPL"), None);
    }

    #[test]
    fn merged_leaves_receiver_untouched() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", 185.0, d(2025, 1, 15));

        let mut fresh = HashMap::new();
        fresh.insert("AAPL".to_string(), 190.0);
        fresh.insert("TSLA".to_string(), 250.0);

        let merged = board.merged(&fresh, d(2025, 1, 16));
        assert_eq!(merged.get("AAPL"), Some(190.0));
        assert_eq!(merged.get("TSLA"), Some(250.0));
        assert_eq!(merged.last_refreshed("AAPL"), Some(d(2025, 1, 16)));
        // receiver untouched
        assert_eq!(board.get("AAPL"), Some(185.0));
        assert_eq!(board.get("TSLA"), None);
    }

    #[test]
    fn last_refreshed_tracks_set_date() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", 185.0, d(2025, 1, 15));
        assert_eq!(board.last_refreshed("aapl"), Some(d(2025, 1, 15)));
    }

    #[test]
    fn prune_stale_before_removes_old_quotes() {
        let mut board = QuoteBoard::new();
        board.set("OLD", 10.0, d(2025, 1, 1));
        board.set("NEW", 20.0, d(2025, 1, 20));

        let removed = board.prune_stale_before(d(2025, 1, 10));
        assert_eq!(removed, 1);
        assert_eq!(board.get("OLD"), None);
        assert_eq!(board.get("NEW"), Some(20.0));
    }

    #[test]
    fn prune_keeps_boundary_date() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", 10.0, d(2025, 1, 10));
        let removed = board.prune_stale_before(d(2025, 1, 10));
        assert_eq!(removed, 0);
        assert_eq!(board.get("AAPL"), Some(10.0));
    }

    #[test]
    fn clear_empties_everything() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", 185.0, d(2025, 1, 15));
        board.clear();
        assert!(board.is_empty());
        assert_eq!(board.last_refreshed("AAPL"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let mut board = QuoteBoard::new();
        board.set("AAPL", 185.0, d(2025, 1, 15));
        let json = serde_json::to_string(&board).unwrap();
        let back: QuoteBoard = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("AAPL"), Some(185.0));
        assert_eq!(back.last_refreshed("AAPL"), Some(d(2025, 1, 15)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  HoldingPeriods
// ═══════════════════════════════════════════════════════════════════

mod holding_periods {
    use super::*;

    #[test]
    fn default_is_all_zeros() {
        let hp = HoldingPeriods::default();
        assert_eq!(hp.total(), 0);
    }

    #[test]
    fn seven_days_lands_in_first_bucket() {
        let mut hp = HoldingPeriods::default();
        hp.record(7);
        assert_eq!(hp.days_1_7, 1);
        assert_eq!(hp.days_8_30, 0);
    }

    #[test]
    fn eight_days_lands_in_second_bucket() {
        let mut hp = HoldingPeriods::default();
        hp.record(8);
        assert_eq!(hp.days_1_7, 0);
        assert_eq!(hp.days_8_30, 1);
    }

    #[test]
    fn bucket_boundaries() {
        let mut hp = HoldingPeriods::default();
        hp.record(1);
        hp.record(7);
        hp.record(8);
        hp.record(30);
        hp.record(31);
        hp.record(90);
        hp.record(91);
        hp.record(365);
        assert_eq!(hp.days_1_7, 2);
        assert_eq!(hp.days_8_30, 2);
        assert_eq!(hp.days_31_90, 2);
        assert_eq!(hp.days_91_plus, 2);
        assert_eq!(hp.total(), 8);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  StatisticsSummary / Journal
// ═══════════════════════════════════════════════════════════════════

mod summary_defaults {
    use super::*;

    #[test]
    fn default_is_all_zeros_and_empty() {
        let s = StatisticsSummary::default();
        assert_eq!(s.open_count, 0);
        assert_eq!(s.closed_count, 0);
        assert_eq!(s.total_profit, 0.0);
        assert_eq!(s.total_potential_profit, 0.0);
        assert_eq!(s.total_interest_paid, 0.0);
        assert_eq!(s.sharpe_ratio, 0.0);
        assert!(s.profit_by_symbol.is_empty());
        assert!(s.monthly_profit.is_empty());
        assert!(s.upcoming_interest.is_empty());
        assert_eq!(s.holding_periods.total(), 0);
    }

    #[test]
    fn serde_roundtrip() {
        let s = StatisticsSummary::default();
        let json = serde_json::to_string(&s).unwrap();
        let back: StatisticsSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.open_count, 0);
    }
}

mod journal {
    use super::*;

    #[test]
    fn default_is_empty() {
        let j = Journal::default();
        assert!(j.trades.is_empty());
        assert!(j.quotes.is_empty());
    }

    #[test]
    fn deserializes_without_quotes_field() {
        // Older snapshots predate the quote board
        let j: Journal = serde_json::from_str(r#"{"trades":[]}"#).unwrap();
        assert!(j.quotes.is_empty());
    }
}
