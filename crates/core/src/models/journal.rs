use serde::{Deserialize, Serialize};

use super::quote::QuoteBoard;
use super::trade::Trade;

/// The main data container. Everything in here gets serialized into the
/// versioned snapshot the frontend persists between sessions.
///
/// Contains: the trade journal (kept sorted by entry date) and the quote
/// board, so the last known prices are available before the next poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// All trades, oldest entry date first
    pub trades: Vec<Trade>,

    /// Last known market quotes per symbol
    #[serde(default)]
    pub quotes: QuoteBoard,
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            trades: Vec::new(),
            quotes: QuoteBoard::new(),
        }
    }
}
