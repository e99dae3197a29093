use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::extended::ExtendedTradeInfo;
use crate::models::trade::Trade;

/// Trait abstraction for the backend supplying trade records.
///
/// The dashboard's REST backend implements this in production; tests
/// substitute an in-memory mock. If the backend's shape changes, only the
/// one implementation moves — the rest of the codebase is untouched.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait TradeDataSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the full trade list.
    async fn fetch_trades(&self) -> Result<Vec<Trade>, CoreError>;

    /// Fetch the variable-rate interest figures for one trade.
    /// `Ok(None)` means the backend has nothing extra for this trade —
    /// the static margin-rate estimate stays in effect.
    async fn fetch_extended_info(
        &self,
        trade_id: Uuid,
    ) -> Result<Option<ExtendedTradeInfo>, CoreError>;
}

/// Trait abstraction for the market-quote poller's source.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch current quotes for the given symbols. Symbols the source
    /// cannot price are simply absent from the result.
    async fn fetch_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, CoreError>;
}
