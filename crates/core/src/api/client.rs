use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::extended::ExtendedTradeInfo;
use crate::models::trade::Trade;
use super::traits::{QuoteSource, TradeDataSource};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the dashboard's REST backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://trades.example.com` (no trailing slash)
    pub base_url: String,

    /// Bearer token obtained from `login`; `None` until authenticated
    pub token: Option<String>,

    /// Request timeout in seconds (ignored on wasm32)
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// REST client for the trade dashboard's backend.
///
/// Endpoints:
/// - `POST /api/auth/login` → bearer token
/// - `GET  /api/trades` → full trade list
/// - `GET  /api/trades/{id}/interest` → variable-rate interest figures
/// - `GET  /api/quotes?symbols=...` → current quotes
///
/// The backend serves numbers the way its forms stored them — sometimes
/// as JSON numbers, sometimes as numeric strings. All numeric and date
/// fields are parsed leniently: a malformed field degrades to absent, a
/// malformed record is dropped with a warning, and the rest of the batch
/// survives.
pub struct BackendClient {
    client: Client,
    config: ApiConfig,
}

impl BackendClient {
    pub fn new(config: ApiConfig) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    /// Authenticate against the backend and store the bearer token for
    /// subsequent requests.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), CoreError> {
        let url = format!("{}/api/auth/login", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::FORBIDDEN {
            return Err(CoreError::Unauthorized);
        }
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                endpoint: "/api/auth/login".into(),
                message: format!("Unexpected status {}", resp.status()),
            });
        }

        let body: Value = resp.json().await.map_err(|e| CoreError::Api {
            endpoint: "/api/auth/login".into(),
            message: format!("Failed to parse login response: {e}"),
        })?;

        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Api {
                endpoint: "/api/auth/login".into(),
                message: "Login response carries no token".into(),
            })?;

        self.config.token = Some(token.to_string());
        Ok(())
    }

    /// Whether a bearer token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.config.token.is_some()
    }

    /// Forget the bearer token.
    pub fn logout(&mut self) {
        self.config.token = None;
    }

    /// Authenticated GET returning the raw JSON body.
    async fn get_json(&self, path: &str) -> Result<Value, CoreError> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or(CoreError::Unauthorized)?;

        let url = format!("{}{}", self.config.base_url, path);
        let resp = self.client.get(&url).bearer_auth(token).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(CoreError::Unauthorized);
        }
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                endpoint: path.to_string(),
                message: format!("Unexpected status {}", resp.status()),
            });
        }

        resp.json().await.map_err(|e| CoreError::Api {
            endpoint: path.to_string(),
            message: format!("Failed to parse response: {e}"),
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl TradeDataSource for BackendClient {
    fn name(&self) -> &str {
        "Backend"
    }

    async fn fetch_trades(&self) -> Result<Vec<Trade>, CoreError> {
        let body = self.get_json("/api/trades").await?;

        let records = body
            .as_array()
            .or_else(|| body.get("trades").and_then(Value::as_array))
            .ok_or_else(|| CoreError::Api {
                endpoint: "/api/trades".into(),
                message: "Expected a trade array".into(),
            })?;

        let mut trades = Vec::with_capacity(records.len());
        for record in records {
            match parse_trade(record) {
                Some(trade) => trades.push(trade),
                None => warn!("dropping unparseable trade record: {record}"),
            }
        }
        Ok(trades)
    }

    async fn fetch_extended_info(
        &self,
        trade_id: Uuid,
    ) -> Result<Option<ExtendedTradeInfo>, CoreError> {
        let path = format!("/api/trades/{trade_id}/interest");
        let body = match self.get_json(&path).await {
            Ok(body) => body,
            // A trade without variable-rate history is not an error
            Err(CoreError::Api { message, .. }) if message.contains("404") => return Ok(None),
            Err(e) => return Err(e),
        };

        if body.is_null() {
            return Ok(None);
        }

        Ok(Some(parse_extended_info(&body)))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteSource for BackendClient {
    fn name(&self) -> &str {
        "Backend"
    }

    async fn fetch_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, CoreError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = symbols.join(",");
        let body = self.get_json(&format!("/api/quotes?symbols={joined}")).await?;

        let map = body
            .get("quotes")
            .and_then(Value::as_object)
            .or_else(|| body.as_object())
            .ok_or_else(|| CoreError::Api {
                endpoint: "/api/quotes".into(),
                message: "Expected a symbol→price object".into(),
            })?;

        let mut quotes = HashMap::new();
        for (symbol, value) in map {
            match flex_f64(Some(value)).filter(|p| *p > 0.0) {
                Some(price) => {
                    quotes.insert(symbol.to_uppercase(), price);
                }
                None => warn!("dropping unusable quote for {symbol}: {value}"),
            }
        }
        Ok(quotes)
    }
}

// ── Lenient field parsing ───────────────────────────────────────────

/// Build a `Trade` from one backend record. Returns `None` only when the
/// record is unusable outright (no id, no symbol); malformed numeric
/// fields become zeros and degrade inside the statistics engine instead.
pub fn parse_trade(record: &Value) -> Option<Trade> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let symbol = record
        .get("symbol")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_uppercase();

    Some(Trade {
        id,
        symbol,
        entry_price: flex_f64(record.get("entryPrice")).unwrap_or(0.0),
        quantity: flex_f64(record.get("quantity")).unwrap_or(0.0),
        entry_date: flex_date(record.get("entryDate")),
        exit_price: flex_f64(record.get("exitPrice")),
        exit_date: flex_date(record.get("exitDate")),
        margin_rate: flex_f64(record.get("marginAmount")).unwrap_or(0.0),
        notes: record
            .get("notes")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Extract the variable-rate interest figures from one backend response.
/// Each field is independently optional and leniently parsed.
pub fn parse_extended_info(body: &Value) -> ExtendedTradeInfo {
    ExtendedTradeInfo {
        daily_interest_amount: flex_f64(body.get("dailyInterestAmount")),
        total_interest_with_variable_rate: flex_f64(body.get("totalInterestWithVariableRate")),
        average_weighted_interest_rate: flex_f64(body.get("averageWeightedInterestRate")),
    }
}

/// Accept a JSON number or a numeric string; anything else is absent.
/// Non-finite values are absent too — they would poison every sum.
fn flex_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a `YYYY-MM-DD` string into a calendar date. The date components
/// are taken literally — no timezone conversion, so a position opened on
/// the 1st never shifts to the 31st of the previous month.
fn flex_date(value: Option<&Value>) -> Option<NaiveDate> {
    let s = value?.as_str()?;
    // Tolerate ISO datetime strings by taking the date part
    let date_part = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").ok()
}
