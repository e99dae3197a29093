use thiserror::Error;

/// Unified error type for the entire trade-tracker-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// The statistics aggregator is the one deliberate exception: it never
/// fails. Malformed trade data degrades to a zero contribution instead.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Snapshot / File ─────────────────────────────────────────────
    #[error("Invalid snapshot format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Backend API / Network ───────────────────────────────────────
    #[error("API error ({endpoint}): {message}")]
    Api {
        endpoint: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not authenticated — login required or session expired")]
    Unauthorized,

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Trade validation failed: {0}")]
    ValidationError(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so a
        // bearer token or symbol list never leaks into logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
