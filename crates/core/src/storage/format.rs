use serde_json::Value;

use crate::errors::CoreError;
use crate::models::journal::Journal;

/// Magic tag identifying a TRTK (Trade Tracker) snapshot.
pub const MAGIC: &str = "TRTK";

/// Current snapshot format version.
pub const CURRENT_VERSION: u16 = 1;

/// Serialize a journal into snapshot bytes.
///
/// Layout (JSON envelope):
/// ```text
/// { "magic": "TRTK", "version": 1, "journal": { ... } }
/// ```
pub fn write_snapshot(version: u16, journal: &Journal) -> Result<Vec<u8>, CoreError> {
    let journal_value = serde_json::to_value(journal)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize journal: {e}")))?;

    let envelope = serde_json::json!({
        "magic": MAGIC,
        "version": version,
        "journal": journal_value,
    });

    serde_json::to_vec(&envelope)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))
}

/// Parse snapshot bytes back into a journal.
/// Validates the magic tag and the version before touching the payload.
pub fn read_snapshot(data: &[u8]) -> Result<Journal, CoreError> {
    let envelope: Value = serde_json::from_slice(data).map_err(|_| {
        CoreError::InvalidFileFormat("Not a valid TRTK snapshot (unparseable JSON)".into())
    })?;

    let magic = envelope.get("magic").and_then(Value::as_str);
    if magic != Some(MAGIC) {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic tag — not a TRTK snapshot".into(),
        ));
    }

    let version = envelope
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| CoreError::InvalidFileFormat("Missing snapshot version".into()))?;

    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let journal_value = envelope
        .get("journal")
        .cloned()
        .ok_or_else(|| CoreError::InvalidFileFormat("Missing journal payload".into()))?;

    serde_json::from_value(journal_value)
        .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize journal: {e}")))
}
