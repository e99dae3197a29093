use crate::errors::CoreError;
use crate::models::journal::Journal;

use super::format;

/// High-level snapshot operations: save/load the journal to/from bytes or files.
///
/// Bytes variants work everywhere (the browser frontend owns the actual
/// persistence); file variants are native-only conveniences.
pub struct SnapshotStore;

impl SnapshotStore {
    /// Serialize a journal to portable snapshot bytes.
    pub fn save_to_bytes(journal: &Journal) -> Result<Vec<u8>, CoreError> {
        format::write_snapshot(format::CURRENT_VERSION, journal)
    }

    /// Deserialize a journal from snapshot bytes.
    pub fn load_from_bytes(data: &[u8]) -> Result<Journal, CoreError> {
        format::read_snapshot(data)
    }

    /// Save the journal snapshot to a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(journal: &Journal, path: &str) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(journal)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a journal snapshot from a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Journal, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes)
    }
}
