use std::path::Path;

use crate::domain::{DomainError, ReferenceEntry};

pub fn read_reference_set(path: &Path) -> Result<Vec<ReferenceEntry>, DomainError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DomainError::not_found(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| DomainError::validation(format!("{}: {e}", path.display())))
}

/// Loads the reference dataset, degrading to an empty set when it is
/// missing or unreadable so questions fall through to retrieval.
pub fn load_reference_set(path: impl AsRef<Path>) -> Vec<ReferenceEntry> {
    let path = path.as_ref();
    match read_reference_set(path) {
        Ok(entries) => {
            tracing::info!(path = %path.display(), entries = entries.len(), "reference set loaded");
            entries
        }
        Err(e) => {
            tracing::warn!(error = %e, "reference set unavailable, every question will use retrieval");
            Vec::new()
        }
    }
}
