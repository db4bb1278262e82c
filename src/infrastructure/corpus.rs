use std::path::Path;

use crate::domain::{DomainError, IndexedPassage};

/// Reads a JSON array of `{source, page, content}` passages.
pub fn read_passages(path: impl AsRef<Path>) -> Result<Vec<IndexedPassage>, DomainError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DomainError::not_found(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| DomainError::validation(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_shipped_corpus() {
        let passages =
            read_passages(concat!(env!("CARGO_MANIFEST_DIR"), "/data/corpus.json")).unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].source, "docs/setup.pdf");
        assert_eq!(passages[0].page, 4);
    }

    #[test]
    fn test_missing_and_corrupt_corpus() {
        assert!(matches!(
            read_passages("no/such/corpus.json"),
            Err(DomainError::NotFound(_))
        ));

        let path = std::env::temp_dir().join(format!("faber-{}-corpus.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"[{"source": "a.pdf"}]"#).unwrap();
        let result = read_passages(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
