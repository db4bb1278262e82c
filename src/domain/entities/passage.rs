use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most passages handed to the synthesizer for one answer.
pub const DEFAULT_TOP_K: usize = 3;

/// Lowest relevance a passage may score and still ground an answer.
pub const DEFAULT_RELEVANCE_FLOOR: f32 = 0.5;

/// A page-level slice of the corpus as stored in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub source: String,
    pub page: u32,
    pub content: String,
}

impl IndexedPassage {
    pub fn new(source: impl Into<String>, page: u32, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page,
            content: content.into(),
        }
    }

    /// Point id derived from `source` and `page`, so re-indexing a page
    /// overwrites it instead of adding a copy.
    pub fn id(&self) -> Uuid {
        Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            format!("{}#page={}", self.source, self.page).as_bytes(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub source: String,
    pub page: u32,
    pub relevance_score: f32,
}

impl RetrievedDocument {
    pub fn from_passage(passage: IndexedPassage, relevance_score: f32) -> Self {
        Self {
            content: passage.content,
            source: passage.source,
            page: passage.page,
            relevance_score,
        }
    }

    /// Source with any directory prefix removed.
    pub fn file_name(&self) -> &str {
        self.source
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.source)
    }

    pub fn citation(&self) -> Citation {
        Citation {
            source: self.file_name().to_string(),
            page: self.page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub page: u32,
}

impl Citation {
    pub fn bullet(&self) -> String {
        format!("* {} - page: {}", self.source, self.page)
    }
}
