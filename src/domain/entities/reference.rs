use serde::{Deserialize, Deserializer, Serialize};

/// Score a reference match must exceed to be served from the dataset.
///
/// Kept at the historically deployed value. Trigram Jaccard scores above
/// 0.009 are reached by almost any question sharing a few letters with a
/// reference question, so shipped configuration sets `matcher.threshold`
/// near 0.9 instead.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.009;

/// A known question with its canonical answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub question: String,
    pub answer: String,
    #[serde(default, alias = "images", deserialize_with = "deserialize_media")]
    pub media: Vec<String>,
}

impl ReferenceEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            media: Vec::new(),
        }
    }

    pub fn with_media(mut self, media: Vec<String>) -> Self {
        self.media = media;
        self
    }
}

/// Media may be stored as `"a.png, b.png"` or as a JSON array.
fn deserialize_media<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        List(Vec<String>),
    }

    let media = match Option::<Raw>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Raw::Joined(joined)) => joined
            .split(", ")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Raw::List(list)) => list.into_iter().filter(|s| !s.trim().is_empty()).collect(),
    };
    Ok(media)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub answer: String,
    pub score: f32,
    pub media: Vec<String>,
}

impl SimilarityResult {
    pub fn none() -> Self {
        Self {
            answer: String::new(),
            score: 0.0,
            media: Vec::new(),
        }
    }
}
