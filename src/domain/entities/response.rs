use serde::{Deserialize, Serialize};

use super::Citation;

pub const NO_RESOURCES_LABEL: &str = "No resources found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrigin {
    Cache,
    Rag,
}

/// What a resolved question hands back to the chat surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedResponse {
    pub answer: String,
    pub score_label: String,
    pub citations: Vec<Citation>,
    pub media: Vec<String>,
    pub origin: ResponseOrigin,
}

impl ComposedResponse {
    pub fn cached(answer: impl Into<String>, score: f32, media: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            score_label: format!("**Match - Score: {}%**", percentage(score)),
            citations: Vec::new(),
            media,
            origin: ResponseOrigin::Cache,
        }
    }

    pub fn generated(
        answer: impl Into<String>,
        top_score: Option<f32>,
        citations: Vec<Citation>,
    ) -> Self {
        Self {
            answer: answer.into(),
            score_label: score_label(top_score),
            citations,
            media: Vec::new(),
            origin: ResponseOrigin::Rag,
        }
    }

    pub fn citation_block(&self) -> String {
        citation_block(&self.citations)
    }

    /// Text shown to the user. Cache hits are returned verbatim.
    pub fn text(&self) -> String {
        match self.origin {
            ResponseOrigin::Cache => self.answer.clone(),
            ResponseOrigin::Rag => {
                format!("{}{}", self.answer, trailer(&self.score_label, &self.citations))
            }
        }
    }
}

/// `**RAG - Score: NN%**` for the best document, or [`NO_RESOURCES_LABEL`].
pub fn score_label(top_score: Option<f32>) -> String {
    match top_score {
        Some(score) => format!("**RAG - Score: {}%**", percentage(score)),
        None => NO_RESOURCES_LABEL.to_string(),
    }
}

pub fn citation_block(citations: &[Citation]) -> String {
    citations
        .iter()
        .map(Citation::bullet)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything appended after a generated answer.
pub fn trailer(score_label: &str, citations: &[Citation]) -> String {
    format!("\n\n{}\n\n{}", score_label, citation_block(citations))
}

fn percentage(score: f32) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_label_truncates() {
        assert_eq!(score_label(Some(0.8)), "**RAG - Score: 80%**");
        assert_eq!(score_label(Some(0.679)), "**RAG - Score: 67%**");
        assert_eq!(score_label(None), NO_RESOURCES_LABEL);
    }

    #[test]
    fn test_generated_text_layout() {
        let response = ComposedResponse::generated(
            "Answer",
            Some(0.8),
            vec![
                Citation { source: "a.pdf".into(), page: 1 },
                Citation { source: "b.pdf".into(), page: 7 },
            ],
        );
        assert_eq!(
            response.text(),
            "Answer\n\n**RAG - Score: 80%**\n\n* a.pdf - page: 1\n* b.pdf - page: 7"
        );
    }

    #[test]
    fn test_generated_without_documents() {
        let response = ComposedResponse::generated("Answer", None, Vec::new());
        assert_eq!(response.text(), "Answer\n\nNo resources found.\n\n");
        assert!(response.citation_block().is_empty());
    }
}
