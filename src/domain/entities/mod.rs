mod conversation;
mod embedding;
mod feedback;
mod passage;
mod reference;
mod response;

pub use conversation::{
    CannedReplies, ConversationState, Message, MessageRole, Transcript, Turn,
    DEFAULT_CONVERSATION_WINDOW,
};
pub use embedding::Embedding;
pub use feedback::{FeedbackRecord, Likert, PairReview, QaPair, TranscriptRecord};
pub use passage::{
    Citation, IndexedPassage, RetrievedDocument, DEFAULT_RELEVANCE_FLOOR, DEFAULT_TOP_K,
};
pub use reference::{ReferenceEntry, SimilarityResult, DEFAULT_MATCH_THRESHOLD};
pub use response::{
    citation_block, score_label, trailer, ComposedResponse, ResponseOrigin, NO_RESOURCES_LABEL,
};
