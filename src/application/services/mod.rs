mod chat;
mod corpus;
mod feedback;
mod matcher;
mod orchestrator;
mod retriever;
mod sessions;
mod synthesizer;

pub use chat::{ChatError, ChatReply, ChatService, TurnEvent, TurnFailure};
pub use corpus::CorpusIndexer;
pub use feedback::{review_pairs, FeedbackService, ReviewInput};
pub use matcher::SimilarityMatcher;
pub use orchestrator::{Resolution, ResolutionOrchestrator, ResponseStream};
pub use retriever::DocumentRetriever;
pub use sessions::{Session, SessionHandle, SessionRegistry};
pub use synthesizer::{AnswerStream, ConversationalSynthesizer};
