use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// Terminal failure of a single resolution turn.
///
/// Matching never fails (a broken reference set scores zero), so only the
/// retrieval and generation stages surface here.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] DomainError),

    #[error("Generation failed: {0}")]
    Generation(#[source] DomainError),
}

impl ResolveError {
    pub fn retrieval(err: DomainError) -> Self {
        Self::Retrieval(err)
    }

    pub fn generation(err: DomainError) -> Self {
        Self::Generation(err)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Retrieval(DomainError::Timeout(_)) | Self::Generation(DomainError::Timeout(_))
        )
    }
}
