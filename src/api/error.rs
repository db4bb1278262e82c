use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{ChatError, TurnFailure};
use crate::domain::{DomainError, ResolveError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub retryable: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Turn(#[from] TurnFailure),
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Session(err) => Self::Domain(err),
            ChatError::Turn(failure) => Self::Turn(failure),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Domain(DomainError::ExternalService(_)) => StatusCode::BAD_GATEWAY,
            Self::Domain(DomainError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Domain(DomainError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Turn(failure) => match failure.error {
                ResolveError::Retrieval(_) => StatusCode::BAD_GATEWAY,
                ResolveError::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Domain(err) => {
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                ErrorBody {
                    error: err.to_string(),
                    session_id: None,
                    retryable: false,
                }
            }
            Self::Turn(failure) => {
                tracing::warn!(session_id = %failure.session_id, error = %failure.error, "turn failed");
                ErrorBody {
                    retryable: matches!(failure.error, ResolveError::Generation(_)),
                    error: failure.message,
                    session_id: Some(failure.session_id),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_failures_map_to_gateway_statuses() {
        let failure = |error| {
            ApiError::Turn(TurnFailure {
                session_id: Uuid::nil(),
                message: "sorry".into(),
                error,
            })
        };

        assert_eq!(
            failure(ResolveError::retrieval(DomainError::external("down"))).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            failure(ResolveError::generation(DomainError::timeout("slow"))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_domain_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::from(DomainError::not_found("session")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DomainError::validation("empty")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ChatError::Session(DomainError::not_found("session"))).status(),
            StatusCode::NOT_FOUND
        );
    }
}
