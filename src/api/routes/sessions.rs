use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{DomainError, Transcript};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub greeting: String,
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let (session_id, _) = state.chat.sessions().create().await;
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            greeting: state.chat.sessions().greeting().to_string(),
        }),
    )
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.chat.sessions().remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DomainError::not_found(format!("session {id}")).into())
    }
}

pub async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.chat.clear(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Transcript>, ApiError> {
    Ok(Json(state.chat.transcript(&id).await?))
}
