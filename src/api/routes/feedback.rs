use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::application::services::{review_pairs, ReviewInput};
use crate::domain::{FeedbackRecord, QaPair};

#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub reviews: Vec<ReviewInput>,
}

pub async fn get_review_pairs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QaPair>>, ApiError> {
    let transcript = state.chat.transcript(&id).await?;
    Ok(Json(review_pairs(&transcript)))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackRecord>), ApiError> {
    let transcript = state.chat.transcript(&id).await?;
    let record = state.feedback.submit(&transcript, request.reviews).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
