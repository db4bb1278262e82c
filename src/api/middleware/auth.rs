use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Rejects requests without a configured `X-API-Key`. No keys configured
/// means the API is open.
pub async fn api_key_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let keys = &state.config.config.server.api_keys;
    if keys.is_empty() {
        return Ok(next.run(request).await);
    }

    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match api_key {
        Some(key) if keys.iter().any(|k| k == key) => Ok(next.run(request).await),
        _ => {
            tracing::warn!(uri = %request.uri(), "rejected request without valid api key");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
