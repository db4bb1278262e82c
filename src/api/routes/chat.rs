use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::application::services::TurnEvent;
use crate::domain::{ComposedResponse, DomainError};

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<Uuid>,
}

impl ChatRequest {
    fn question(&self) -> Result<&str, ApiError> {
        let question = self.message.trim();
        if question.is_empty() {
            return Err(DomainError::validation("message must not be empty").into());
        }
        Ok(question)
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    /// Answer with score label and citations, as displayed.
    pub text: String,
    #[serde(flatten)]
    pub response: ComposedResponse,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reply = state.chat.ask(request.session_id, request.question()?).await?;

    Ok(Json(ChatResponse {
        session_id: reply.session_id,
        text: reply.response.text(),
        response: reply.response,
    }))
}

pub async fn chat_stream_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<
    (
        [(&'static str, String); 1],
        Sse<impl Stream<Item = Result<Event, Infallible>>>,
    ),
    ApiError,
> {
    let question = request.question()?;
    let (session_id, rx) = state.chat.ask_stream(request.session_id, question).await?;

    let events = futures::stream::unfold(
        (rx, LineEndings::default()),
        |(mut rx, mut endings)| async move {
            let event = rx.recv().await?;
            let event = to_sse(event, &mut endings);
            Some((Ok(event), (rx, endings)))
        },
    );

    Ok((
        [(SESSION_HEADER, session_id.to_string())],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}

fn to_sse(event: TurnEvent, endings: &mut LineEndings) -> Event {
    let built = match event {
        TurnEvent::Media(media) => Event::default().event("media").json_data(media),
        TurnEvent::Fragment(text) => Ok(Event::default()
            .event("fragment")
            .data(endings.fold(&text))),
        TurnEvent::Done(response) => Event::default().event("done").json_data(response),
        TurnEvent::Failed { message, retryable } => Event::default()
            .event("error")
            .json_data(serde_json::json!({ "message": message, "retryable": retryable })),
    };

    built.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to encode event");
        Event::default().event("error").data("internal error")
    })
}

/// Folds carriage returns in streamed text into line feeds. A `\r\n` pair
/// split across two fragments yields a single line feed.
#[derive(Debug, Default)]
struct LineEndings {
    after_cr: bool,
}

impl LineEndings {
    fn fold(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\r' => out.push('\n'),
                '\n' if self.after_cr => {}
                c => out.push(c),
            }
            self.after_cr = c == '\r';
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_fold_carriage_returns() {
        let mut endings = LineEndings::default();
        assert_eq!(endings.fold("one\r\ntwo"), "one\ntwo");
        assert_eq!(endings.fold("one\rtwo"), "one\ntwo");
        assert_eq!(endings.fold("plain\n\ntext"), "plain\n\ntext");
    }

    #[test]
    fn test_line_endings_pair_split_across_fragments() {
        let mut endings = LineEndings::default();
        assert_eq!(endings.fold("line one\r"), "line one\n");
        assert_eq!(endings.fold("\nline two"), "line two");
        assert_eq!(endings.fold("\n"), "\n");
    }
}
