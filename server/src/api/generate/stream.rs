use super::GenerateRequest;
use crate::api::{error_response, ErrorResponse};
use crate::AppState;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, Json};
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

#[derive(Debug, Serialize)]
struct UpdateEvent<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorEvent {
    error: String,
    status: u16,
}

fn json_event<T: Serialize>(name: &str, payload: &T) -> Option<Event> {
    match Event::default().event(name).json_data(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(error = %e, event = name, "Failed to encode SSE event");
            None
        }
    }
}

/// Stream generation progress as server-sent events.
///
/// Emits `update` events carrying the cumulative text, then exactly one `recipe`
/// or `error` event.
#[utoipa::path(
    post,
    path = "/api/generate/stream",
    tag = "generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Event stream of update events, then a recipe or error event", body = String, content_type = "text/event-stream"),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn generate_recipe_stream(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let params = match request.into_params() {
        Ok(params) => params,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        let updates = tx.clone();
        let on_update = move |text: &str| {
            if let Some(event) = json_event("update", &UpdateEvent { text }) {
                // Receiver gone means the client disconnected
                let _ = updates.send(event);
            }
        };

        let final_event = match state.generator.generate(&params, Some(&on_update)).await {
            Ok(recipe) => {
                let event = json_event("recipe", &recipe);
                state.store.write().await.recipes.push(recipe);
                event
            }
            Err(e) => {
                tracing::warn!(error = %e, "Streaming recipe generation failed");
                json_event(
                    "error",
                    &ErrorEvent {
                        error: e.to_string(),
                        status: e.status_code(),
                    },
                )
            }
        };

        if let Some(event) = final_event {
            let _ = tx.send(event);
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}
