use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderName;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use campus_core_types::{ChatRequest, UI_MESSAGE_STREAM_HEADER, UI_MESSAGE_STREAM_VERSION};
use futures::stream::{self, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const EVENT_BUFFER: usize = 64;
const DONE_MARKER: &str = "[DONE]";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Streams one chat turn as SSE. The turn runs in its own task; dropping the
/// response stream cancels it.
async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> impl IntoResponse {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    info!("Chat request received: messages={}", request.messages.len());
    let chat = state.chat.clone();
    tokio::spawn(async move {
        let summary = chat.handle(request, tx, cancel).await;
        debug!(
            "Chat turn summary: status={:?}, steps={}, tool_calls={}",
            summary.status, summary.steps, summary.tool_calls
        );
    });

    let events = ReceiverStream::new(rx).map(|event| Event::default().json_data(event));
    let done = stream::once(async { Ok(Event::default().data(DONE_MARKER)) });
    let body = events.chain(done).map(move |item| {
        let _cancel_on_drop = &guard;
        item
    });

    (
        [(
            HeaderName::from_static(UI_MESSAGE_STREAM_HEADER),
            UI_MESSAGE_STREAM_VERSION,
        )],
        Sse::new(body).keep_alive(KeepAlive::default()),
    )
}
