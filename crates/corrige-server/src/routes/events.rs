use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events — SSE stream; one `update` event per tracking sheet change.
/// Lagged receivers skip missed notifications rather than closing.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let stream = BroadcastStream::new(app.event_tx.subscribe()).filter_map(|msg| match msg {
        Ok(()) => Some(Ok::<Event, Infallible>(
            Event::default().event("update").data("tracking"),
        )),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
