//! SSE change feed
//!
//! Terminals subscribe here instead of polling. Each committed mutation
//! arrives as a `ChangeNotice` with a per-resource version; after a lag
//! or reconnect the client re-fetches and resumes from the stream.

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use tokio::sync::broadcast;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(subscribe))
}

async fn subscribe(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe_changes();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notice) => match Event::default().event(notice.resource.clone()).json_data(&notice) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to serialize change notice");
                        continue;
                    }
                },
                // dropped messages: the client resyncs via versions
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Change subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
