//! Server-sent stream of dashboard events
//!
//! Each event bus envelope becomes one SSE message whose `event` field is
//! the event kind (`invoice` or `revalidated`) and whose data is the
//! envelope as JSON. Subscribers that fall behind skip the missed events.

use crate::core::events::EventEnvelope;
use crate::server::state::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

/// GET /dashboard/events
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    tracing::debug!(
        subscribers = state.events.receiver_count(),
        "event stream opened"
    );

    let events = BroadcastStream::new(receiver).filter_map(|item| match item {
        Ok(envelope) => to_sse(&envelope).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "event stream subscriber lagged");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(envelope: &EventEnvelope) -> Option<Event> {
    match Event::default()
        .event(envelope.event.event_kind())
        .id(envelope.id.to_string())
        .json_data(envelope)
    {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event envelope");
            None
        }
    }
}
