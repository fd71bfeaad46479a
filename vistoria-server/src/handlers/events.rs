use std::{convert::Infallible, time::Duration};

use axum::{
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::warn;

use crate::infra::{app_state::AppState, invalidation::InvalidationEvent};

pub const INVALIDATION_EVENT_NAME: &str = "invalidate";

/// Stream of cache invalidations as server-sent events.
pub async fn invalidation_events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.invalidations.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|item| match item {
        Ok(event) => invalidation_to_sse(&event).map(Ok),
        Err(err) => {
            warn!("invalidation broadcast error: {err}");
            None
        }
    });

    Sse::new(stream).keep_alive(default_keep_alive())
}

fn invalidation_to_sse(event: &InvalidationEvent) -> Option<Event> {
    Event::default()
        .event(INVALIDATION_EVENT_NAME)
        .json_data(event)
        .inspect_err(|err| warn!("failed to encode invalidation event: {err}"))
        .ok()
}

fn default_keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("keep-alive")
}
