use axum::{
    Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::sync::broadcast;
use tracing::warn;

use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// When present, only events for this scout are forwarded.
    pub scout_id: Option<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(sse_handler))
}

async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_bus().subscribe();
    let filter = query.scout_id;

    let stream = stream::unfold((rx, filter), |(mut rx, filter)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let (Some(wanted), Some(scout_id)) = (filter.as_deref(), event.scout_id())
                        && wanted != scout_id
                    {
                        continue;
                    }
                    let json = serde_json::to_string(&event).unwrap_or_default();
                    return Some((Ok(Event::default().data(json)), (rx, filter)));
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!("Client lagged by {} messages", count);

                    return Some((
                        Ok(Event::default().event("warning").data("Missed some events")),
                        (rx, filter),
                    ));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
