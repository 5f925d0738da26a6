//! Live snapshot streams over Server-Sent Events
//!
//! Each subscriber gets its own interval. On every tick the page or search
//! query is re-run against the store and the full result is pushed as one
//! event. Nothing is shared between subscribers.

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Serialize;
use tokio_stream::{wrappers::IntervalStream, Stream, StreamExt};

use super::handlers::{leaderboard_page, parse_limit, search_results, PageParams, SearchParams};
use crate::core::{AppState, Error, Result};
use crate::system::metrics::Metrics;
use crate::{log_debug, log_warn};

/// Tracks one open stream in the subscriber gauge
struct SubscriberGuard {
    kind: &'static str,
}

impl SubscriberGuard {
    fn new(kind: &'static str) -> Self {
        Metrics::global().queries.live_subscribers.inc();
        log_debug!(kind, "live subscriber connected");
        Self { kind }
    }
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        Metrics::global().queries.live_subscribers.dec();
        log_debug!(kind = self.kind, "live subscriber disconnected");
    }
}

/// Unnamed `data:` frame, delivered to `EventSource.onmessage`
fn snapshot_event<T: Serialize>(kind: &str, body: &T) -> Option<std::result::Result<Event, Infallible>> {
    match serde_json::to_string(body) {
        Ok(json) => Some(Ok(Event::default().data(json))),
        Err(e) => {
            log_warn!(error = %e, kind, "dropping unserializable snapshot");
            None
        }
    }
}

/// GET /api/stream - live ranking page
pub async fn stream_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let params = PageParams {
        limit: params.limit.or_else(|| Some(state.config.live.snapshot_limit.to_string())),
        offset: params.offset,
    };
    let interval = tokio::time::interval(state.config.live.push_interval);
    let guard = SubscriberGuard::new("leaderboard");

    let stream = IntervalStream::new(interval).filter_map(move |_| {
        let _ = &guard;
        let body = leaderboard_page(&state, &params);
        snapshot_event("leaderboard", &body)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/stream/search - live search results
pub async fn stream_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let query = params.q.unwrap_or_default();
    if query.is_empty() {
        return Err(Error::invalid_input("query parameter 'q' is required"));
    }

    let live = &state.config.live;
    let limit = parse_limit(params.limit.as_deref(), live.snapshot_limit, state.config.server.max_page_limit);
    let interval = tokio::time::interval(live.push_interval);
    let guard = SubscriberGuard::new("search");

    let stream = IntervalStream::new(interval).filter_map(move |_| {
        let _ = &guard;
        let body = search_results(&state, &query, limit);
        snapshot_event("search", &body)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
