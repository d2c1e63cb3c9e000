//! Web router construction.

use axum::{Router, routing::get};
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::web::{calendar, status};

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .route("/cycling-calendar.ics", get(calendar::cycling_calendar))
        .route("/schedule-calendar.ics", get(calendar::schedule_calendar))
        .with_state(app_state)
        .layer((
            TraceLayer::new_for_http(),
            CompressionLayer::new()
                .gzip(true)
                .quality(tower_http::CompressionLevel::Fastest),
            // Upstream fetches are bounded by FETCH_TIMEOUT; this covers the rest.
            TimeoutLayer::new(Duration::from_secs(60)),
        ))
}
