//! Calendar download handlers.

use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Query;
use serde::Deserialize;
use tracing::info;

use crate::filter::CategoryFilter;
use crate::pipeline::render_calendar;
use crate::source::SourceKind;
use crate::state::AppState;
use crate::web::error::ApiError;

const CYCLING_FILENAME: &str = "cycling-calendar.ics";
const SCHEDULE_FILENAME: &str = "schedule-calendar.ics";

#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    /// Repeated `class=` values.
    #[serde(default)]
    pub class: Vec<String>,
}

/// `GET /cycling-calendar.ics?class=WE&class=ME`
pub(super) async fn cycling_calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<Response, ApiError> {
    info!(classes = ?params.class, "Calendar requested");
    let filter = CategoryFilter::new(params.class)?;
    let races = state.races(SourceKind::Tiz).await?;
    let body = render_calendar(&races, &filter, &state.calendar_name);
    Ok(ics_response(body, CYCLING_FILENAME))
}

/// `GET /schedule-calendar.ics`
pub(super) async fn schedule_calendar(State(state): State<AppState>) -> Result<Response, ApiError> {
    let races = state.races(SourceKind::Schedule).await?;
    let body = render_calendar(&races, &CategoryFilter::default(), &state.calendar_name);
    Ok(ics_response(body, SCHEDULE_FILENAME))
}

fn ics_response(body: String, filename: &'static str) -> Response {
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/calendar"));
    if let Ok(disposition) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    response
}
