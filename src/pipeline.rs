//! Raw document → races → calendar text.

use tracing::debug;

use crate::calendar::encode_calendar;
use crate::filter::CategoryFilter;
use crate::race::RaceRecord;
use crate::schedule::parse_schedule;
use crate::source::SourceKind;
use crate::tiz::{ExtractError, parse_races};

/// Parse an upstream document of the given kind, placing dates in `year`.
pub fn parse_document(
    kind: SourceKind,
    document: &str,
    year: i32,
) -> Result<Vec<RaceRecord>, ExtractError> {
    debug!(source = %kind, bytes = document.len(), year, "Parsing upstream document");
    match kind {
        SourceKind::Tiz => parse_races(document, year),
        SourceKind::Schedule => Ok(parse_schedule(document, year)),
    }
}

/// Filter `races` and encode the survivors as one calendar.
pub fn render_calendar(races: &[RaceRecord], filter: &CategoryFilter, calendar_name: &str) -> String {
    let kept = filter.apply(races);
    debug!(
        races = races.len(),
        kept = kept.len(),
        classes = ?filter.tags(),
        "Applied category filter"
    );
    encode_calendar(&kept, calendar_name)
}
