//! Tiz cycling listing: HTML `<li>` entries to [`RaceRecord`]s.
//!
//! The listing is free-form prose per race, e.g.
//! `Friday 6th February for 3 days - WE 12.40 UTC (60 mins) - LIVE - Link`,
//! grouped under TODAY / TOMORROW / UPCOMING headings. [`parse_races`] walks
//! the headings with [`sections`], runs the [`fields`] extractors and the
//! [`names`] cleanup on each entry and assembles one record per race.

pub mod errors;
pub mod fields;
pub mod names;
pub mod sections;

pub use errors::ExtractError;

use chrono::{Datelike, Utc};
use html_scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::race::RaceRecord;
use sections::{DateScope, ListItem, scan_items};

static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Parse a listing document, assuming `year` for dates without one.
///
/// Fails only when the document has no list items at all; individual
/// entries that cannot be read are skipped.
pub fn parse_races(document: &str, year: i32) -> Result<Vec<RaceRecord>, ExtractError> {
    let html = Html::parse_document(document);
    let items: Vec<ElementRef<'_>> = html.select(&LI_SEL).collect();
    if items.is_empty() {
        return Err(ExtractError::NoListItems);
    }
    info!(count = items.len(), "Found list items in listing");

    let scanned = scan_items(items, year);
    let entry_count = scanned
        .iter()
        .filter(|item| matches!(item, ListItem::Entry { .. }))
        .count();

    let races: Vec<RaceRecord> = scanned
        .into_iter()
        .filter_map(|item| match item {
            ListItem::Entry {
                element,
                text,
                scope,
            } => assemble_race(element, &text, scope, year),
            ListItem::Header { text, scope } => {
                debug!(section = %text, ?scope, "Found section header");
                None
            }
            ListItem::Skipped => None,
        })
        .collect();

    info!(
        entries = entry_count,
        races = races.len(),
        "Finished parsing Tiz listing"
    );
    Ok(races)
}

/// [`parse_races`] for the current UTC year.
pub fn parse_races_now(document: &str) -> Result<Vec<RaceRecord>, ExtractError> {
    parse_races(document, Utc::now().year())
}

/// Build one record from an entry, or `None` when no name survives cleanup.
pub fn assemble_race(
    entry: ElementRef<'_>,
    text: &str,
    scope: DateScope,
    year: i32,
) -> Option<RaceRecord> {
    let name = names::clean_name(text);
    if name.is_empty() {
        warn!(text, "Parsed race but name is empty");
        return None;
    }

    let flag_url = entry
        .select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty());

    let (start_date, end_date) = match fields::parse_date_range(text, year) {
        (Some(start), end) => (Some(start), end),
        (None, _) => {
            let inherited = scope.fallback_date();
            (inherited, inherited)
        }
    };

    let mut times = fields::extract_time_slots(text);
    let all_day = fields::mentions_times_tba(text);
    if all_day && !times.is_empty() {
        debug!(text, "Times marked TBA, ignoring announced slots");
        times.clear();
    }

    let stream_links = fields::extract_links(entry);
    let stream_language = if stream_links.is_empty() {
        None
    } else {
        fields::detect_stream_language(text).map(str::to_owned)
    };

    let race = RaceRecord {
        stage: names::extract_stage(text),
        start_date,
        end_date,
        all_day,
        duration: fields::record_duration(&times),
        times,
        country: flag_url.map(fields::country_from_flag).unwrap_or_default(),
        country_flag_url: flag_url.map(str::to_owned),
        categories: fields::extract_categories(text),
        stream_type: fields::detect_stream_type(text),
        stream_links,
        stream_language,
        notes: fields::extract_notes(entry),
        name,
    };

    debug!(name = %race.name, start = ?race.start_date, "Parsed race");
    Some(race)
}
