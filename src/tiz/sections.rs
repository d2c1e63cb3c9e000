//! Section tracking over the listing's `<li>` items.
//!
//! The listing groups races under "TODAY ...", "TOMORROW ..." and
//! "UPCOMING" headings. Entries without their own date inherit the date of
//! the most recent heading, so the scan threads a [`ScanState`] through the
//! items in document order.

use chrono::{Days, NaiveDate};
use html_scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use tracing::debug;

use super::fields::find_listing_date;

static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

const HEADER_TOKENS: &[&str] = &["TODAY", "TOMORROW", "UPCOMING"];

/// Date inherited by entries from the most recent section heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateScope {
    /// No heading seen yet, or the heading's date could not be read.
    #[default]
    Unresolved,
    Date(NaiveDate),
    /// A "TOMORROW" heading with no date of its own and no known today.
    Tomorrow,
    /// "UPCOMING" entries never inherit a date.
    Upcoming,
}

impl DateScope {
    /// The date an entry without an explicit date falls back to.
    pub fn fallback_date(self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(date),
            Self::Unresolved | Self::Tomorrow | Self::Upcoming => None,
        }
    }
}

/// Accumulator threaded through the scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanState {
    pub scope: DateScope,
    pub today: Option<NaiveDate>,
}

impl ScanState {
    /// Apply a section heading and return the updated state.
    pub fn enter_section(self, header: &str, year: i32) -> Self {
        if header.contains("TODAY") {
            let today = find_listing_date(header, year);
            if today.is_none() {
                debug!(header, "Could not read date from TODAY heading");
            }
            return Self {
                scope: today.map_or(DateScope::Unresolved, DateScope::Date),
                today,
            };
        }

        if header.contains("TOMORROW") {
            let scope = match find_listing_date(header, year) {
                Some(date) => DateScope::Date(date),
                None => match self.today.and_then(|t| t.checked_add_days(Days::new(1))) {
                    Some(date) => DateScope::Date(date),
                    None => {
                        debug!(header, "TOMORROW heading without a usable date");
                        DateScope::Tomorrow
                    }
                },
            };
            return Self { scope, ..self };
        }

        Self {
            scope: DateScope::Upcoming,
            ..self
        }
    }
}

/// What a single `<li>` turned out to be.
#[derive(Debug, Clone)]
pub enum ListItem<'a> {
    Header { text: String, scope: DateScope },
    Entry {
        element: ElementRef<'a>,
        text: String,
        scope: DateScope,
    },
    /// Not a heading and no flag image: decorative text, not a race.
    Skipped,
}

/// Text content of an element with whitespace runs collapsed to one space.
pub fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_section_header(text: &str) -> bool {
    HEADER_TOKENS.iter().any(|token| text.contains(token))
}

/// Classify every item in document order, carrying the section scope
/// forward from headings to the entries below them.
pub fn scan_items<'a, I>(items: I, year: i32) -> Vec<ListItem<'a>>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    items
        .into_iter()
        .scan(ScanState::default(), |state, element| {
            let text = flatten_text(element);

            if is_section_header(&text) {
                *state = state.enter_section(&text, year);
                return Some(ListItem::Header {
                    text,
                    scope: state.scope,
                });
            }

            if element.select(&IMG_SEL).next().is_none() {
                if text.len() > 20 {
                    debug!(text = %text, "No image found in list item, skipping");
                }
                return Some(ListItem::Skipped);
            }

            Some(ListItem::Entry {
                element,
                text,
                scope: state.scope,
            })
        })
        .collect()
}
