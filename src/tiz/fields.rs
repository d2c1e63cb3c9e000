//! Stateless field extractors for a single listing entry.
//!
//! Each extractor reads either the entry's flattened text or its markup and
//! recovers one field. None of them fail: a miss is an empty value.

use chrono::{Days, NaiveDate};
use html_scraper::{ElementRef, Selector};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::race::{StreamType, TimeSlot, is_known_category};

const MONTHS: &[(&str, u32)] = &[
    ("January", 1),
    ("February", 2),
    ("March", 3),
    ("April", 4),
    ("May", 5),
    ("June", 6),
    ("July", 7),
    ("August", 8),
    ("September", 9),
    ("October", 10),
    ("November", 11),
    ("December", 12),
];

/// Checked in order, first hit wins. "POSSIBLE LIVE" and "PROBABLE LIVE"
/// contain "LIVE", so they must stay ahead of it.
const STREAM_TYPES: &[(&str, StreamType)] = &[
    ("POSSIBLE LIVE", StreamType::PossibleLive),
    ("PROBABLE LIVE", StreamType::ProbableLive),
    ("LIVE", StreamType::Live),
    ("RECORDED", StreamType::Recorded),
];

/// Checked in order; "(Spanish)" must not shadow "(English or Spanish)".
const STREAM_LANGUAGES: &[(&str, &str)] = &[
    ("(English or Spanish)", "English or Spanish"),
    ("(Spanish)", "Spanish"),
    ("(Slovenian)", "Slovenian"),
    ("(Flemish)", "Flemish"),
    ("(Arabic)", "Arabic"),
];

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\s+(\d+)(?:st|nd|rd|th)\s+(January|February|March|April|May|June|July|August|September|October|November|December)",
    )
    .unwrap()
});

static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"for\s+(\d+)\s+days?").unwrap());

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

static TAGGED_SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(WE|ME)\s+(\d+\.\d+)\s+UTC\s+\(([^)]+)\)").unwrap());

static UNTAGGED_SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)\s+UTC\s+\(([^)]+)\)").unwrap());

static FLAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z_]+|[a-z]{2})\.(?:png|webp)").unwrap());

static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static NOTE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("em").unwrap());

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

/// Find the first "Weekday 6th February" date in `text`, placed in `year`.
///
/// Impossible dates ("Monday 31st February") are a miss, not an error.
pub fn find_listing_date(text: &str, year: i32) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;

    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        debug!(
            matched = &caps[0],
            year, "Listing date does not exist in calendar"
        );
    }
    date
}

/// Start and end date from an entry's text.
///
/// The end date is only set when a "for N days" span accompanies an explicit
/// start date; a single-day entry reports `None` for the end.
pub fn parse_date_range(text: &str, year: i32) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let Some(start) = find_listing_date(text, year) else {
        return (None, None);
    };

    let end = SPAN_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .filter(|days| *days > 0)
        .and_then(|days| start.checked_add_days(Days::new(days - 1)));

    (Some(start), end)
}

/// Whether the listing says the start times are still to be announced.
pub fn mentions_times_tba(text: &str) -> bool {
    text.contains("times TBA") || text.contains("time TBA")
}

/// Whitelisted category tags from every parenthesized group, in first-seen
/// order without duplicates. "Women Elite" and "Men Elite" also count when
/// they appear outside parentheses.
pub fn extract_categories(text: &str) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        if !categories.iter().any(|c| c == tag) {
            categories.push(tag.to_owned());
        }
    };

    for caps in PAREN_RE.captures_iter(text) {
        for part in caps[1].split(',') {
            let tag = part.trim();
            if is_known_category(tag) {
                push(tag);
            }
        }
    }

    for standalone in ["Women Elite", "Men Elite"] {
        if text.contains(standalone) {
            push(standalone);
        }
    }

    categories
}

pub fn detect_stream_type(text: &str) -> Option<StreamType> {
    STREAM_TYPES
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, stream_type)| *stream_type)
}

pub fn detect_stream_language(text: &str) -> Option<&'static str> {
    STREAM_LANGUAGES
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, language)| *language)
}

/// Country code from a flag image URL.
///
/// `.../flags/B_be.png` → `BE`, `.../w580/fr.png` → `FR`. Prefixed codes
/// keep only the segment after the last underscore.
pub fn country_from_flag(src: &str) -> String {
    let Some(caps) = FLAG_RE.captures(src) else {
        return String::new();
    };

    let code = caps[1].rsplit('_').next().unwrap_or_default();
    if code.chars().count() < 2 {
        return String::new();
    }
    code.chars().take(2).collect::<String>().to_uppercase()
}

/// Every anchor `href` inside the entry, in document order.
///
/// Protocol-relative links gain an explicit `https:`; `javascript:` links
/// and empty hrefs are dropped.
pub fn extract_links(entry: ElementRef<'_>) -> Vec<String> {
    entry
        .select(&LINK_SEL)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with("javascript:"))
        .map(|href| {
            if href.starts_with("//") {
                format!("https:{href}")
            } else {
                href.to_owned()
            }
        })
        .collect()
}

/// Text of every `<em>` element, joined with " | ".
pub fn extract_notes(entry: ElementRef<'_>) -> Option<String> {
    let notes: Vec<String> = entry
        .select(&NOTE_SEL)
        .map(|em| em.text().collect::<String>().trim().to_owned())
        .filter(|note| !note.is_empty())
        .collect();

    (!notes.is_empty()).then(|| notes.join(" | "))
}

/// "12.40" → "12:40:00 UTC".
fn clock_from_dotted(dotted: &str) -> String {
    format!("{}:00 UTC", dotted.replacen('.', ":", 1))
}

/// Broadcast windows announced in the text.
///
/// Category-tagged slots ("WE 12.40 UTC (60 mins)") are collected first;
/// only when there are none is a single untagged "14.45 UTC (90 mins)" slot
/// looked for.
pub fn extract_time_slots(text: &str) -> Vec<TimeSlot> {
    let tagged: Vec<TimeSlot> = TAGGED_SLOT_RE
        .captures_iter(text)
        .map(|caps| TimeSlot {
            category: caps[1].to_owned(),
            clock_time: clock_from_dotted(&caps[2]),
            duration: caps[3].trim().to_owned(),
        })
        .collect();

    if !tagged.is_empty() {
        return tagged;
    }

    UNTAGGED_SLOT_RE
        .captures(text)
        .map(|caps| TimeSlot {
            category: String::new(),
            clock_time: clock_from_dotted(&caps[1]),
            duration: caps[2].trim().to_owned(),
        })
        .into_iter()
        .collect()
}

/// Record-level duration: the first slot's, when there is one.
pub fn record_duration(times: &[TimeSlot]) -> Option<String> {
    times
        .first()
        .map(|slot| slot.duration.clone())
        .filter(|duration| !duration.is_empty())
}
