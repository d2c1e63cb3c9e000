//! Normalized race records shared by every listing source.
//!
//! Both the Tiz HTML listing and the legacy schedule table produce
//! [`RaceRecord`]s; the calendar encoder only ever sees this type.

use chrono::NaiveDate;
use std::fmt;

/// Race-classification tags accepted from listings and from callers.
pub const CATEGORY_WHITELIST: &[&str] = &[
    "WE",
    "ME",
    "track",
    "MTB",
    "NC",
    "JR",
    "WC",
    "Elite",
    "Women Elite",
    "Men Elite",
    "Women",
    "Men",
];

/// Tag → human-readable name. Tags missing here are displayed verbatim.
const CATEGORY_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("WE", "Women Elite"),
    ("ME", "Men Elite"),
    ("track", "Track"),
    ("MTB", "Mountain Bike"),
    ("NC", "National Championships"),
    ("JR", "Junior"),
    ("WC", "World Championships"),
];

/// Whether `tag` is one of the whitelisted category tags (exact match).
pub fn is_known_category(tag: &str) -> bool {
    CATEGORY_WHITELIST.contains(&tag)
}

/// Display name for a category tag, falling back to the tag itself.
pub fn category_display_name(tag: &str) -> &str {
    CATEGORY_DISPLAY_NAMES
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, display)| *display)
        .unwrap_or(tag)
}

/// How a race is broadcast, as announced by the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    Live,
    PossibleLive,
    ProbableLive,
    Recorded,
}

impl StreamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::PossibleLive => "POSSIBLE LIVE",
            Self::ProbableLive => "PROBABLE LIVE",
            Self::Recorded => "RECORDED",
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled broadcast window within a race day.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSlot {
    /// Category tag the slot belongs to ("WE", "ME"), empty when untagged.
    pub category: String,
    /// Clock time as `HH:MM:SS UTC`.
    pub clock_time: String,
    /// Free text, e.g. "90 mins" or "3.25 hrs".
    pub duration: String,
}

/// A single normalized race, immutable once assembled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RaceRecord {
    pub name: String,
    /// "stage N (of M)" or "day N (of M)".
    pub stage: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub all_day: bool,
    pub times: Vec<TimeSlot>,
    /// Record-level duration, seeded from the first time slot.
    pub duration: Option<String>,
    /// ISO 3166 alpha-2 code, empty when the flag could not be read.
    pub country: String,
    pub country_flag_url: Option<String>,
    pub categories: Vec<String>,
    pub stream_type: Option<StreamType>,
    pub stream_links: Vec<String>,
    pub stream_language: Option<String>,
    pub notes: Option<String>,
}

impl RaceRecord {
    /// Calendar UID: name and stage concatenated with no delimiter.
    ///
    /// Two races sharing a name with no stage produce the same UID.
    pub fn uid(&self) -> String {
        format!("{}{}", self.name, self.stage.as_deref().unwrap_or_default())
    }

    /// Category tags mapped to their display names, in record order.
    pub fn category_display_names(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(|tag| category_display_name(tag))
            .collect()
    }

    /// The link shown as "More info": the first link that is not a stream
    /// page, otherwise the first link.
    pub fn info_link(&self) -> Option<&str> {
        self.stream_links
            .iter()
            .find(|link| !link.contains("stream") && !link.contains("cyclingtiz"))
            .or_else(|| self.stream_links.first())
            .map(String::as_str)
    }

    /// Whether any of the record's categories equals `tag`, ignoring case.
    pub fn has_category(&self, tag: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_fall_back_to_tag() {
        assert_eq!(category_display_name("WE"), "Women Elite");
        assert_eq!(category_display_name("MTB"), "Mountain Bike");
        assert_eq!(category_display_name("Elite"), "Elite");
        assert_eq!(category_display_name("U23"), "U23");
    }

    #[test]
    fn whitelist_is_case_sensitive() {
        assert!(is_known_category("track"));
        assert!(!is_known_category("Track"));
        assert!(is_known_category("Women Elite"));
    }

    #[test]
    fn uid_concatenates_name_and_stage() {
        let race = RaceRecord {
            name: "Tour Down Under".into(),
            stage: Some("stage 2 (of 6)".into()),
            ..Default::default()
        };
        assert_eq!(race.uid(), "Tour Down Understage 2 (of 6)");
    }

    #[test]
    fn info_link_prefers_non_stream_links() {
        let race = RaceRecord {
            stream_links: vec![
                "https://cyclingtiz.live/stream/1".into(),
                "https://www.uci.org/race".into(),
            ],
            ..Default::default()
        };
        assert_eq!(race.info_link(), Some("https://www.uci.org/race"));

        let only_streams = RaceRecord {
            stream_links: vec!["https://cyclingtiz.live/stream/1".into()],
            ..Default::default()
        };
        assert_eq!(
            only_streams.info_link(),
            Some("https://cyclingtiz.live/stream/1")
        );
        assert_eq!(RaceRecord::default().info_link(), None);
    }

    #[test]
    fn has_category_ignores_case() {
        let race = RaceRecord {
            categories: vec!["WE".into(), "track".into()],
            ..Default::default()
        };
        assert!(race.has_category("we"));
        assert!(race.has_category("TRACK"));
        assert!(!race.has_category("ME"));
    }
}
