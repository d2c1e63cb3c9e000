//! iCalendar (RFC 5545) output for race records.

pub mod ics;
pub mod timing;

pub use timing::{EventTiming, TimingError};

use tracing::{debug, info, warn};

use crate::race::RaceRecord;
use ics::{ContentLines, escape_text};

const PRODUCT_ID: &str = "-//cycling-calendar//Cycling Calendar//EN";
const CALENDAR_LABEL: &str = "Cycling Calendar";
const REFRESH_INTERVAL: &str = "PT1H";

const DATE_FORMAT: &str = "%Y%m%d";
const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Encode `races` as one calendar named `calendar_name`.
///
/// Records whose start cannot be resolved are logged and left out; the
/// calendar header and footer are always written.
pub fn encode_calendar(races: &[RaceRecord], calendar_name: &str) -> String {
    let mut out = ContentLines::new();
    write_header(&mut out, calendar_name);

    let mut encoded = 0usize;
    for race in races {
        match EventTiming::resolve(race) {
            Ok(timing) => {
                write_event(&mut out, race, timing);
                encoded += 1;
            }
            Err(error) => {
                warn!(name = %race.name, %error, "Skipping race that cannot be placed on the calendar");
            }
        }
    }

    out.raw("END", "VCALENDAR");
    info!(
        races = races.len(),
        events = encoded,
        calendar = calendar_name,
        "Encoded calendar"
    );
    out.finish()
}

fn write_header(out: &mut ContentLines, calendar_name: &str) {
    let description = format!("{CALENDAR_LABEL}: {calendar_name}");

    out.raw("BEGIN", "VCALENDAR");
    out.raw("VERSION", "2.0");
    out.raw("PRODID", PRODUCT_ID);
    out.text("NAME", calendar_name);
    out.text("X-WR-CALNAME", calendar_name);
    out.text("DESCRIPTION", &description);
    out.text("X-WR-CALDESC", &description);
    out.raw("REFRESH-INTERVAL;VALUE=DURATION", REFRESH_INTERVAL);
}

fn write_event(out: &mut ContentLines, race: &RaceRecord, timing: EventTiming) {
    out.raw("BEGIN", "VEVENT");
    out.text("UID", &race.uid());

    match timing {
        EventTiming::AllDay { start, end } => {
            out.raw("DTSTART;VALUE=DATE", &start.format(DATE_FORMAT).to_string());
            out.raw("DTEND;VALUE=DATE", &end.format(DATE_FORMAT).to_string());
        }
        EventTiming::Timed { start, end } => {
            out.raw("DTSTART", &start.format(DATETIME_FORMAT).to_string());
            out.raw("DTEND", &end.format(DATETIME_FORMAT).to_string());
        }
    }

    out.text("SUMMARY", &summary(race));
    out.raw("DESCRIPTION", &description(race));
    if let Some(link) = race.stream_links.first() {
        out.raw("URL", link);
    }
    out.raw("END", "VEVENT");

    debug!(uid = %race.uid(), ?timing, "Encoded event");
}

/// `name | stage (Women Elite, Men Elite)`.
pub fn summary(race: &RaceRecord) -> String {
    let mut summary = race.name.clone();
    if let Some(stage) = &race.stage {
        summary.push_str(" | ");
        summary.push_str(stage);
    }
    if !race.categories.is_empty() {
        summary.push_str(" (");
        summary.push_str(&race.category_display_names().join(", "));
        summary.push(')');
    }
    summary
}

/// Description lines for fields that are present, in display order.
pub fn description_lines(race: &RaceRecord) -> Vec<String> {
    let mut lines = Vec::new();

    if !race.country.is_empty() {
        lines.push(format!("Country: {}", race.country));
    }
    if !race.categories.is_empty() {
        lines.push(format!(
            "Categories: {}",
            race.category_display_names().join(", ")
        ));
    }
    if let Some(stream_type) = race.stream_type {
        lines.push(format!("Stream: {stream_type}"));
    }
    if let Some(language) = &race.stream_language {
        lines.push(format!("Commentary: {language}"));
    }
    if let Some(duration) = &race.duration {
        lines.push(format!("Duration: {duration}"));
    }

    if !race.times.is_empty() {
        lines.push("Time slots:".to_owned());
        for slot in &race.times {
            let mut line = String::from("  ");
            if !slot.category.is_empty() {
                line.push_str(&slot.category);
                line.push_str(": ");
            }
            line.push_str(&slot.clock_time);
            if !slot.duration.is_empty() {
                line.push_str(&format!(" ({})", slot.duration));
            }
            lines.push(line);
        }
    }

    if let Some(notes) = &race.notes {
        lines.push(format!("Note: {notes}"));
    }

    if !race.stream_links.is_empty() {
        lines.push("Stream links:".to_owned());
        lines.extend(race.stream_links.iter().map(|link| format!("  - {link}")));
    }
    if let Some(link) = race.info_link() {
        lines.push(format!("More info: {link}"));
    }

    lines
}

/// Escaped description lines joined with a literal `\n`.
pub fn description(race: &RaceRecord) -> String {
    description_lines(race)
        .iter()
        .map(|line| escape_text(line))
        .collect::<Vec<_>>()
        .join("\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::{StreamType, TimeSlot};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> RaceRecord {
        RaceRecord {
            name: "Volta ao Algarve".into(),
            stage: Some("stage 1 (of 5)".into()),
            start_date: Some(ymd(2026, 2, 18)),
            end_date: Some(ymd(2026, 2, 18)),
            times: vec![
                TimeSlot {
                    category: "ME".into(),
                    clock_time: "13:30:00 UTC".into(),
                    duration: "90 mins".into(),
                },
                TimeSlot {
                    category: String::new(),
                    clock_time: "15:30:00 UTC".into(),
                    duration: String::new(),
                },
            ],
            duration: Some("90 mins".into()),
            country: "PT".into(),
            categories: vec!["ME".into(), "Elite".into()],
            stream_type: Some(StreamType::Live),
            stream_links: vec![
                "https://cyclingtiz.live/stream/algarve".into(),
                "https://www.voltaaoalgarve.com".into(),
            ],
            stream_language: Some("Portuguese".into()),
            notes: Some("flat; windy".into()),
            ..Default::default()
        }
    }

    #[test]
    fn summary_uses_display_names() {
        assert_eq!(
            summary(&sample()),
            "Volta ao Algarve | stage 1 (of 5) (Men Elite, Elite)"
        );
        let bare = RaceRecord {
            name: "Paris-Roubaix".into(),
            ..Default::default()
        };
        assert_eq!(summary(&bare), "Paris-Roubaix");
    }

    #[test]
    fn description_lists_present_fields() {
        assert_eq!(
            description_lines(&sample()),
            vec![
                "Country: PT",
                "Categories: Men Elite, Elite",
                "Stream: LIVE",
                "Commentary: Portuguese",
                "Duration: 90 mins",
                "Time slots:",
                "  ME: 13:30:00 UTC (90 mins)",
                "  15:30:00 UTC",
                "Note: flat; windy",
                "Stream links:",
                "  - https://cyclingtiz.live/stream/algarve",
                "  - https://www.voltaaoalgarve.com",
                "More info: https://www.voltaaoalgarve.com",
            ]
        );
        assert!(description_lines(&RaceRecord::default()).is_empty());
    }

    #[test]
    fn description_is_escaped_and_joined() {
        let race = RaceRecord {
            country: "BE".into(),
            categories: vec!["WE".into(), "ME".into()],
            ..Default::default()
        };
        assert_eq!(
            description(&race),
            r"Country: BE\nCategories: Women Elite\, Men Elite"
        );
    }

    #[test]
    fn timed_event() {
        let ics = encode_calendar(&[sample()], "Road");
        assert!(ics.contains("DTSTART:20260218T133000Z\r\n"));
        assert!(ics.contains("DTEND:20260218T150000Z\r\n"));
        assert!(ics.contains("UID:Volta ao Algarvestage 1 (of 5)\r\n"));
        assert!(ics.contains("URL:https://cyclingtiz.live/stream/algarve\r\n"));
        assert!(ics.contains("DESCRIPTION:Country: PT\\nCategories"));
    }

    #[test]
    fn header_and_footer() {
        let ics = encode_calendar(&[], "Cycling Calendar");
        assert_eq!(
            ics,
            "BEGIN:VCALENDAR\r\n\
             VERSION:2.0\r\n\
             PRODID:-//cycling-calendar//Cycling Calendar//EN\r\n\
             NAME:Cycling Calendar\r\n\
             X-WR-CALNAME:Cycling Calendar\r\n\
             DESCRIPTION:Cycling Calendar: Cycling Calendar\r\n\
             X-WR-CALDESC:Cycling Calendar: Cycling Calendar\r\n\
             REFRESH-INTERVAL;VALUE=DURATION:PT1H\r\n\
             END:VCALENDAR\r\n"
        );
    }

    #[test]
    fn all_day_without_end_repeats_start() {
        let race = RaceRecord {
            name: "Strade Bianche".into(),
            start_date: Some(ymd(2026, 3, 7)),
            all_day: true,
            ..Default::default()
        };
        let ics = encode_calendar(&[race], "Cycling Calendar");
        assert!(ics.contains("DTSTART;VALUE=DATE:20260307\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20260307\r\n"));
    }

    #[test]
    fn bad_clock_drops_only_that_event() {
        let mut broken = sample();
        broken.name = "Broken".into();
        broken.times[0].clock_time = "later UTC".into();

        let ics = encode_calendar(&[broken, sample()], "Cycling Calendar");
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(!ics.contains("Broken"));
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn every_physical_line_fits() {
        let ics = encode_calendar(&[sample()], "Cycling Calendar");
        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "line too long: {line:?}");
        }
    }
}
