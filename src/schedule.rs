//! Legacy start/finish schedule: a tab-separated table, one race per row.
//!
//! Columns are `date (DD/MM)`, an unused column, `title | stage`, start time
//! and end time (`HH:MM`). Rows whose start column is `-` have no schedule
//! yet and are skipped, as are rows that cannot be read.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::race::{RaceRecord, TimeSlot};

const UNSCHEDULED: &str = "-";

/// Parse the whole table, placing every `DD/MM` date in `year`.
pub fn parse_schedule(table: &str, year: i32) -> Vec<RaceRecord> {
    let races: Vec<RaceRecord> = table
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_row(line, year))
        .collect();

    info!(races = races.len(), "Parsed schedule table");
    races
}

fn parse_row(line: &str, year: i32) -> Option<RaceRecord> {
    let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
    let [date, _, title, start, rest @ ..] = columns.as_slice() else {
        debug!(line, "Schedule row has too few columns");
        return None;
    };

    if *start == UNSCHEDULED {
        return None;
    }

    let Some(date) = parse_day_month(date, year) else {
        debug!(line, "Unreadable schedule date");
        return None;
    };
    let Ok(start) = NaiveTime::parse_from_str(start, "%H:%M") else {
        debug!(line, "Unreadable schedule start time");
        return None;
    };
    let end = rest
        .first()
        .and_then(|end| NaiveTime::parse_from_str(end, "%H:%M").ok());

    let (name, stage) = match title.split_once('|') {
        Some((name, stage)) => (name.trim(), Some(stage.trim()).filter(|s| !s.is_empty())),
        None => (title.trim(), None),
    };
    if name.is_empty() {
        return None;
    }

    let duration = end.map(|end| format!("{} mins", minutes_between(start, end)));

    Some(RaceRecord {
        name: name.to_owned(),
        stage: stage.map(str::to_owned),
        start_date: Some(date),
        end_date: Some(date),
        all_day: false,
        times: vec![TimeSlot {
            category: String::new(),
            clock_time: format!("{} UTC", start.format("%H:%M:%S")),
            duration: duration.clone().unwrap_or_default(),
        }],
        duration,
        ..Default::default()
    })
}

/// "05/07" → 5 July of `year`.
fn parse_day_month(value: &str, year: i32) -> Option<NaiveDate> {
    let (day, month) = value.split_once('/')?;
    NaiveDate::from_ymd_opt(year, month.trim().parse().ok()?, day.trim().parse().ok()?)
}

/// Minutes from `start` to `end`, wrapping past midnight.
fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    let minutes = (end - start).num_minutes();
    if minutes < 0 { minutes + 24 * 60 } else { minutes }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "05/07\t2.UWT\tTour de France | Stage 1\t13:40\t17:55\n\
                         06/07\t2.UWT\tTour de France | Stage 2\t-\t-\n\
                         \n\
                         12/07\t1.Pro\tGP Lugano\t22:30\t01:00\n\
                         Date\tClass\tRace\tStart\tFinish\n\
                         13/07\t1.1\tCircuit Cycliste | \t10:00\n";

    #[test]
    fn parses_rows_and_skips_unscheduled() {
        let races = parse_schedule(TABLE, 2025);
        assert_eq!(races.len(), 3);

        let first = &races[0];
        assert_eq!(first.name, "Tour de France");
        assert_eq!(first.stage.as_deref(), Some("Stage 1"));
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2025, 7, 5));
        assert_eq!(first.times[0].clock_time, "13:40:00 UTC");
        assert_eq!(first.duration.as_deref(), Some("255 mins"));
        assert!(!first.all_day);
    }

    #[test]
    fn duration_wraps_midnight() {
        let races = parse_schedule(TABLE, 2025);
        assert_eq!(races[1].name, "GP Lugano");
        assert_eq!(races[1].stage, None);
        assert_eq!(races[1].duration.as_deref(), Some("150 mins"));
    }

    #[test]
    fn missing_end_leaves_duration_empty() {
        let races = parse_schedule(TABLE, 2025);
        assert_eq!(races[2].name, "Circuit Cycliste");
        assert_eq!(races[2].stage, None);
        assert_eq!(races[2].duration, None);
        assert_eq!(races[2].times[0].duration, "");
    }

    #[test]
    fn invalid_dates_are_skipped() {
        assert!(parse_schedule("31/02\t-\tRace\t10:00\t12:00", 2025).is_empty());
        assert!(parse_schedule("only\tthree\tcolumns", 2025).is_empty());
    }
}
