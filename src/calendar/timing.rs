//! Resolving a record's start and end into calendar timestamps.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::race::RaceRecord;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(mins?|hrs?|hours?)").unwrap());

/// Applied when a timed record has no readable duration.
pub const DEFAULT_EVENT_MINUTES: i64 = 3 * 60;

/// Start and end of one calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTiming {
    AllDay { start: NaiveDate, end: NaiveDate },
    Timed { start: DateTime<Utc>, end: DateTime<Utc> },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimingError {
    #[error("record has no start date")]
    MissingStartDate,
    #[error("timed record has no time slot")]
    MissingTimeSlot,
    #[error("unreadable clock time {0:?}")]
    InvalidClock(String),
    #[error("event end is out of range")]
    EndOutOfRange,
}

impl EventTiming {
    /// Resolve a record. All-day records end on their end date, or on the
    /// start date when none is known; timed records start at the first
    /// slot's clock time and last for the record duration.
    pub fn resolve(race: &RaceRecord) -> Result<Self, TimingError> {
        let date = race.start_date.ok_or(TimingError::MissingStartDate)?;

        if race.all_day {
            return Ok(Self::AllDay {
                start: date,
                end: race.end_date.unwrap_or(date),
            });
        }

        let slot = race.times.first().ok_or(TimingError::MissingTimeSlot)?;
        let clock = parse_clock(&slot.clock_time)
            .ok_or_else(|| TimingError::InvalidClock(slot.clock_time.clone()))?;

        let start = date.and_time(clock).and_utc();
        let end = race
            .duration
            .as_deref()
            .and_then(parse_duration_minutes)
            .and_then(TimeDelta::try_minutes)
            .and_then(|length| start.checked_add_signed(length))
            .or_else(|| {
                TimeDelta::try_minutes(DEFAULT_EVENT_MINUTES)
                    .and_then(|length| start.checked_add_signed(length))
            })
            .ok_or(TimingError::EndOutOfRange)?;

        Ok(Self::Timed { start, end })
    }
}

/// "14:00 UTC" or "14:00:00 UTC" → 14:00:00.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    let value = value.strip_suffix("UTC").unwrap_or(value).trim();

    let mut parts = value.split(':').map(|part| part.trim().parse::<u32>());
    let hour = parts.next()?.ok()?;
    let minute = parts.next()?.ok()?;
    let second = match parts.next() {
        Some(second) => second.ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Minutes in "90 mins", "2 hrs" or "3.25 hrs". Zero and lengths beyond
/// what a [`TimeDelta`] holds count as unreadable.
pub fn parse_duration_minutes(value: &str) -> Option<i64> {
    let caps = DURATION_RE.captures(value)?;
    let amount: f64 = caps[1].parse().ok()?;
    let unit = caps[2].to_ascii_lowercase();

    let minutes = if unit.starts_with('h') {
        amount * 60.0
    } else {
        amount
    };
    Some(minutes.trunc() as i64)
        .filter(|m| *m > 0)
        .filter(|m| TimeDelta::try_minutes(*m).is_some())
}
