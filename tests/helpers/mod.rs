//! Shared builders for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use cycling_calendar::race::{RaceRecord, TimeSlot};
use cycling_calendar::source::{DocumentSource, FetchError, SourceKind};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wrap raw `<li>` bodies in a listing document.
pub fn listing(items: &[&str]) -> String {
    let mut html = String::from("<html><body><div class=\"races\"><ul>");
    for item in items {
        html.push_str("<li>");
        html.push_str(item);
        html.push_str("</li>");
    }
    html.push_str("</ul></div></body></html>");
    html
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// "Friday 6th February", as the listing writes dates.
pub fn listing_date(date: NaiveDate) -> String {
    format!(
        "{} {}{} {}",
        date.format("%A"),
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%B")
    )
}

/// One listing entry announcing a single tagged slot at 12.40 UTC.
pub fn entry(date: NaiveDate, duration: &str, category: &str, name: &str) -> String {
    format!(
        r#"<img src="https://tiz-cycling.io/flags/B_be.png"> {} - {name} ({category}) - {category} 12.40 UTC ({duration}) - LIVE - <a href="//cyclingtiz.live/stream/{}">Link</a>"#,
        listing_date(date),
        name.to_lowercase().replace(' ', "-"),
    )
}

pub fn timed_race(name: &str, date: NaiveDate, clock: &str, duration: &str) -> RaceRecord {
    RaceRecord {
        name: name.to_owned(),
        start_date: Some(date),
        end_date: Some(date),
        times: vec![TimeSlot {
            category: "WE".to_owned(),
            clock_time: clock.to_owned(),
            duration: duration.to_owned(),
        }],
        duration: Some(duration.to_owned()),
        categories: vec!["WE".to_owned()],
        ..Default::default()
    }
}

pub fn all_day_race(name: &str, date: NaiveDate) -> RaceRecord {
    RaceRecord {
        name: name.to_owned(),
        start_date: Some(date),
        all_day: true,
        ..Default::default()
    }
}

/// Undo line folding: drop every CRLF followed by a single space.
pub fn unfold(document: &str) -> String {
    document.replace("\r\n ", "")
}

/// In-memory upstream that counts fetches.
#[derive(Default)]
pub struct FakeSource {
    documents: Mutex<HashMap<SourceKind, Result<String, StatusCode>>>,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, kind: SourceKind, document: impl Into<String>) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(kind, Ok(document.into()));
        self
    }

    pub fn with_failure(self, kind: SourceKind, status: StatusCode) -> Self {
        self.documents.lock().unwrap().insert(kind, Err(status));
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for FakeSource {
    async fn fetch(&self, kind: SourceKind) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let url = format!("https://upstream.test/{kind}");
        match self.documents.lock().unwrap().get(&kind) {
            Some(Ok(document)) => Ok(document.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url,
                status: *status,
            }),
            None => Err(FetchError::Status {
                url,
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}
