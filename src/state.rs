//! Application state shared by the web handlers.

use chrono::{Datelike, Utc};
use std::sync::Arc;

use crate::pipeline::parse_document;
use crate::race::RaceRecord;
use crate::source::{DocumentSource, RaceCache, SourceError, SourceKind};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DocumentSource>,
    pub race_cache: RaceCache,
    pub calendar_name: Arc<str>,
}

impl AppState {
    pub fn new(source: Arc<dyn DocumentSource>, race_cache: RaceCache, calendar_name: &str) -> Self {
        Self {
            source,
            race_cache,
            calendar_name: calendar_name.into(),
        }
    }

    /// Races for `kind`, served from the cache while fresh and otherwise
    /// fetched and parsed for the current UTC year.
    pub async fn races(&self, kind: SourceKind) -> Result<Arc<[RaceRecord]>, SourceError> {
        self.race_cache
            .get_or_fetch(kind, || async {
                let document = self.source.fetch(kind).await?;
                Ok::<_, SourceError>(parse_document(kind, &document, Utc::now().year())?)
            })
            .await
    }
}
