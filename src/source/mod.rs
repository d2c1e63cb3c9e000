//! Upstream listing sources: fetching raw documents and caching the races
//! parsed from them.

pub mod cache;
pub mod client;
pub mod errors;

pub use cache::RaceCache;
pub use client::SourceClient;
pub use errors::{FetchError, SourceError};

use async_trait::async_trait;
use std::fmt;

/// Which upstream listing a document or cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SourceKind {
    /// Tiz cycling HTML listing.
    Tiz,
    /// Legacy tab-separated start/finish schedule.
    Schedule,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tiz => "tiz",
            Self::Schedule => "schedule",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can hand back the raw upstream document for a source.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, kind: SourceKind) -> Result<String, FetchError>;
}
