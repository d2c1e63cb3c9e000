//! Category filtering of assembled races.

use crate::race::{RaceRecord, is_known_category};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("category {0:?} is not allowed")]
    InvalidCategory(String),
}

/// Requested category tags, checked against the whitelist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    tags: Vec<String>,
}

impl CategoryFilter {
    /// Accept the requested tags, rejecting the first one that is not
    /// whitelisted (exact, case-sensitive match).
    pub fn new<I, S>(requested: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = requested
            .into_iter()
            .map(|tag| {
                let tag: String = tag.into();
                if is_known_category(&tag) {
                    Ok(tag)
                } else {
                    Err(FilterError::InvalidCategory(tag))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tags })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// An empty filter passes everything.
    pub fn matches(&self, race: &RaceRecord) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|tag| race.has_category(tag))
    }

    pub fn apply(&self, races: &[RaceRecord]) -> Vec<RaceRecord> {
        races
            .iter()
            .filter(|race| self.matches(race))
            .cloned()
            .collect()
    }
}
