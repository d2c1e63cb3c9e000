//! Error types for listing extraction.

/// Failures that abort a whole extraction pass.
///
/// Per-entry problems never surface here; those entries are skipped.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("listing contains no list items")]
    NoListItems,
}
