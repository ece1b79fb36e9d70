//! Error types for the state parser.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("state is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("search-heads are tagged with several stacks: {}", .0.join(", "))]
    ConflictingStacks(Vec<String>),

    #[error("cannot build a URL for search-head {search_head}: {reason}")]
    BaseDomainUnavailable { search_head: String, reason: String },

    #[error("invalid endpoint pattern: {0}")]
    Pattern(#[from] regex::Error),
}
