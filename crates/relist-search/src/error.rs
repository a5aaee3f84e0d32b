//! Search pipeline errors

use thiserror::Error;

use relist_domain::DomainError;

/// Errors the orchestrator can surface to its caller.
///
/// Engine degradation is handled internally and never reaches this type;
/// the only fatal path is both strategies failing, or the authoritative
/// store failing during reconciliation.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search backends unavailable: {reason}")]
    Unavailable { reason: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type SearchResult<T> = Result<T, SearchError>;
