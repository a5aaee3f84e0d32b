//! Search engine port
//!
//! The secondary full-text engine behind one trait, with a production HTTP
//! implementation and an in-memory one for tests and development. Every
//! failure mode collapses into `EngineError::Unavailable` so callers can
//! switch strategies instead of branching on transport details.

mod http;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use relist_domain::ListingId;

use crate::facets::FacetBuckets;
use crate::filters::FilterSpec;
use crate::plan::QueryPlan;

pub use http::HttpSearchEngine;
pub use memory::InMemorySearchEngine;

/// The single error surface of the engine port
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("search engine unavailable: {reason}")]
    Unavailable { reason: String },
}

impl EngineError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        EngineError::Unavailable {
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Ranked ids plus the engine's total hit count.
///
/// The total describes index state; reconciliation may return fewer
/// records without changing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHits {
    pub ids: Vec<ListingId>,
    pub total: u64,
}

/// Full-text engine port
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Execute a query plan, returning ranked ids and the total hit count
    async fn search(&self, plan: &QueryPlan) -> EngineResult<EngineHits>;

    /// Aggregate facet buckets scoped by the given filters
    async fn facets(&self, filters: &FilterSpec) -> EngineResult<FacetBuckets>;

    /// Prefix completions drawn from listing titles and models
    async fn suggest(&self, prefix: &str, limit: usize) -> EngineResult<Vec<String>>;
}
