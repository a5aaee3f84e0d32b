//! Retrieval strategies
//!
//! Two interchangeable execution paths for a `QueryPlan`: the full-text
//! engine (primary) and a direct relational query (fallback). The
//! orchestrator selects between them; a strategy never retries and never
//! falls through to the other by itself.

mod fallback;
mod primary;

use async_trait::async_trait;
use thiserror::Error;

use relist_domain::DomainError;

use crate::engine::EngineHits;
use crate::plan::QueryPlan;

pub use fallback::FallbackStrategy;
pub use primary::PrimaryStrategy;

#[derive(Error, Debug)]
pub enum StrategyError {
    /// The backing engine is degraded; the orchestrator may switch
    /// strategies
    #[error("strategy unavailable: {reason}")]
    Unavailable { reason: String },

    /// The authoritative store failed; nothing left to fall back to
    #[error(transparent)]
    Store(#[from] DomainError),
}

pub type StrategyResult = Result<EngineHits, StrategyError>;

/// One execution path for a query plan
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    async fn execute(&self, plan: &QueryPlan) -> StrategyResult;

    /// Name used in logs when the orchestrator switches paths
    fn name(&self) -> &'static str;
}
