//! Primary strategy: the secondary full-text engine

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::engine::{EngineError, SearchEngine};
use crate::plan::QueryPlan;
use crate::strategy::{SearchStrategy, StrategyError, StrategyResult};

/// Executes plans against the full-text engine. Any engine failure is
/// reported as `Unavailable` so the orchestrator can switch to the
/// fallback; it is never raised to the caller from here.
pub struct PrimaryStrategy {
    engine: Arc<dyn SearchEngine>,
}

impl PrimaryStrategy {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl SearchStrategy for PrimaryStrategy {
    async fn execute(&self, plan: &QueryPlan) -> StrategyResult {
        match self.engine.search(plan).await {
            Ok(hits) => Ok(hits),
            Err(EngineError::Unavailable { reason }) => {
                warn!(reason = %reason, "primary search strategy unavailable");
                Err(StrategyError::Unavailable { reason })
            }
        }
    }

    fn name(&self) -> &'static str {
        "primary"
    }
}
