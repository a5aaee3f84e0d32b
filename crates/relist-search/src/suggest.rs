//! Autocomplete suggestions

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::engine::SearchEngine;

/// Prefixes shorter than this return no suggestions
pub const MIN_PREFIX_LEN: usize = 2;
pub const DEFAULT_SUGGEST_LIMIT: usize = 5;

/// Prefix completions over the primary engine. Never fails: short
/// prefixes, empty queries and engine outages all yield an empty list.
pub struct SuggestionService {
    engine: Arc<dyn SearchEngine>,
}

impl SuggestionService {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }

    pub async fn suggest(&self, query: &str, limit: Option<usize>) -> Vec<String> {
        let prefix = query.trim();
        if prefix.chars().count() < MIN_PREFIX_LEN {
            return Vec::new();
        }
        let limit = limit.unwrap_or(DEFAULT_SUGGEST_LIMIT);

        match self.engine.suggest(prefix, limit).await {
            Ok(candidates) => {
                // Dedup while preserving the engine's order
                let mut seen = HashSet::new();
                candidates
                    .into_iter()
                    .filter(|c| seen.insert(c.clone()))
                    .take(limit)
                    .collect()
            }
            Err(e) => {
                warn!(error = %e, "suggestions degraded to empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use relist_domain::{Condition, Listing};

    use super::*;
    use crate::engine::InMemorySearchEngine;

    fn service() -> (Arc<InMemorySearchEngine>, SuggestionService) {
        let engine = Arc::new(InMemorySearchEngine::with_listings(vec![
            Listing::new(1, "iPhone 13", 55000.0, Condition::A),
            Listing::new(2, "iPhone 11", 30000.0, Condition::B),
        ]));
        let service = SuggestionService::new(engine.clone());
        (engine, service)
    }

    #[tokio::test]
    async fn test_short_prefix_yields_nothing() {
        let (_, service) = service();
        assert!(service.suggest("i", None).await.is_empty());
        assert!(service.suggest("  ", None).await.is_empty());
        assert!(service.suggest("", None).await.is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_returned_for_valid_prefix() {
        let (_, service) = service();
        let suggestions = service.suggest("iph", None).await;
        assert_eq!(suggestions, vec!["iPhone 11", "iPhone 13"]);
    }

    #[tokio::test]
    async fn test_limit_is_applied() {
        let (_, service) = service();
        let suggestions = service.suggest("iph", Some(1)).await;
        assert_eq!(suggestions.len(), 1);
    }

    #[tokio::test]
    async fn test_engine_outage_yields_empty() {
        let (engine, service) = service();
        engine.set_available(false);
        assert!(service.suggest("iph", None).await.is_empty());
    }
}
