//! Search orchestration
//!
//! Composes the cache, the two retrieval strategies, the reconciler and
//! the facet/suggestion services into the request pipeline:
//!
//! cache check → primary strategy → (on unavailability) fallback →
//! reconcile → cache store → return.
//!
//! A single failed primary attempt triggers exactly one fallback attempt;
//! there are no retries in either direction. Cache writes are
//! fire-and-forget and never change the outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use relist_cache::{CacheKey, CacheService, CacheStats, CacheWarmer, Namespace};
use relist_domain::{
    DomainResult, Listing, ListingEvent, ListingId, ListingStore, Sort, SortKey, SortOrder,
};

use crate::config::SearchConfig;
use crate::engine::{EngineHits, SearchEngine};
use crate::error::{SearchError, SearchResult};
use crate::facets::{FacetBuckets, FacetService};
use crate::filters::{Filter, FilterField, FilterSpec};
use crate::plan::{PageWindow, QueryPlan, SearchRequest};
use crate::reconcile::Reconciler;
use crate::response::{SearchResponse, StatsResponse, SuggestResponse};
use crate::strategy::{FallbackStrategy, PrimaryStrategy, SearchStrategy, StrategyError};
use crate::suggest::SuggestionService;

const POPULAR_PAGE_SIZE: usize = 10;
const POPULAR_KEY: &str = "popular";

pub struct SearchOrchestrator {
    cache: CacheService,
    primary: Arc<dyn SearchStrategy>,
    fallback: Arc<dyn SearchStrategy>,
    reconciler: Reconciler,
    facet_service: FacetService,
    suggestions: SuggestionService,
    warmer: CacheWarmer,
    store: Arc<dyn ListingStore>,
    degraded_ttl: Duration,
}

impl SearchOrchestrator {
    pub fn new(
        cache: CacheService,
        engine: Arc<dyn SearchEngine>,
        store: Arc<dyn ListingStore>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            primary: Arc::new(PrimaryStrategy::new(engine.clone())),
            fallback: Arc::new(FallbackStrategy::new(store.clone())),
            reconciler: Reconciler::new(store.clone()),
            facet_service: FacetService::new(engine.clone()),
            suggestions: SuggestionService::new(engine),
            warmer: CacheWarmer::new(cache.clone(), store.clone()),
            store,
            degraded_ttl: Duration::from_secs(config.degraded_ttl_secs),
            cache,
        }
    }

    /// The main search pipeline
    pub async fn search(
        &self,
        params: HashMap<String, String>,
    ) -> SearchResult<SearchResponse> {
        let request = SearchRequest::from_params(params);
        let key = self.request_key(Namespace::Search, &request);

        if let Some(cached) = self.cache.get::<SearchResponse>(&key).await {
            return Ok(cached);
        }

        let plan = QueryPlan::build(&request);
        let (hits, degraded) = self.run_strategies(&plan).await?;
        let records = self.reconciler.reconcile(&hits.ids).await?;
        let response = SearchResponse::build(&request, records, hits.total);

        if degraded {
            self.cache
                .set_with_ttl(&key, &response, self.degraded_ttl)
                .await;
        } else {
            self.cache.set(&key, &response).await;
        }

        Ok(response)
    }

    /// Facet aggregation scoped by the request's filters. Never fails;
    /// degraded aggregations come back empty and are not cached.
    pub async fn facets(&self, params: HashMap<String, String>) -> FacetBuckets {
        let request = SearchRequest::from_params(params);
        let key = self.request_key(Namespace::Facets, &request);

        if let Some(cached) = self.cache.get::<FacetBuckets>(&key).await {
            return cached;
        }

        let filters = FilterSpec::from_params(request.params());
        let buckets = self.facet_service.get(&filters).await;
        if !buckets.is_empty() {
            self.cache.set(&key, &buckets).await;
        }
        buckets
    }

    /// Autocomplete. Never fails; empty results are not cached because a
    /// degraded engine is indistinguishable from a genuine zero-hit prefix.
    pub async fn suggest(&self, query: &str, limit: Option<usize>) -> SuggestResponse {
        let prefix = query.trim().to_lowercase();
        let limit_repr = limit.map(|l| l.to_string()).unwrap_or_default();
        let key = CacheKey::derive(
            Namespace::Suggestions,
            &[&prefix],
            &[("limit", &limit_repr)],
        );

        if let Some(cached) = self.cache.get::<SuggestResponse>(&key).await {
            return cached;
        }

        let response = SuggestResponse {
            suggestions: self.suggestions.suggest(query, limit).await,
        };
        if !response.suggestions.is_empty() {
            self.cache.set(&key, &response).await;
        }
        response
    }

    /// Promoted listings feed: rating-descending, fixed page size
    pub async fn popular(&self) -> SearchResult<Vec<Listing>> {
        let key = CacheKey::derive(Namespace::Products, &[POPULAR_KEY], &[]);
        if let Some(cached) = self.cache.get::<Vec<Listing>>(&key).await {
            return Ok(cached);
        }

        let mut filters = FilterSpec::new();
        filters.push(Filter::Flag {
            field: FilterField::Promoted,
            value: true,
        });
        let plan = QueryPlan::internal(
            filters,
            Sort::ByField {
                key: SortKey::Rating,
                order: SortOrder::Desc,
            },
            PageWindow::new(1, POPULAR_PAGE_SIZE),
        );

        let (hits, degraded) = self.run_strategies(&plan).await?;
        let records = self.reconciler.reconcile(&hits.ids).await?;
        if degraded {
            self.cache
                .set_with_ttl(&key, &records, self.degraded_ttl)
                .await;
        } else {
            self.cache.set(&key, &records).await;
        }
        Ok(records)
    }

    /// Facet-derived summary counts
    pub async fn stats(&self, params: HashMap<String, String>) -> StatsResponse {
        let request = SearchRequest::from_params(params);
        let key = self.request_key(Namespace::Stats, &request);

        if let Some(cached) = self.cache.get::<StatsResponse>(&key).await {
            return cached;
        }

        let filters = FilterSpec::from_params(request.params());
        let facets = self.facet_service.get(&filters).await;
        // Every active listing carries a condition, so the condition
        // buckets sum to the scoped total
        let response = StatsResponse {
            total_products: facets.conditions.total(),
            conditions: facets.conditions,
            colors: facets.colors,
            storage: facets.storage,
            cities: facets.cities,
            price_ranges: facets.price_ranges,
        };
        if response.total_products > 0 {
            self.cache.set(&key, &response).await;
        }
        response
    }

    /// Cached single-listing lookup under the product-detail namespace
    pub async fn listing(&self, id: ListingId) -> SearchResult<Option<Listing>> {
        let key = Self::listing_key(id);
        if let Some(cached) = self.cache.get::<Listing>(&key).await {
            return Ok(Some(cached));
        }

        let records = self.store.fetch_by_ids(&[id]).await?;
        match records.into_iter().next() {
            Some(listing) => {
                self.cache.set(&key, &listing).await;
                Ok(Some(listing))
            }
            None => Ok(None),
        }
    }

    /// Write-path hook: drop every cached value that could now be stale.
    /// The secondary engine re-index notification is the write path's
    /// responsibility, not handled here.
    pub async fn handle_listing_event(&self, event: ListingEvent) {
        let id = event.listing_id();
        self.cache.remove(&Self::listing_key(id)).await;
        self.cache
            .remove(&CacheKey::derive(Namespace::Products, &[POPULAR_KEY], &[]))
            .await;
        self.cache.invalidate_namespace(Namespace::Search).await;
        self.cache.invalidate_namespace(Namespace::Facets).await;
        self.cache.invalidate_namespace(Namespace::Stats).await;
    }

    /// Pre-populate the hottest namespaces
    pub async fn warm_cache(&self) -> DomainResult<()> {
        self.warmer.warm().await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn run_strategies(&self, plan: &QueryPlan) -> SearchResult<(EngineHits, bool)> {
        match self.primary.execute(plan).await {
            Ok(hits) => Ok((hits, false)),
            Err(StrategyError::Unavailable { reason }) => {
                warn!(
                    from = self.primary.name(),
                    to = self.fallback.name(),
                    reason = %reason,
                    "switching search strategy"
                );
                match self.fallback.execute(plan).await {
                    Ok(hits) => Ok((hits, true)),
                    Err(e) => {
                        error!(error = %e, "both search strategies failed");
                        Err(SearchError::Unavailable {
                            reason: e.to_string(),
                        })
                    }
                }
            }
            Err(StrategyError::Store(e)) => Err(SearchError::Domain(e)),
        }
    }

    fn request_key(&self, namespace: Namespace, request: &SearchRequest) -> CacheKey {
        let pairs = request.canonical_pairs();
        let kwargs: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        CacheKey::derive(namespace, &[], &kwargs)
    }

    fn listing_key(id: ListingId) -> CacheKey {
        CacheKey::derive(Namespace::Products, &[&id.to_string()], &[])
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use relist_domain::{Category, Condition, DomainError, StorePage, StoreQuery};
    use relist_persistence::InMemoryListingStore;

    use super::*;
    use crate::engine::InMemorySearchEngine;

    fn listings() -> Vec<Listing> {
        vec![
            Listing::new(1, "iPhone 13 Pro", 65000.0, Condition::A)
                .with_phone_model("iPhone 13 Pro")
                .with_rating(4.2),
            Listing::new(2, "iPhone 11", 30000.0, Condition::B)
                .with_phone_model("iPhone 11")
                .with_rating(4.8),
            Listing::new(3, "Galaxy S22", 48000.0, Condition::A)
                .with_phone_model("Samsung Galaxy S22")
                .promoted()
                .with_rating(4.5),
        ]
    }

    fn orchestrator() -> (Arc<InMemorySearchEngine>, Arc<InMemoryListingStore>, SearchOrchestrator) {
        let engine = Arc::new(InMemorySearchEngine::with_listings(listings()));
        let store = Arc::new(InMemoryListingStore::with_listings(listings()));
        let orchestrator = SearchOrchestrator::new(
            CacheService::in_memory(),
            engine.clone(),
            store.clone(),
            &SearchConfig::default(),
        );
        (engine, store, orchestrator)
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_search_happy_path() {
        let (_, _, orchestrator) = orchestrator();
        let response = orchestrator
            .search(params(&[("search", "iphone")]))
            .await
            .unwrap();
        assert_eq!(response.count, 2);
        assert_eq!(response.results.len(), 2);
    }

    #[tokio::test]
    async fn test_second_search_served_from_cache() {
        let (_, _, orchestrator) = orchestrator();
        let first = orchestrator.search(params(&[])).await.unwrap();
        let second = orchestrator.search(params(&[])).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(orchestrator.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_fallback_when_engine_down() {
        let (engine, _, orchestrator) = orchestrator();
        engine.set_available(false);
        let response = orchestrator
            .search(params(&[("search", "iPhone")]))
            .await
            .unwrap();
        assert_eq!(response.count, 2);
    }

    #[tokio::test]
    async fn test_hard_failure_when_both_paths_down() {
        struct DeadStore;

        #[async_trait]
        impl ListingStore for DeadStore {
            async fn fetch_by_ids(&self, _ids: &[ListingId]) -> DomainResult<Vec<Listing>> {
                Err(DomainError::store("connection refused"))
            }
            async fn query(&self, _query: &StoreQuery) -> DomainResult<StorePage> {
                Err(DomainError::store("connection refused"))
            }
            async fn count_active(&self) -> DomainResult<u64> {
                Err(DomainError::store("connection refused"))
            }
            async fn top_listings(&self, _limit: usize) -> DomainResult<Vec<Listing>> {
                Err(DomainError::store("connection refused"))
            }
            async fn categories(&self) -> DomainResult<Vec<Category>> {
                Err(DomainError::store("connection refused"))
            }
        }

        let engine = Arc::new(InMemorySearchEngine::new());
        engine.set_available(false);
        let orchestrator = SearchOrchestrator::new(
            CacheService::in_memory(),
            engine,
            Arc::new(DeadStore),
            &SearchConfig::default(),
        );

        let result = orchestrator.search(params(&[])).await;
        assert!(matches!(result, Err(SearchError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_facets_degrade_to_empty() {
        let (engine, _, orchestrator) = orchestrator();
        engine.set_available(false);
        let buckets = orchestrator.facets(params(&[])).await;
        assert!(buckets.is_empty());
    }

    #[tokio::test]
    async fn test_popular_returns_promoted_only() {
        let (_, _, orchestrator) = orchestrator();
        let popular = orchestrator.popular().await.unwrap();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].id, ListingId::new(3));
    }

    #[tokio::test]
    async fn test_listing_detail_cached_and_invalidated() {
        let (_, store, orchestrator) = orchestrator();
        let id = ListingId::new(1);

        let first = orchestrator.listing(id).await.unwrap().unwrap();
        assert_eq!(first.price, 65000.0);

        // Write path updates the record and fires the event
        let mut updated = first.clone();
        updated.price = 60000.0;
        store.insert(updated);
        orchestrator
            .handle_listing_event(ListingEvent::Updated(id))
            .await;

        let second = orchestrator.listing(id).await.unwrap().unwrap();
        assert_eq!(second.price, 60000.0);
    }

    #[tokio::test]
    async fn test_update_invalidates_search_namespace() {
        let (engine, store, orchestrator) = orchestrator();
        let before = orchestrator.search(params(&[])).await.unwrap();
        assert_eq!(before.count, 3);

        let extra = Listing::new(9, "iPhone 15", 90000.0, Condition::A);
        store.insert(extra.clone());
        engine.index(extra);
        orchestrator
            .handle_listing_event(ListingEvent::Created(ListingId::new(9)))
            .await;

        let after = orchestrator.search(params(&[])).await.unwrap();
        assert_eq!(after.count, 4);
    }

    #[tokio::test]
    async fn test_stats_totals_match_condition_sums() {
        let (_, _, orchestrator) = orchestrator();
        let stats = orchestrator.stats(params(&[])).await;
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.conditions.total(), 3);
    }

    #[tokio::test]
    async fn test_warm_cache_populates_products() {
        let (_, _, orchestrator) = orchestrator();
        orchestrator.warm_cache().await.unwrap();
        assert!(orchestrator.cache_stats().stores >= 2);
    }
}
