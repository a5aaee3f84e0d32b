//! Proactive cache warm-up

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use relist_domain::{DomainResult, ListingStore};

use crate::key::{CacheKey, Namespace};
use crate::service::CacheService;

const WARM_TOP_LISTINGS: usize = 20;

/// Basic marketplace counters kept warm under the Stats namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicStats {
    pub total_listings: u64,
    pub top_listings: u64,
    pub total_categories: u64,
}

/// Pre-populates the hottest namespaces from the authoritative store:
/// promoted listings, the category list and basic counts.
pub struct CacheWarmer {
    cache: CacheService,
    store: Arc<dyn ListingStore>,
}

impl CacheWarmer {
    pub fn new(cache: CacheService, store: Arc<dyn ListingStore>) -> Self {
        Self { cache, store }
    }

    /// Run one warm-up pass. Store errors abort the pass; cache write
    /// failures are already absorbed by the service.
    pub async fn warm(&self) -> DomainResult<()> {
        info!("starting cache warm-up");

        let top = self.store.top_listings(WARM_TOP_LISTINGS).await?;
        let top_count = top.len() as u64;
        for listing in top {
            let key = CacheKey::derive(Namespace::Products, &[&listing.id.to_string()], &[]);
            self.cache.set(&key, &listing).await;
        }

        let categories = self.store.categories().await?;
        let category_count = categories.len() as u64;
        let key = CacheKey::derive(Namespace::Categories, &["all"], &[]);
        self.cache.set(&key, &categories).await;

        let stats = BasicStats {
            total_listings: self.store.count_active().await?,
            top_listings: top_count,
            total_categories: category_count,
        };
        let key = CacheKey::derive(Namespace::Stats, &["basic"], &[]);
        self.cache.set(&key, &stats).await;

        info!(
            top = top_count,
            categories = category_count,
            "cache warm-up completed"
        );
        Ok(())
    }

    /// Warm-up variant that only logs failures, for fire-and-forget startup
    /// hooks
    pub async fn warm_quietly(&self) {
        if let Err(e) = self.warm().await {
            warn!(error = %e, "cache warm-up failed");
        }
    }
}
