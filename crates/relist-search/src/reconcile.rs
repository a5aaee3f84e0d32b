//! Result reconciliation
//!
//! A strategy returns ranked ids; the authoritative records behind them
//! come from one bulk fetch, re-ordered to the strategy's rank order. Ids
//! with no backing record (deleted between index update and fetch) are
//! dropped silently; the strategy's total stays authoritative because it
//! describes index state, not reconciliation outcome.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use relist_domain::{DomainResult, Listing, ListingId, ListingStore};

pub struct Reconciler {
    store: Arc<dyn ListingStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Fetch records for `ids` and return them in exactly that order
    pub async fn reconcile(&self, ids: &[ListingId]) -> DomainResult<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.store.fetch_by_ids(ids).await?;
        let mut by_id: HashMap<ListingId, Listing> =
            records.into_iter().map(|l| (l.id, l)).collect();

        let ordered: Vec<Listing> = ids.iter().filter_map(|id| by_id.remove(id)).collect();

        if ordered.len() < ids.len() {
            warn!(
                requested = ids.len(),
                returned = ordered.len(),
                "reconciliation dropped ids with no authoritative record"
            );
        }

        Ok(ordered)
    }
}
