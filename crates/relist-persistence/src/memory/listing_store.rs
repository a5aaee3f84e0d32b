//! In-Memory Listing Store Implementation
//!
//! Memory backend for tests and development

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use relist_domain::{
    Category, DomainResult, Listing, ListingId, ListingStore, Sort, SortKey, SortOrder, StoreField,
    StorePage, StorePredicate, StoreQuery,
};

/// Thread-safe in-memory implementation of `ListingStore`.
///
/// Evaluates `StoreQuery` with the semantics a relational backend provides:
/// ANDed predicates, case-insensitive LIKE, whitelist sorting and
/// offset/limit pagination.
#[derive(Default)]
pub struct InMemoryListingStore {
    listings: Arc<RwLock<HashMap<ListingId, Listing>>>,
    categories: Arc<RwLock<Vec<Category>>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial listings (useful for testing)
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        let map: HashMap<ListingId, Listing> =
            listings.into_iter().map(|l| (l.id, l)).collect();
        Self {
            listings: Arc::new(RwLock::new(map)),
            categories: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        *self.categories.write() = categories;
        self
    }

    pub fn insert(&self, listing: Listing) {
        self.listings.write().insert(listing.id, listing);
    }

    pub fn remove(&self, id: ListingId) -> Option<Listing> {
        self.listings.write().remove(&id)
    }

    /// Get the current count of listings (for testing)
    pub fn count(&self) -> usize {
        self.listings.read().len()
    }

    /// Clear all listings (for testing)
    pub fn clear(&self) {
        self.listings.write().clear();
    }
}

fn text_field(listing: &Listing, field: StoreField) -> Option<&str> {
    match field {
        StoreField::Title => Some(listing.title.as_str()),
        StoreField::Description => Some(listing.description.as_str()),
        StoreField::PhoneModel => Some(listing.phone_model.as_str()),
        StoreField::Condition => Some(listing.condition.as_str()),
        StoreField::Color => Some(listing.color.as_str()),
        StoreField::Storage => Some(listing.storage.as_str()),
        StoreField::BodyCondition => Some(listing.body_condition.as_str()),
        StoreField::ScreenCondition => Some(listing.screen_condition.as_str()),
        StoreField::City => Some(listing.city.as_str()),
        StoreField::CategoryName => Some(listing.category_name.as_str()),
        _ => None,
    }
}

fn numeric_field(listing: &Listing, field: StoreField) -> Option<f64> {
    match field {
        StoreField::Price => Some(listing.price),
        StoreField::BatteryHealth => Some(f64::from(listing.battery_health)),
        StoreField::Rating => Some(listing.rating),
        _ => None,
    }
}

fn bool_field(listing: &Listing, field: StoreField) -> Option<bool> {
    match field {
        StoreField::Turbo => Some(listing.turbo),
        StoreField::IsActive => Some(listing.is_active),
        StoreField::IsTop => Some(listing.is_top),
        _ => None,
    }
}

fn matches(listing: &Listing, predicate: &StorePredicate) -> bool {
    match predicate {
        StorePredicate::Eq { field, value } => {
            text_field(listing, *field).is_some_and(|v| v == value)
        }
        StorePredicate::EqBool { field, value } => {
            bool_field(listing, *field).is_some_and(|v| v == *value)
        }
        StorePredicate::Range { field, min, max } => {
            numeric_field(listing, *field).is_some_and(|v| v >= *min && v <= *max)
        }
        StorePredicate::HasTag { value } => {
            listing.package_contents.iter().any(|tag| tag == value)
        }
        StorePredicate::Like { field, needle } => text_field(listing, *field)
            .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase())),
        StorePredicate::AnyLike { fields, needle } => {
            let needle = needle.to_lowercase();
            fields.iter().any(|field| {
                text_field(listing, *field).is_some_and(|v| v.to_lowercase().contains(&needle))
            })
        }
    }
}

fn compare_by_key(a: &Listing, b: &Listing, key: SortKey) -> Ordering {
    match key {
        SortKey::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::BatteryHealth => a.battery_health.cmp(&b.battery_health),
        SortKey::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
        SortKey::Title => a.title.cmp(&b.title),
    }
}

fn sort_listings(listings: &mut [&Listing], sort: Sort) {
    match sort {
        Sort::PromotedRecency => {
            listings.sort_by(|a, b| {
                b.is_top
                    .cmp(&a.is_top)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            });
        }
        Sort::ByField { key, order } => {
            listings.sort_by(|a, b| {
                let ordering = compare_by_key(a, b, key);
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn fetch_by_ids(&self, ids: &[ListingId]) -> DomainResult<Vec<Listing>> {
        let listings = self.listings.read();
        Ok(ids
            .iter()
            .filter_map(|id| listings.get(id).cloned())
            .collect())
    }

    async fn query(&self, query: &StoreQuery) -> DomainResult<StorePage> {
        let listings = self.listings.read();
        let mut matched: Vec<&Listing> = listings
            .values()
            .filter(|l| query.predicates.iter().all(|p| matches(l, p)))
            .collect();

        let total = matched.len() as u64;
        sort_listings(&mut matched, query.sort);

        let ids = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|l| l.id)
            .collect();

        Ok(StorePage { ids, total })
    }

    async fn count_active(&self) -> DomainResult<u64> {
        let listings = self.listings.read();
        Ok(listings.values().filter(|l| l.is_active).count() as u64)
    }

    async fn top_listings(&self, limit: usize) -> DomainResult<Vec<Listing>> {
        let listings = self.listings.read();
        let mut top: Vec<&Listing> = listings
            .values()
            .filter(|l| l.is_active && l.is_top)
            .collect();
        top.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
        Ok(top.into_iter().take(limit).cloned().collect())
    }

    async fn categories(&self) -> DomainResult<Vec<Category>> {
        Ok(self.categories.read().clone())
    }
}
