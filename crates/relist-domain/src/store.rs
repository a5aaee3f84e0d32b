//! Authoritative store port
//!
//! `ListingStore` is the read-side interface to the relational store. The
//! query shape is engine-neutral but restricted to operations any relational
//! backend can express directly: equality, inclusive ranges, tag
//! containment and case-insensitive substring matching.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{Category, Listing};
use crate::errors::DomainResult;
use crate::value_objects::{ListingId, Sort};

/// Fields a store predicate may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreField {
    Title,
    Description,
    PhoneModel,
    Price,
    Condition,
    Color,
    Storage,
    BodyCondition,
    ScreenCondition,
    BatteryHealth,
    Turbo,
    City,
    CategoryName,
    IsActive,
    IsTop,
    Rating,
}

/// A single relational predicate; all predicates on a query are ANDed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StorePredicate {
    /// Exact string equality
    Eq { field: StoreField, value: String },
    /// Boolean equality
    EqBool { field: StoreField, value: bool },
    /// Inclusive numeric range
    Range {
        field: StoreField,
        min: f64,
        max: f64,
    },
    /// The package-contents array contains the tag
    HasTag { value: String },
    /// Case-insensitive substring match on one field
    Like { field: StoreField, needle: String },
    /// Case-insensitive substring match on any of the fields (OR)
    AnyLike {
        fields: Vec<StoreField>,
        needle: String,
    },
}

/// A complete relational query: predicates, sort and a page window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreQuery {
    pub predicates: Vec<StorePredicate>,
    pub sort: Sort,
    pub offset: usize,
    pub limit: usize,
}

impl StoreQuery {
    pub fn new(sort: Sort, offset: usize, limit: usize) -> Self {
        Self {
            predicates: Vec::new(),
            sort,
            offset,
            limit,
        }
    }

    pub fn push(&mut self, predicate: StorePredicate) {
        self.predicates.push(predicate);
    }
}

/// One page of matching ids plus the total match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePage {
    pub ids: Vec<ListingId>,
    pub total: u64,
}

/// Read-side port over the authoritative relational store
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Bulk-fetch records by id; order of the result is the store's own and
    /// carries no meaning
    async fn fetch_by_ids(&self, ids: &[ListingId]) -> DomainResult<Vec<Listing>>;

    /// Execute a relational query, returning one page of ids in query order
    /// plus the total match count
    async fn query(&self, query: &StoreQuery) -> DomainResult<StorePage>;

    /// Number of active listings
    async fn count_active(&self) -> DomainResult<u64>;

    /// Active promoted listings, rating-descending, up to `limit`
    async fn top_listings(&self, limit: usize) -> DomainResult<Vec<Listing>>;

    /// All categories
    async fn categories(&self) -> DomainResult<Vec<Category>>;
}
