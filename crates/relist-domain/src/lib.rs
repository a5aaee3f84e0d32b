//! # Relist Domain
//!
//! Core domain layer for the Relist marketplace search subsystem.
//!
//! ## Features
//!
//! - **Entities**: `Listing` and `Category`, the authoritative record shapes
//!   the search core reads
//! - **Value objects**: listing identifiers, condition grades, sort
//!   directives
//! - **Events**: write-path lifecycle events consumed by cache invalidation
//! - **Ports**: the `ListingStore` trait implemented by infrastructure

pub mod entities;
pub mod errors;
pub mod events;
pub mod store;
pub mod value_objects;

pub use entities::{Category, Listing};
pub use errors::{DomainError, DomainResult};
pub use events::ListingEvent;
pub use store::{ListingStore, StoreField, StorePage, StorePredicate, StoreQuery};
pub use value_objects::{Condition, ListingId, Sort, SortKey, SortOrder};
