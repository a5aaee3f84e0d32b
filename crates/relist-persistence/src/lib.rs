//! # Relist Persistence
//!
//! Infrastructure layer providing `ListingStore` implementations for the
//! search core.
//!
//! ## Features
//!
//! - **In-Memory store**: thread-safe implementation for tests,
//!   development and the relational-fallback test fixtures
//!
//! The in-memory store evaluates the same engine-neutral `StoreQuery`
//! shape a relational backend would translate to SQL, so fallback-path
//! behavior can be exercised without a database.

pub mod memory;

pub use memory::InMemoryListingStore;
