//! # Relist Cache
//!
//! Cache store client for the Relist search core.
//!
//! ## Features
//!
//! - **Namespaced TTL policy**: every cache namespace carries a fixed
//!   time-to-live from a static table
//! - **Deterministic keys**: identical inputs always derive the same key,
//!   regardless of keyword-argument order
//! - **Bulk invalidation**: delete-by-exact-key and delete-by-namespace
//! - **Failure isolation**: backend errors degrade to misses, never to
//!   request failures
//! - **Metrics**: hit/miss/store/invalidation counters
//! - **Warm-up**: proactive population of the hottest namespaces

pub mod error;
pub mod key;
pub mod metrics;
pub mod service;
pub mod storage;
pub mod warm;

pub use error::CacheError;
pub use key::{CacheKey, Namespace};
pub use metrics::{CacheMetrics, CacheStats};
pub use service::CacheService;
pub use storage::{CacheEntry, CacheStorage, MemoryStorage};
pub use warm::{BasicStats, CacheWarmer};

/// Re-export commonly used Result type
pub type Result<T> = std::result::Result<T, CacheError>;
