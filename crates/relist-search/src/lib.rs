//! # Relist Search
//!
//! The product search core: translates free-text and structured filter
//! queries into ranked result sets backed by two interchangeable retrieval
//! strategies, with a namespaced cache layer in front.
//!
//! ## Features
//!
//! - **Filter normalization**: raw query parameters become a typed,
//!   validated `FilterSpec`; malformed values are dropped, never surfaced
//! - **Query planning**: an engine-agnostic `QueryPlan` with whitelisted
//!   sorting and capped pagination
//! - **Dual strategies**: a full-text engine (primary) and a relational
//!   store query (fallback) behind one `SearchStrategy` interface
//! - **Reconciliation**: rank-preserving bulk fetch of authoritative
//!   records
//! - **Facets & suggestions**: aggregations and prefix completions that
//!   degrade to empty rather than erroring
//! - **Orchestration**: cache-check → strategy → reconcile → cache-store
//!   with one-shot primary→fallback switching

pub mod config;
pub mod engine;
pub mod error;
pub mod facets;
pub mod filters;
pub mod orchestrator;
pub mod plan;
pub mod reconcile;
pub mod response;
pub mod strategy;
pub mod suggest;

pub use config::{EngineConfig, SearchConfig};
pub use engine::{EngineError, EngineHits, EngineResult, SearchEngine};
pub use error::{SearchError, SearchResult};
pub use facets::{Buckets, FacetBuckets, FacetService};
pub use filters::{Filter, FilterField, FilterSpec};
pub use orchestrator::SearchOrchestrator;
pub use plan::{PageWindow, QueryPlan, SearchRequest};
pub use reconcile::Reconciler;
pub use response::{SearchResponse, StatsResponse, SuggestResponse};
pub use strategy::{FallbackStrategy, PrimaryStrategy, SearchStrategy, StrategyError};
pub use suggest::SuggestionService;
