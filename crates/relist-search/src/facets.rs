//! Faceted aggregation
//!
//! Facets are optional filter-UI metadata: counts of listings grouped by
//! one attribute's discrete values, scoped (not eliminated) by the caller's
//! current filters. When the primary engine is unavailable they degrade to
//! an empty map rather than erroring.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::engine::SearchEngine;
use crate::filters::FilterSpec;

/// How many city buckets an aggregation returns
pub const TOP_CITIES: usize = 20;

/// Fixed discrete price ranges: label, inclusive lower bound, exclusive
/// upper bound
pub const PRICE_BUCKETS: &[(&str, f64, Option<f64>)] = &[
    ("0-10000", 0.0, Some(10_000.0)),
    ("10000-50000", 10_000.0, Some(50_000.0)),
    ("50000-100000", 50_000.0, Some(100_000.0)),
    ("100000+", 100_000.0, None),
];

/// Ordered `(value, count)` pairs for one facet field.
///
/// Serialized as a JSON object whose entries keep this order, matching the
/// `{value: count}` response shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets(pub Vec<(String, u64)>);

impl Buckets {
    /// Build from unordered counts: descending by count, ties broken by
    /// value, which is the order terms aggregations report
    pub fn from_counts(counts: HashMap<String, u64>) -> Self {
        let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self(entries)
    }

    pub fn get(&self, value: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Buckets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, count) in &self.0 {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Buckets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BucketsVisitor;

        impl<'de> Visitor<'de> for BucketsVisitor {
            type Value = Buckets;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of facet value to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Buckets, A::Error> {
                let mut entries = Vec::new();
                while let Some((value, count)) = access.next_entry::<String, u64>()? {
                    entries.push((value, count));
                }
                Ok(Buckets(entries))
            }
        }

        deserializer.deserialize_map(BucketsVisitor)
    }
}

/// The fixed facet shape for listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetBuckets {
    pub conditions: Buckets,
    pub colors: Buckets,
    pub storage: Buckets,
    pub cities: Buckets,
    pub price_ranges: Buckets,
}

impl FacetBuckets {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.colors.is_empty()
            && self.storage.is_empty()
            && self.cities.is_empty()
            && self.price_ranges.is_empty()
    }
}

/// Facet aggregation over the primary engine, with empty-map degradation
pub struct FacetService {
    engine: Arc<dyn SearchEngine>,
}

impl FacetService {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }

    /// Aggregate facet counts scoped by `filters`. Never fails: an
    /// unavailable engine yields empty buckets.
    pub async fn get(&self, filters: &FilterSpec) -> FacetBuckets {
        match self.engine.facets(filters).await {
            Ok(buckets) => buckets,
            Err(e) => {
                warn!(error = %e, "facet aggregation degraded to empty");
                FacetBuckets::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_order_by_count_then_value() {
        let buckets = Buckets::from_counts(HashMap::from([
            ("black".to_string(), 2),
            ("white".to_string(), 5),
            ("red".to_string(), 2),
        ]));
        assert_eq!(
            buckets.0,
            vec![
                ("white".to_string(), 5),
                ("black".to_string(), 2),
                ("red".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_buckets_serialize_as_ordered_object() {
        let buckets = Buckets(vec![("A".to_string(), 3), ("B".to_string(), 1)]);
        let json = serde_json::to_string(&buckets).unwrap();
        assert_eq!(json, r#"{"A":3,"B":1}"#);
    }

    #[test]
    fn test_buckets_roundtrip() {
        let buckets = Buckets(vec![("0-10000".to_string(), 7), ("100000+".to_string(), 2)]);
        let json = serde_json::to_value(&buckets).unwrap();
        let back: Buckets = serde_json::from_value(json).unwrap();
        assert_eq!(back, buckets);
    }

    #[test]
    fn test_price_bucket_bounds_cover_all_prices() {
        // Every non-negative price lands in exactly one bucket
        for price in [0.0, 9_999.99, 10_000.0, 75_000.0, 100_000.0, 1_000_000.0] {
            let matching = PRICE_BUCKETS
                .iter()
                .filter(|(_, min, max)| price >= *min && max.map_or(true, |m| price < m))
                .count();
            assert_eq!(matching, 1, "price {}", price);
        }
    }

    #[test]
    fn test_empty_facets() {
        assert!(FacetBuckets::empty().is_empty());
    }
}
