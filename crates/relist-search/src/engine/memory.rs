//! In-memory search engine
//!
//! Mirrors the HTTP engine's observable semantics over an in-process
//! listing set: fuzzy weighted free-text matching, the same filter and
//! sort behavior, terms/range facets and title/model prefix completions.
//! Used in tests and development; an availability switch simulates outage.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use parking_lot::RwLock;

use relist_domain::{Listing, ListingId, Sort, SortKey, SortOrder};

use crate::engine::{EngineError, EngineHits, EngineResult, SearchEngine};
use crate::facets::{Buckets, FacetBuckets, PRICE_BUCKETS, TOP_CITIES};
use crate::filters::{Filter, FilterField, FilterSpec};
use crate::plan::{QueryPlan, TEXT_FIELDS};

pub struct InMemorySearchEngine {
    listings: RwLock<Vec<Listing>>,
    available: AtomicBool,
}

impl InMemorySearchEngine {
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
            available: AtomicBool::new(true),
        }
    }

    /// Index or re-index one listing
    pub fn index(&self, listing: Listing) {
        let mut listings = self.listings.write();
        match listings.iter_mut().find(|l| l.id == listing.id) {
            Some(slot) => *slot = listing,
            None => listings.push(listing),
        }
    }

    pub fn remove(&self, id: ListingId) {
        self.listings.write().retain(|l| l.id != id);
    }

    /// Simulate engine outage: when unavailable every call returns
    /// `EngineError::Unavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    fn ensure_available(&self) -> EngineResult<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(EngineError::unavailable("engine marked unavailable"))
        }
    }
}

impl Default for InMemorySearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn text_field<'a>(listing: &'a Listing, name: &str) -> Option<&'a str> {
    match name {
        "title" => Some(listing.title.as_str()),
        "phone_model" => Some(listing.phone_model.as_str()),
        "description" => Some(listing.description.as_str()),
        "category_name" => Some(listing.category_name.as_str()),
        _ => None,
    }
}

/// Weighted fuzzy score across the text fields; `None` when no field
/// matches at all
fn text_score(listing: &Listing, query: &str) -> Option<f64> {
    let matcher = SkimMatcherV2::default();
    let needle = query.to_lowercase();
    let mut total = None;
    for (name, weight) in TEXT_FIELDS {
        let Some(value) = text_field(listing, name) else {
            continue;
        };
        if let Some(score) = matcher.fuzzy_match(&value.to_lowercase(), &needle) {
            *total.get_or_insert(0.0) += score as f64 * f64::from(*weight);
        }
    }
    total
}

fn filter_matches(listing: &Listing, filter: &Filter) -> bool {
    match filter {
        Filter::Range { field, min, max } => {
            let value = match field {
                FilterField::Price => listing.price,
                FilterField::BatteryHealth => f64::from(listing.battery_health),
                _ => return false,
            };
            value >= *min && value <= *max
        }
        Filter::Term { field, value } => {
            let actual = match field {
                FilterField::Condition => listing.condition.as_str(),
                FilterField::Color => listing.color.as_str(),
                FilterField::Storage => listing.storage.as_str(),
                FilterField::BodyCondition => listing.body_condition.as_str(),
                FilterField::ScreenCondition => listing.screen_condition.as_str(),
                _ => return false,
            };
            actual == value
        }
        Filter::Flag { field, value } => {
            let actual = match field {
                FilterField::Turbo => listing.turbo,
                FilterField::Promoted => listing.is_top,
                _ => return false,
            };
            actual == *value
        }
        Filter::ContainsAll { field, values } => {
            *field == FilterField::PackageContents
                && listing.contains_all_tags(values.iter().map(String::as_str))
        }
        Filter::Partial { field, value } => {
            let actual = match field {
                FilterField::City => &listing.city,
                FilterField::CategoryName => &listing.category_name,
                FilterField::PhoneModel => &listing.phone_model,
                _ => return false,
            };
            actual.to_lowercase().contains(&value.to_lowercase())
        }
    }
}

fn sort_listings(listings: &mut [&Listing], sort: Sort) {
    match sort {
        Sort::PromotedRecency => listings.sort_by(|a, b| {
            b.is_top
                .cmp(&a.is_top)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        Sort::ByField { key, order } => listings.sort_by(|a, b| {
            let ordering = match key {
                SortKey::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                SortKey::BatteryHealth => a.battery_health.cmp(&b.battery_health),
                SortKey::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
                SortKey::Title => a.title.cmp(&b.title),
            };
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }),
    }
}

fn count_values<'a, F>(listings: &[&'a Listing], extract: F) -> Buckets
where
    F: Fn(&'a Listing) -> Option<&'a str>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for listing in listings {
        if let Some(value) = extract(listing) {
            if !value.is_empty() {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
    }
    Buckets::from_counts(counts)
}

fn price_buckets(listings: &[&Listing]) -> Buckets {
    let entries = PRICE_BUCKETS
        .iter()
        .map(|(label, min, max)| {
            let count = listings
                .iter()
                .filter(|l| l.price >= *min && max.map_or(true, |m| l.price < m))
                .count() as u64;
            ((*label).to_string(), count)
        })
        .collect();
    Buckets(entries)
}

#[async_trait]
impl SearchEngine for InMemorySearchEngine {
    async fn search(&self, plan: &QueryPlan) -> EngineResult<EngineHits> {
        self.ensure_available()?;

        let listings = self.listings.read();
        let mut matched: Vec<&Listing> = listings
            .iter()
            .filter(|l| l.is_active)
            .filter(|l| plan.filters.iter().all(|f| filter_matches(l, f)))
            .filter(|l| match &plan.text {
                Some(text) => text_score(l, text).is_some(),
                None => true,
            })
            .collect();

        let total = matched.len() as u64;
        sort_listings(&mut matched, plan.sort);

        let ids = matched
            .into_iter()
            .skip(plan.window.offset())
            .take(plan.window.per_page)
            .map(|l| l.id)
            .collect();

        Ok(EngineHits { ids, total })
    }

    async fn facets(&self, filters: &FilterSpec) -> EngineResult<FacetBuckets> {
        self.ensure_available()?;

        let listings = self.listings.read();
        let scoped: Vec<&Listing> = listings
            .iter()
            .filter(|l| l.is_active)
            .filter(|l| filters.iter().all(|f| filter_matches(l, f)))
            .collect();

        let mut cities = count_values(&scoped, |l| Some(l.city.as_str()));
        cities.truncate(TOP_CITIES);

        Ok(FacetBuckets {
            conditions: count_values(&scoped, |l| Some(l.condition.as_str())),
            colors: count_values(&scoped, |l| Some(l.color.as_str())),
            storage: count_values(&scoped, |l| Some(l.storage.as_str())),
            cities,
            price_ranges: price_buckets(&scoped),
        })
    }

    async fn suggest(&self, prefix: &str, limit: usize) -> EngineResult<Vec<String>> {
        self.ensure_available()?;

        let needle = prefix.to_lowercase();
        let listings = self.listings.read();
        let mut suggestions: Vec<String> = listings
            .iter()
            .filter(|l| l.is_active)
            .flat_map(|l| [l.title.as_str(), l.phone_model.as_str()])
            .filter(|candidate| {
                !candidate.is_empty() && candidate.to_lowercase().starts_with(&needle)
            })
            .map(str::to_string)
            .collect();
        suggestions.sort();
        suggestions.dedup();
        suggestions.truncate(limit);
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as StdHashMap;

    use chrono::{Duration, Utc};
    use relist_domain::Condition;

    use super::*;
    use crate::plan::SearchRequest;

    fn plan_from(pairs: &[(&str, &str)]) -> QueryPlan {
        let params: StdHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryPlan::build(&SearchRequest::from_params(params))
    }

    fn engine() -> InMemorySearchEngine {
        let base = Utc::now();
        InMemorySearchEngine::with_listings(vec![
            Listing::new(1, "iPhone 13 Pro", 65000.0, Condition::A)
                .with_phone_model("iPhone 13 Pro")
                .with_color("black")
                .with_city("Москва")
                .with_created_at(base - Duration::days(3)),
            Listing::new(2, "iPhone 11 64GB", 30000.0, Condition::B)
                .with_phone_model("iPhone 11")
                .with_color("white")
                .with_city("Казань")
                .with_created_at(base - Duration::days(1)),
            Listing::new(3, "Galaxy S22", 48000.0, Condition::A)
                .with_phone_model("Samsung Galaxy S22")
                .with_color("black")
                .promoted()
                .with_created_at(base - Duration::days(7)),
            Listing::new(4, "iPhone SE broken", 8000.0, Condition::C)
                .inactive()
                .with_created_at(base),
        ])
    }

    #[tokio::test]
    async fn test_free_text_tolerates_case() {
        let engine = engine();
        let hits = engine
            .search(&plan_from(&[("search", "iphone")]))
            .await
            .unwrap();
        assert_eq!(hits.total, 2);
        assert!(hits.ids.contains(&ListingId::new(1)));
        assert!(hits.ids.contains(&ListingId::new(2)));
    }

    #[tokio::test]
    async fn test_inactive_listings_are_invisible() {
        let engine = engine();
        let hits = engine.search(&plan_from(&[])).await.unwrap();
        assert_eq!(hits.total, 3);
        assert!(!hits.ids.contains(&ListingId::new(4)));
    }

    #[tokio::test]
    async fn test_default_sort_promoted_then_newest() {
        let engine = engine();
        let hits = engine.search(&plan_from(&[])).await.unwrap();
        assert_eq!(
            hits.ids,
            vec![ListingId::new(3), ListingId::new(2), ListingId::new(1)]
        );
    }

    #[tokio::test]
    async fn test_filters_and_text_combine() {
        let engine = engine();
        let hits = engine
            .search(&plan_from(&[("search", "iphone"), ("priceRange", "0,50000")]))
            .await
            .unwrap();
        assert_eq!(hits.ids, vec![ListingId::new(2)]);
    }

    #[tokio::test]
    async fn test_pagination_beyond_results() {
        let engine = engine();
        let hits = engine.search(&plan_from(&[("page", "9")])).await.unwrap();
        assert!(hits.ids.is_empty());
        assert_eq!(hits.total, 3);
    }

    #[tokio::test]
    async fn test_unavailable_engine_signals() {
        let engine = engine();
        engine.set_available(false);
        let result = engine.search(&plan_from(&[])).await;
        assert!(matches!(result, Err(EngineError::Unavailable { .. })));
        assert!(engine.suggest("ip", 5).await.is_err());
    }

    #[tokio::test]
    async fn test_facets_count_scoped_listings() {
        let engine = engine();
        let facets = engine.facets(&FilterSpec::new()).await.unwrap();
        assert_eq!(facets.conditions.get("A"), Some(2));
        assert_eq!(facets.conditions.get("B"), Some(1));
        assert_eq!(facets.colors.get("black"), Some(2));
        assert_eq!(facets.price_ranges.get("10000-50000"), Some(2));
        // Inactive listing 4 is excluded everywhere
        assert_eq!(facets.conditions.get("C"), None);
    }

    #[tokio::test]
    async fn test_suggest_prefix_and_dedup() {
        let engine = engine();
        let suggestions = engine.suggest("iphone 1", 10).await.unwrap();
        assert_eq!(
            suggestions,
            vec!["iPhone 11", "iPhone 11 64GB", "iPhone 13 Pro"]
        );
    }

    #[tokio::test]
    async fn test_reindex_replaces_document() {
        let engine = engine();
        engine.index(Listing::new(1, "iPhone 13 Pro Max", 70000.0, Condition::A));
        let hits = engine
            .search(&plan_from(&[("search", "pro max")]))
            .await
            .unwrap();
        assert_eq!(hits.ids, vec![ListingId::new(1)]);
    }
}
