//! Response envelopes
//!
//! The wire shapes consumed by the (out-of-scope) HTTP layer. Pagination
//! URLs are rebuilt from the canonical sorted parameters, so identical
//! requests produce byte-identical envelopes.

use serde::{Deserialize, Serialize};

use relist_domain::Listing;

use crate::facets::Buckets;
use crate::plan::SearchRequest;

/// Paged search result envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Listing>,
    pub page: usize,
    pub limit: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl SearchResponse {
    /// Assemble the envelope around reconciled records. `total` is the
    /// strategy's count and is reported as-is even when reconciliation
    /// returned fewer records.
    pub fn build(request: &SearchRequest, results: Vec<Listing>, total: u64) -> Self {
        let page = request.page();
        let limit = request.per_page();
        let total_pages = total.div_ceil(limit as u64);

        let next = if (page as u64) * (limit as u64) < total {
            Some(page_url(request, page + 1))
        } else {
            None
        };
        let previous = if page > 1 {
            Some(page_url(request, page - 1))
        } else {
            None
        };

        Self {
            count: total,
            next,
            previous,
            results,
            page,
            limit,
            total_pages,
        }
    }
}

/// Relative URL for the same request on another page
fn page_url(request: &SearchRequest, page: usize) -> String {
    let mut pairs = request.canonical_pairs();
    pairs.retain(|(name, _)| name != "page");
    pairs.push(("page".to_string(), page.to_string()));
    pairs.sort();

    let query: Vec<String> = pairs
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect();
    format!("?{}", query.join("&"))
}

/// Autocomplete envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

/// Facet-derived summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_products: u64,
    pub conditions: Buckets,
    pub colors: Buckets,
    pub storage: Buckets,
    pub cities: Buckets,
    pub price_ranges: Buckets,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use relist_domain::Condition;

    use super::*;

    fn request(pairs: &[(&str, &str)]) -> SearchRequest {
        SearchRequest::from_params(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_envelope_totals() {
        let req = request(&[("limit", "10")]);
        let response = SearchResponse::build(&req, Vec::new(), 42);
        assert_eq!(response.count, 42);
        assert_eq!(response.total_pages, 5);
        assert_eq!(response.page, 1);
        assert_eq!(response.limit, 10);
    }

    #[test]
    fn test_first_page_has_no_previous() {
        let req = request(&[("limit", "10")]);
        let response = SearchResponse::build(&req, Vec::new(), 42);
        assert_eq!(response.previous, None);
        assert_eq!(response.next.as_deref(), Some("?limit=10&page=2"));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let req = request(&[("limit", "10"), ("page", "5")]);
        let response = SearchResponse::build(&req, Vec::new(), 42);
        assert_eq!(response.next, None);
        assert_eq!(response.previous.as_deref(), Some("?limit=10&page=4"));
    }

    #[test]
    fn test_page_urls_preserve_other_parameters() {
        let req = request(&[("search", "iphone 13"), ("limit", "10")]);
        let response = SearchResponse::build(&req, Vec::new(), 42);
        assert_eq!(
            response.next.as_deref(),
            Some("?limit=10&page=2&search=iphone%2013")
        );
    }

    #[test]
    fn test_count_untouched_by_short_results() {
        let req = request(&[]);
        let results = vec![Listing::new(1, "iPhone", 100.0, Condition::A)];
        let response = SearchResponse::build(&req, results, 7);
        assert_eq!(response.count, 7);
        assert_eq!(response.results.len(), 1);
    }

    #[test]
    fn test_serialized_field_names() {
        let req = request(&[]);
        let response = SearchResponse::build(&req, Vec::new(), 0);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("totalPages").is_some());
        assert!(json.get("count").is_some());
        assert!(json["next"].is_null());
    }
}
