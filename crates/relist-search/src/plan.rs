//! Query planning
//!
//! A `QueryPlan` is the engine-neutral form of one search request: free
//! text, validated filters, a whitelisted sort and a capped page window.
//! Plans never reference a specific backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use relist_domain::Sort;

use crate::filters::FilterSpec;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Free-text match fields with their relative weights, highest first
pub const TEXT_FIELDS: &[(&str, f32)] = &[
    ("title", 3.0),
    ("phone_model", 2.0),
    ("description", 2.0),
    ("category_name", 1.0),
];

/// One incoming search request, as raw string parameters.
///
/// Keeps the parameter map around so cache keys and pagination URLs can be
/// derived from a canonical (sorted) rendering of the same inputs.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    params: HashMap<String, String>,
}

impl SearchRequest {
    pub fn from_params(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    pub fn text(&self) -> Option<&str> {
        self.params
            .get("search")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn page(&self) -> usize {
        self.params
            .get("page")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    pub fn per_page(&self) -> usize {
        self.params
            .get("limit")
            .or_else(|| self.params.get("page_size"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    pub fn ordering(&self) -> Option<&str> {
        self.params
            .get("ordering")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Parameters as sorted `(name, value)` pairs with empty values
    /// dropped. Two requests with the same parameters in any order render
    /// identically, which is what cache-key determinism rests on.
    pub fn canonical_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();
        pairs.sort();
        pairs
    }
}

/// Pagination window with a precomputed offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: usize,
    pub per_page: usize,
}

impl PageWindow {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}

/// Immutable, engine-neutral representation of one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub text: Option<String>,
    pub filters: FilterSpec,
    pub sort: Sort,
    pub window: PageWindow,
}

impl QueryPlan {
    /// Build a plan from a request: normalize filters, validate the sort
    /// against the whitelist, cap the page window. The active-only
    /// constraint is implicit in every plan and applied by both backends.
    pub fn build(request: &SearchRequest) -> Self {
        let sort = request
            .ordering()
            .map(Sort::parse)
            .unwrap_or(Sort::PromotedRecency);

        Self {
            text: request.text().map(str::to_string),
            filters: FilterSpec::from_params(request.params()),
            sort,
            window: PageWindow::new(request.page(), request.per_page()),
        }
    }

    /// Plan for a fixed internal query (not caller-driven), e.g. the
    /// promoted-listings feed
    pub fn internal(filters: FilterSpec, sort: Sort, window: PageWindow) -> Self {
        Self {
            text: None,
            filters,
            sort,
            window,
        }
    }
}

#[cfg(test)]
mod tests {
    use relist_domain::{SortKey, SortOrder};

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
    fn test_build_with_defaults() {
        let plan = QueryPlan::build(&request(&[]));
        assert_eq!(plan.text, None);
        assert!(plan.filters.is_empty());
        assert_eq!(plan.sort, Sort::PromotedRecency);
        assert_eq!(plan.window, PageWindow::new(1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_page_size_is_capped() {
        let plan = QueryPlan::build(&request(&[("limit", "5000")]));
        assert_eq!(plan.window.per_page, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_size_alias() {
        let plan = QueryPlan::build(&request(&[("page_size", "50")]));
        assert_eq!(plan.window.per_page, 50);
    }

    #[test]
    fn test_malformed_page_falls_back_to_one() {
        for raw in ["0", "-3", "abc", ""] {
            let plan = QueryPlan::build(&request(&[("page", raw)]));
            assert_eq!(plan.window.page, 1, "page {:?}", raw);
        }
    }

    #[test]
    fn test_offset_computation() {
        let plan = QueryPlan::build(&request(&[("page", "3"), ("limit", "20")]));
        assert_eq!(plan.window.offset(), 40);
    }

    #[test]
    fn test_whitelisted_ordering() {
        let plan = QueryPlan::build(&request(&[("ordering", "-price")]));
        assert_eq!(
            plan.sort,
            Sort::ByField {
                key: SortKey::Price,
                order: SortOrder::Desc
            }
        );
    }

    #[test]
    fn test_unknown_ordering_replaced_with_default() {
        let plan = QueryPlan::build(&request(&[("ordering", "seller_id")]));
        assert_eq!(plan.sort, Sort::PromotedRecency);
    }

    #[test]
    fn test_canonical_pairs_sorted_and_cleaned() {
        let req = request(&[("search", "iphone"), ("color", ""), ("page", "2")]);
        assert_eq!(
            req.canonical_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "iphone".to_string()),
            ]
        );
    }
}
