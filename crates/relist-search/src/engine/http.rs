//! HTTP client for the secondary full-text engine
//!
//! Speaks the engine's JSON search DSL: bool queries with a weighted
//! `multi_match`, term/range/match filters, terms and range aggregations,
//! and completion suggestions. Every transport or protocol failure maps to
//! `EngineError::Unavailable`.

use std::time::Duration;

use serde_json::{json, Value};

use relist_domain::{ListingId, Sort, SortKey, SortOrder};

use crate::config::EngineConfig;
use crate::engine::{EngineError, EngineHits, EngineResult, SearchEngine};
use crate::facets::{Buckets, FacetBuckets, PRICE_BUCKETS, TOP_CITIES};
use crate::filters::{Filter, FilterSpec};
use crate::plan::{QueryPlan, TEXT_FIELDS};

pub struct HttpSearchEngine {
    client: reqwest::Client,
    base_url: String,
    index: String,
}

impl HttpSearchEngine {
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EngineError::unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
        })
    }

    async fn execute(&self, body: &Value) -> EngineResult<Value> {
        let url = format!("{}/{}/_search", self.base_url, self.index);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::unavailable(format!(
                "engine returned {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))
    }

    fn filter_clauses(filters: &FilterSpec) -> Vec<Value> {
        let mut clauses = Vec::new();
        for filter in filters.iter() {
            match filter {
                Filter::Range { field, min, max } => clauses.push(json!({
                    "range": { field.engine_field(): { "gte": min, "lte": max } }
                })),
                Filter::Term { field, value } => clauses.push(json!({
                    "term": { field.engine_field(): value }
                })),
                Filter::Flag { field, value } => clauses.push(json!({
                    "term": { field.engine_field(): value }
                })),
                Filter::ContainsAll { field, values } => {
                    // One term clause per tag: all must match
                    for value in values {
                        clauses.push(json!({
                            "term": { field.engine_field(): value }
                        }));
                    }
                }
                Filter::Partial { field, value } => clauses.push(json!({
                    "match": { field.engine_field(): value }
                })),
            }
        }
        // Inactive listings are never searchable
        clauses.push(json!({ "term": { "is_active": true } }));
        clauses
    }

    fn sort_clause(sort: Sort) -> Value {
        match sort {
            Sort::PromotedRecency => json!([
                { "is_top": { "order": "desc" } },
                { "created_at": { "order": "desc" } },
            ]),
            Sort::ByField { key, order } => {
                let field = match key {
                    // Text fields sort on their keyword sub-field
                    SortKey::Title => "title.raw",
                    other => other.as_str(),
                };
                let order = match order {
                    SortOrder::Asc => "asc",
                    SortOrder::Desc => "desc",
                };
                json!([{ field: { "order": order } }])
            }
        }
    }

    fn search_body(plan: &QueryPlan) -> Value {
        let mut must = Vec::new();
        if let Some(text) = &plan.text {
            let fields: Vec<String> = TEXT_FIELDS
                .iter()
                .map(|(name, weight)| {
                    if (*weight - 1.0).abs() < f32::EPSILON {
                        (*name).to_string()
                    } else {
                        format!("{}^{}", name, weight)
                    }
                })
                .collect();
            must.push(json!({
                "multi_match": {
                    "query": text,
                    "fields": fields,
                    "type": "best_fields",
                    "fuzziness": "AUTO",
                }
            }));
        }

        json!({
            "query": {
                "bool": {
                    "must": must,
                    "filter": Self::filter_clauses(&plan.filters),
                }
            },
            "sort": Self::sort_clause(plan.sort),
            "from": plan.window.offset(),
            "size": plan.window.per_page,
        })
    }

    fn facets_body(filters: &FilterSpec) -> Value {
        let ranges: Vec<Value> = PRICE_BUCKETS
            .iter()
            .map(|(label, min, max)| match max {
                Some(max) => json!({ "key": label, "from": min, "to": max }),
                None => json!({ "key": label, "from": min }),
            })
            .collect();

        json!({
            "size": 0,
            "query": { "bool": { "filter": Self::filter_clauses(filters) } },
            "aggs": {
                "conditions": { "terms": { "field": "condition" } },
                "colors": { "terms": { "field": "color" } },
                "storage": { "terms": { "field": "storage" } },
                "cities": { "terms": { "field": "city.raw", "size": TOP_CITIES } },
                "price_ranges": { "range": { "field": "price", "ranges": ranges } },
            }
        })
    }

    fn suggest_body(prefix: &str, limit: usize) -> Value {
        json!({
            "suggest": {
                "listing_suggest": {
                    "prefix": prefix,
                    "completion": {
                        "field": "title.suggest",
                        "size": limit,
                        "skip_duplicates": true,
                    }
                }
            }
        })
    }
}

fn malformed() -> EngineError {
    EngineError::unavailable("malformed engine response")
}

fn bucket_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_buckets(payload: &Value, name: &str) -> EngineResult<Buckets> {
    let buckets = payload["aggregations"][name]["buckets"]
        .as_array()
        .ok_or_else(malformed)?;
    let mut entries = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let key = bucket_key(&bucket["key"]).ok_or_else(malformed)?;
        let count = bucket["doc_count"].as_u64().ok_or_else(malformed)?;
        entries.push((key, count));
    }
    Ok(Buckets(entries))
}

#[async_trait::async_trait]
impl SearchEngine for HttpSearchEngine {
    async fn search(&self, plan: &QueryPlan) -> EngineResult<EngineHits> {
        let payload = self.execute(&Self::search_body(plan)).await?;

        let hits = payload["hits"]["hits"].as_array().ok_or_else(malformed)?;
        let mut ids = Vec::with_capacity(hits.len());
        for hit in hits {
            let id = match &hit["_id"] {
                Value::String(s) => ListingId::from_string(s),
                Value::Number(n) => n.as_i64().map(ListingId::new),
                _ => None,
            };
            ids.push(id.ok_or_else(malformed)?);
        }

        let total = payload["hits"]["total"]["value"]
            .as_u64()
            .or_else(|| payload["hits"]["total"].as_u64())
            .ok_or_else(malformed)?;

        Ok(EngineHits { ids, total })
    }

    async fn facets(&self, filters: &FilterSpec) -> EngineResult<FacetBuckets> {
        let payload = self.execute(&Self::facets_body(filters)).await?;
        Ok(FacetBuckets {
            conditions: parse_buckets(&payload, "conditions")?,
            colors: parse_buckets(&payload, "colors")?,
            storage: parse_buckets(&payload, "storage")?,
            cities: parse_buckets(&payload, "cities")?,
            price_ranges: parse_buckets(&payload, "price_ranges")?,
        })
    }

    async fn suggest(&self, prefix: &str, limit: usize) -> EngineResult<Vec<String>> {
        let payload = self.execute(&Self::suggest_body(prefix, limit)).await?;
        let options = payload["suggest"]["listing_suggest"][0]["options"]
            .as_array()
            .ok_or_else(malformed)?;
        let mut suggestions = Vec::with_capacity(options.len());
        for option in options {
            let text = option["text"].as_str().ok_or_else(malformed)?;
            suggestions.push(text.to_string());
        }
        Ok(suggestions)
    }
}
