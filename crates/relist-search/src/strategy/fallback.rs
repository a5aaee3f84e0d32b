//! Fallback strategy: direct relational query
//!
//! Re-implements the plan's boolean semantics with operations any
//! relational store provides. Free text degrades to a case-insensitive
//! substring OR across the same fields the engine matches - no fuzziness,
//! no weighting. This is an accepted precision loss, not a defect.

use std::sync::Arc;

use async_trait::async_trait;

use relist_domain::{ListingStore, StoreField, StorePredicate, StoreQuery};

use crate::engine::EngineHits;
use crate::filters::{Filter, FilterField};
use crate::plan::QueryPlan;
use crate::strategy::{SearchStrategy, StrategyResult};

/// Text fields the substring OR scans, mirroring the engine's weighted set
const TEXT_FALLBACK_FIELDS: &[StoreField] = &[
    StoreField::Title,
    StoreField::PhoneModel,
    StoreField::Description,
];

pub struct FallbackStrategy {
    store: Arc<dyn ListingStore>,
}

impl FallbackStrategy {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Translate the engine-neutral plan into relational predicates
    fn to_store_query(plan: &QueryPlan) -> StoreQuery {
        let mut query = StoreQuery::new(plan.sort, plan.window.offset(), plan.window.per_page);

        query.push(StorePredicate::EqBool {
            field: StoreField::IsActive,
            value: true,
        });

        if let Some(text) = &plan.text {
            query.push(StorePredicate::AnyLike {
                fields: TEXT_FALLBACK_FIELDS.to_vec(),
                needle: text.clone(),
            });
        }

        for filter in plan.filters.iter() {
            match filter {
                // AND semantics: one containment predicate per tag
                Filter::ContainsAll { values, .. } => {
                    for value in values {
                        query.push(StorePredicate::HasTag {
                            value: value.clone(),
                        });
                    }
                }
                other => {
                    if let Some(predicate) = Self::to_predicate(other) {
                        query.push(predicate);
                    }
                }
            }
        }

        query
    }

    fn to_predicate(filter: &Filter) -> Option<StorePredicate> {
        match filter {
            Filter::Range { field, min, max } => Some(StorePredicate::Range {
                field: Self::to_store_field(*field)?,
                min: *min,
                max: *max,
            }),
            Filter::Term { field, value } => Some(StorePredicate::Eq {
                field: Self::to_store_field(*field)?,
                value: value.clone(),
            }),
            Filter::Flag { field, value } => Some(StorePredicate::EqBool {
                field: Self::to_store_field(*field)?,
                value: *value,
            }),
            Filter::ContainsAll { .. } => None,
            Filter::Partial { field, value } => Some(StorePredicate::Like {
                field: Self::to_store_field(*field)?,
                needle: value.clone(),
            }),
        }
    }

    fn to_store_field(field: FilterField) -> Option<StoreField> {
        match field {
            FilterField::Price => Some(StoreField::Price),
            FilterField::BatteryHealth => Some(StoreField::BatteryHealth),
            FilterField::Condition => Some(StoreField::Condition),
            FilterField::Color => Some(StoreField::Color),
            FilterField::Storage => Some(StoreField::Storage),
            FilterField::BodyCondition => Some(StoreField::BodyCondition),
            FilterField::ScreenCondition => Some(StoreField::ScreenCondition),
            FilterField::Turbo => Some(StoreField::Turbo),
            FilterField::City => Some(StoreField::City),
            FilterField::CategoryName => Some(StoreField::CategoryName),
            FilterField::PhoneModel => Some(StoreField::PhoneModel),
            FilterField::Promoted => Some(StoreField::IsTop),
            FilterField::PackageContents => None,
        }
    }
}

#[async_trait]
impl SearchStrategy for FallbackStrategy {
    async fn execute(&self, plan: &QueryPlan) -> StrategyResult {
        let query = Self::to_store_query(plan);
        let page = self.store.query(&query).await?;
        Ok(EngineHits {
            ids: page.ids,
            total: page.total,
        })
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use relist_domain::{Sort, SortKey, SortOrder};

    use super::*;
    use crate::plan::SearchRequest;

    fn plan_from(pairs: &[(&str, &str)]) -> QueryPlan {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryPlan::build(&SearchRequest::from_params(params))
    }

    #[test]
    fn test_translation_always_requires_active() {
        let query = FallbackStrategy::to_store_query(&plan_from(&[]));
        assert!(query.predicates.contains(&StorePredicate::EqBool {
            field: StoreField::IsActive,
            value: true,
        }));
    }

    #[test]
    fn test_text_becomes_substring_or() {
        let query = FallbackStrategy::to_store_query(&plan_from(&[("search", "iPhone")]));
        assert!(query.predicates.iter().any(|p| matches!(
            p,
            StorePredicate::AnyLike { needle, .. } if needle == "iPhone"
        )));
    }

    #[test]
    fn test_filters_translate_directly() {
        let query = FallbackStrategy::to_store_query(&plan_from(&[
            ("priceRange", "0,50000"),
            ("condition", "A"),
            ("turbo", "true"),
            ("city", "moscow"),
        ]));
        assert!(query.predicates.contains(&StorePredicate::Range {
            field: StoreField::Price,
            min: 0.0,
            max: 50000.0,
        }));
        assert!(query.predicates.contains(&StorePredicate::Eq {
            field: StoreField::Condition,
            value: "A".to_string(),
        }));
        assert!(query.predicates.contains(&StorePredicate::EqBool {
            field: StoreField::Turbo,
            value: true,
        }));
        assert!(query.predicates.contains(&StorePredicate::Like {
            field: StoreField::City,
            needle: "Москва".to_string(),
        }));
    }

    #[test]
    fn test_every_package_tag_becomes_a_predicate() {
        let query =
            FallbackStrategy::to_store_query(&plan_from(&[("package_contents", "charger,box")]));
        let tags: Vec<&StorePredicate> = query
            .predicates
            .iter()
            .filter(|p| matches!(p, StorePredicate::HasTag { .. }))
            .collect();
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_sort_and_window_carry_over() {
        let query = FallbackStrategy::to_store_query(&plan_from(&[
            ("ordering", "-price"),
            ("page", "2"),
            ("limit", "10"),
        ]));
        assert_eq!(
            query.sort,
            Sort::ByField {
                key: SortKey::Price,
                order: SortOrder::Desc,
            }
        );
        assert_eq!(query.offset, 10);
        assert_eq!(query.limit, 10);
    }
}
