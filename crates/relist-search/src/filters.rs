//! Filter normalization
//!
//! Raw string-keyed query parameters are parsed into a typed `FilterSpec`.
//! Each recognized parameter has exactly one filter kind with its own
//! validator; malformed values are dropped, never propagated as errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Listing attributes a filter may target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterField {
    Price,
    BatteryHealth,
    Condition,
    Color,
    Storage,
    BodyCondition,
    ScreenCondition,
    Turbo,
    City,
    CategoryName,
    PhoneModel,
    PackageContents,
    /// Internal: promoted flag, not settable through the normalizer
    Promoted,
}

impl FilterField {
    /// Field name in the full-text engine's document mapping
    pub fn engine_field(&self) -> &'static str {
        match self {
            FilterField::Price => "price",
            FilterField::BatteryHealth => "battery_health",
            FilterField::Condition => "condition",
            FilterField::Color => "color",
            FilterField::Storage => "storage",
            FilterField::BodyCondition => "body_condition",
            FilterField::ScreenCondition => "screen_condition",
            FilterField::Turbo => "turbo",
            FilterField::City => "city",
            FilterField::CategoryName => "category_name",
            FilterField::PhoneModel => "phone_model",
            FilterField::PackageContents => "package_contents",
            FilterField::Promoted => "is_top",
        }
    }
}

/// One validated constraint.
///
/// Adding a filter means adding a variant (or a mapping below), not
/// string-matching parameter names at use sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Inclusive numeric range
    Range {
        field: FilterField,
        min: f64,
        max: f64,
    },
    /// Exact-term equality
    Term { field: FilterField, value: String },
    /// Boolean equality
    Flag { field: FilterField, value: bool },
    /// Every listed value must be present (AND semantics)
    ContainsAll {
        field: FilterField,
        values: Vec<String>,
    },
    /// Substring / partial match, tolerant of normalization gaps
    Partial { field: FilterField, value: String },
}

/// Ordered, validated set of filters for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    filters: Vec<Filter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw query parameters. Unrecognized parameters are ignored;
    /// recognized parameters with malformed values are dropped silently.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut spec = FilterSpec::new();

        if let Some(range) = params.get("priceRange").and_then(|v| parse_range(v)) {
            spec.push(Filter::Range {
                field: FilterField::Price,
                min: range.0,
                max: range.1,
            });
        }
        if let Some(range) = params.get("batteryHealth").and_then(|v| parse_range(v)) {
            spec.push(Filter::Range {
                field: FilterField::BatteryHealth,
                min: range.0,
                max: range.1,
            });
        }

        for (param, field) in [
            ("condition", FilterField::Condition),
            ("color", FilterField::Color),
            ("storage", FilterField::Storage),
            ("body_condition", FilterField::BodyCondition),
            ("screen_condition", FilterField::ScreenCondition),
        ] {
            if let Some(value) = non_empty(params.get(param)) {
                // Value-set validation is upstream's job; unknown values
                // simply match nothing downstream
                spec.push(Filter::Term {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if let Some(value) = non_empty(params.get("turbo")) {
            spec.push(Filter::Flag {
                field: FilterField::Turbo,
                value: value.eq_ignore_ascii_case("true"),
            });
        }

        if let Some(value) = non_empty(params.get("city")) {
            spec.push(Filter::Partial {
                field: FilterField::City,
                value: normalize_city(value),
            });
        }
        if let Some(value) = non_empty(params.get("category")) {
            spec.push(Filter::Partial {
                field: FilterField::CategoryName,
                value: value.to_string(),
            });
        }
        if let Some(value) = non_empty(params.get("phone_model")) {
            spec.push(Filter::Partial {
                field: FilterField::PhoneModel,
                value: value.to_string(),
            });
        }

        // Package contents arrive under the modern name or the legacy
        // Russian parameter
        let raw_tags = non_empty(params.get("package_contents"))
            .or_else(|| non_empty(params.get("комплектация")));
        if let Some(raw) = raw_tags {
            let values: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect();
            if !values.is_empty() {
                spec.push(Filter::ContainsAll {
                    field: FilterField::PackageContents,
                    values,
                });
            }
        }

        spec
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Parse a "min,max" range. Rejects anything but exactly two numeric parts
/// with min <= max.
fn parse_range(raw: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return None;
    }
    let min: f64 = parts[0].trim().parse().ok()?;
    let max: f64 = parts[1].trim().parse().ok()?;
    if min > max {
        return None;
    }
    Some((min, max))
}

/// Canonical names for well-known cities, keyed by lowercase alias
const CITY_ALIASES: &[(&str, &str)] = &[
    ("москва", "Москва"),
    ("moscow", "Москва"),
    ("санкт-петербург", "Санкт-Петербург"),
    ("спб", "Санкт-Петербург"),
    ("spb", "Санкт-Петербург"),
    ("st-petersburg", "Санкт-Петербург"),
    ("новосибирск", "Новосибирск"),
    ("novosibirsk", "Новосибирск"),
    ("екатеринбург", "Екатеринбург"),
    ("ekaterinburg", "Екатеринбург"),
    ("казань", "Казань"),
    ("kazan", "Казань"),
    ("нижний новгород", "Нижний Новгород"),
    ("nizhny novgorod", "Нижний Новгород"),
    ("челябинск", "Челябинск"),
    ("chelyabinsk", "Челябинск"),
];

/// Normalize a free-text city name: trim, map known aliases to their
/// canonical form, otherwise title-case each word.
pub fn normalize_city(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    if let Some((_, canonical)) = CITY_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return (*canonical).to_string();
    }
    trimmed
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
