//! Value objects representing immutable domain concepts

use std::fmt;

use serde::{Deserialize, Serialize};

/// Listing identifier - the authoritative store's integer primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(i64);

impl ListingId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parse from the string form search engines return document ids in
    pub fn from_string(s: &str) -> Option<Self> {
        s.trim().parse::<i64>().ok().map(Self)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cosmetic condition grade of a listed device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Like new
    A,
    /// Good
    B,
    /// Fair
    C,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::A => "A",
            Condition::B => "B",
            Condition::C => "C",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Condition::A),
            "B" => Some(Condition::B),
            "C" => Some(Condition::C),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields a caller is allowed to sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Price,
    CreatedAt,
    BatteryHealth,
    Rating,
    Title,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Price => "price",
            SortKey::CreatedAt => "created_at",
            SortKey::BatteryHealth => "battery_health",
            SortKey::Rating => "rating",
            SortKey::Title => "title",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "price" => Some(SortKey::Price),
            "created_at" => Some(SortKey::CreatedAt),
            "battery_health" => Some(SortKey::BatteryHealth),
            "rating" => Some(SortKey::Rating),
            "title" => Some(SortKey::Title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated sort directive for a search request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    /// Default order: promoted listings first, newest first within each group
    PromotedRecency,
    ByField { key: SortKey, order: SortOrder },
}

impl Sort {
    /// Parse a raw `ordering` parameter against the whitelist.
    ///
    /// A leading `-` selects descending order. Unknown or empty values fall
    /// back to the default order rather than erroring.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (name, order) = match trimmed.strip_prefix('-') {
            Some(rest) => (rest, SortOrder::Desc),
            None => (trimmed, SortOrder::Asc),
        };
        match SortKey::parse(name) {
            Some(key) => Sort::ByField { key, order },
            None => Sort::PromotedRecency,
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Sort::PromotedRecency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_id_from_string() {
        assert_eq!(ListingId::from_string("42"), Some(ListingId::new(42)));
        assert_eq!(ListingId::from_string(" 7 "), Some(ListingId::new(7)));
        assert_eq!(ListingId::from_string("abc"), None);
    }

    #[test]
    fn test_condition_roundtrip() {
        for grade in [Condition::A, Condition::B, Condition::C] {
            assert_eq!(Condition::parse(grade.as_str()), Some(grade));
        }
        assert_eq!(Condition::parse("D"), None);
    }

    #[test]
    fn test_sort_parse_whitelist() {
        assert_eq!(
            Sort::parse("price"),
            Sort::ByField {
                key: SortKey::Price,
                order: SortOrder::Asc
            }
        );
        assert_eq!(
            Sort::parse("-created_at"),
            Sort::ByField {
                key: SortKey::CreatedAt,
                order: SortOrder::Desc
            }
        );
    }

    #[test]
    fn test_sort_parse_unknown_falls_back_to_default() {
        assert_eq!(Sort::parse("seller_phone"), Sort::PromotedRecency);
        assert_eq!(Sort::parse(""), Sort::PromotedRecency);
        assert_eq!(Sort::parse("-"), Sort::PromotedRecency);
    }
}
