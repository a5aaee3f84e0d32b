//! Core domain entities read by the search pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{Condition, ListingId};

/// Authoritative product record for a listed phone.
///
/// Owned by the write path; the search core only reads it. The field set
/// matches the search index mapping, so a `Listing` can be serialized
/// directly into an index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub phone_model: String,
    pub price: f64,
    pub condition: Condition,
    pub color: String,
    pub storage: String,
    pub body_condition: String,
    pub screen_condition: String,
    pub battery_health: u8,
    pub turbo: bool,
    pub city: String,
    pub category_name: String,
    pub seller_id: i64,
    pub package_contents: Vec<String>,
    pub is_active: bool,
    pub is_top: bool,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Create a listing with the required fields; optional attributes start
    /// from neutral defaults and are filled in with the `with_*` methods.
    pub fn new(id: i64, title: impl Into<String>, price: f64, condition: Condition) -> Self {
        let now = Utc::now();
        Self {
            id: ListingId::new(id),
            title: title.into(),
            description: String::new(),
            phone_model: String::new(),
            price,
            condition,
            color: "black".to_string(),
            storage: String::new(),
            body_condition: String::new(),
            screen_condition: String::new(),
            battery_health: 80,
            turbo: false,
            city: String::new(),
            category_name: String::new(),
            seller_id: 0,
            package_contents: Vec::new(),
            is_active: true,
            is_top: false,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_phone_model(mut self, phone_model: impl Into<String>) -> Self {
        self.phone_model = phone_model.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = storage.into();
        self
    }

    pub fn with_battery_health(mut self, battery_health: u8) -> Self {
        self.battery_health = battery_health;
        self
    }

    pub fn with_turbo(mut self, turbo: bool) -> Self {
        self.turbo = turbo;
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_category(mut self, category_name: impl Into<String>) -> Self {
        self.category_name = category_name.into();
        self
    }

    pub fn with_package_contents<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.package_contents = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn promoted(mut self) -> Self {
        self.is_top = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Validate invariants the write path is expected to enforce
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "title".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.price <= 0.0 {
            return Err(DomainError::Validation {
                field: "price".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.battery_health > 100 {
            return Err(DomainError::Validation {
                field: "battery_health".to_string(),
                reason: "must be within 0-100".to_string(),
            });
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(DomainError::Validation {
                field: "rating".to_string(),
                reason: "must be within 0.0-5.0".to_string(),
            });
        }
        Ok(())
    }

    /// Whether every given tag is present in the package contents
    pub fn contains_all_tags<'a, I: IntoIterator<Item = &'a str>>(&self, tags: I) -> bool {
        tags.into_iter()
            .all(|tag| self.package_contents.iter().any(|t| t == tag))
    }
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}
