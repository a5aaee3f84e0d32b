//! Shared fixtures for the integration test suite

use chrono::{Duration, Utc};

use relist_domain::{Category, Condition, Listing};

/// A small marketplace snapshot with promoted, plain, inactive and
/// partial-overlap package listings
pub fn marketplace_fixture() -> Vec<Listing> {
    let base = Utc::now();
    vec![
        Listing::new(1, "iPhone 13 Pro 256GB", 65000.0, Condition::A)
            .with_phone_model("iPhone 13 Pro")
            .with_color("black")
            .with_storage("256")
            .with_city("Москва")
            .with_category("Смартфоны")
            .with_package_contents(["зарядка", "коробка", "чехол"])
            .with_rating(4.2)
            .with_created_at(base - Duration::days(3)),
        Listing::new(2, "iPhone 11 64GB", 30000.0, Condition::B)
            .with_phone_model("iPhone 11")
            .with_color("white")
            .with_storage("64")
            .with_city("Казань")
            .with_category("Смартфоны")
            .with_package_contents(["зарядка"])
            .with_rating(4.8)
            .with_created_at(base - Duration::days(1)),
        Listing::new(3, "Galaxy S22", 48000.0, Condition::A)
            .with_phone_model("Samsung Galaxy S22")
            .with_color("black")
            .with_storage("128")
            .with_city("Москва")
            .with_category("Смартфоны")
            .with_package_contents(["коробка"])
            .promoted()
            .with_rating(4.5)
            .with_created_at(base - Duration::days(7)),
        Listing::new(4, "iPhone SE", 12000.0, Condition::C)
            .with_phone_model("iPhone SE")
            .with_color("red")
            .with_storage("64")
            .with_city("Санкт-Петербург")
            .with_category("Смартфоны")
            .with_package_contents(["зарядка", "коробка"])
            .with_battery_health(74)
            .with_created_at(base - Duration::days(2)),
        // Inactive listings are invisible to every read path
        Listing::new(5, "iPhone 13 mini", 52000.0, Condition::B)
            .with_phone_model("iPhone 13 mini")
            .inactive()
            .with_created_at(base),
    ]
}

pub fn categories_fixture() -> Vec<Category> {
    vec![
        Category::new(1, "Смартфоны", "smartfony"),
        Category::new(2, "Аксессуары", "aksessuary"),
    ]
}
