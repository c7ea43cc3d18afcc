//! Category slugs accepted by the listing pages

use crate::ConfigError;

/// Category slugs offered by the review site's category index
pub const KNOWN_CATEGORIES: [&str; 22] = [
    "animals_pets",
    "food_beverages_tobacco",
    "money_insurance",
    "beauty_wellbeing",
    "public_local_services",
    "health_medical",
    "business_services",
    "restaurants_bars",
    "construction_manufacturing",
    "hobbies_crafts",
    "shopping_fashion",
    "home_garden",
    "education_training",
    "sports",
    "electronics_technology",
    "home_services",
    "travel_vacation",
    "events_entertainment",
    "legal_services_government",
    "utilities",
    "media_publishing",
    "vehicles_transportation",
];

/// Returns true if the slug is one of the catalogued categories
pub fn is_known_category(slug: &str) -> bool {
    KNOWN_CATEGORIES.contains(&slug)
}

/// Checks that a category slug is usable
///
/// Only emptiness is rejected. An unknown slug is still scraped (the site
/// answers with an empty listing), so it only earns a warning.
pub fn validate_category(slug: &str) -> Result<(), ConfigError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(ConfigError::EmptyCategory);
    }

    if !is_known_category(slug) {
        tracing::warn!("Category '{}' is not in the known category list", slug);
    }

    Ok(())
}
