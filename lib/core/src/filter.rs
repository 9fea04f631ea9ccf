// Product filter predicates
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::Product;

pub trait Filter {
    fn matches(&self, product: &Product) -> bool;
}

/// A predicate over product fields. Conditions compose with `And`, `Or`, `Not`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFilter {
    /// Product carries this category (case-insensitive)
    Category(String),
    /// Product carries at least one of these categories
    AnyCategory(Vec<String>),
    /// Unit base price within bounds, both inclusive
    PriceRange { min: Option<f64>, max: Option<f64> },
    /// Seller reputation at least this value
    MinRating(f64),
    MinQuality(f64),
    InStock,
    AttributeEquals { key: String, value: Value },
    And(Vec<ProductFilter>),
    Or(Vec<ProductFilter>),
    Not(Box<ProductFilter>),
}

impl ProductFilter {
    fn has_category(product: &Product, category: &str) -> bool {
        product
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    fn matches_condition(condition: &ProductFilter, product: &Product) -> bool {
        match condition {
            ProductFilter::Category(category) => Self::has_category(product, category),
            ProductFilter::AnyCategory(categories) => {
                categories.iter().any(|c| Self::has_category(product, c))
            }
            ProductFilter::PriceRange { min, max } => {
                let price = product.price.base;
                min.map_or(true, |m| price >= m) && max.map_or(true, |m| price <= m)
            }
            ProductFilter::MinRating(rating) => product.seller.reputation >= *rating,
            ProductFilter::MinQuality(quality) => product.quality >= *quality,
            ProductFilter::InStock => product.availability > 0,
            ProductFilter::AttributeEquals { key, value } => product
                .attributes
                .get(key)
                .map(|v| v == value)
                .unwrap_or(false),
            ProductFilter::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, product))
            }
            ProductFilter::Or(conditions) => {
                conditions.iter().any(|c| Self::matches_condition(c, product))
            }
            ProductFilter::Not(condition) => !Self::matches_condition(condition, product),
        }
    }
}

impl Filter for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        Self::matches_condition(self, product)
    }
}

impl<F: Filter> Filter for [F] {
    /// Every filter in the slice must match
    fn matches(&self, product: &Product) -> bool {
        self.iter().all(|f| f.matches(product))
    }
}
