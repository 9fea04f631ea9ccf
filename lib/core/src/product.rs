use crate::{Coordinates, Entity, EntityMeta};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Price of a single unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub base: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Explicit per-dimension surcharges (or discounts, when negative)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimension_overrides: BTreeMap<String, f64>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Price {
    pub fn new(base: f64) -> Self {
        Self {
            base,
            currency: default_currency(),
            dimension_overrides: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_override(mut self, dimension: impl Into<String>, amount: f64) -> Self {
        self.dimension_overrides.insert(dimension.into(), amount);
        self
    }
}

/// What a product knows about its seller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerSummary {
    pub id: String,
    /// Seller reputation in [0, 5]
    pub reputation: f64,
    #[serde(default)]
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub availability: u32,
    /// Quality score in [0, 1]
    #[serde(default)]
    pub quality: f64,
    pub seller: SellerSummary,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinates: Coordinates,
        price: Price,
        seller: SellerSummary,
    ) -> Self {
        Self {
            meta: EntityMeta::new(id, coordinates),
            name: name.into(),
            description: String::new(),
            price,
            categories: BTreeSet::new(),
            attributes: BTreeMap::new(),
            availability: 0,
            quality: 0.0,
            seller,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_availability(mut self, availability: u32) -> Self {
        self.availability = availability;
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality.clamp(0.0, 1.0);
        self
    }
}

impl Entity for Product {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
