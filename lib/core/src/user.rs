use crate::{Coordinates, Entity, EntityMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Where in the attribute space this user would like to buy
    #[serde(default)]
    pub preferences: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseRecord {
    pub product_id: String,
    pub quantity: u32,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BehaviorLog {
    #[serde(default)]
    pub purchase_history: Vec<PurchaseRecord>,
    #[serde(default)]
    pub browsing_weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reputation {
    /// Score in [0, 5]
    pub score: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub transaction_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub profile: UserProfile,
    #[serde(default)]
    pub behavior: BehaviorLog,
    #[serde(default)]
    pub reputation: Reputation,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            meta: EntityMeta::new(id, coordinates),
            profile: UserProfile {
                name: name.into(),
                ..UserProfile::default()
            },
            behavior: BehaviorLog::default(),
            reputation: Reputation::default(),
        }
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: Coordinates) -> Self {
        self.profile.preferences = preferences;
        self
    }

    #[must_use]
    pub fn with_reputation(mut self, score: f64) -> Self {
        self.reputation.score = score.clamp(0.0, 5.0);
        self
    }

    pub fn purchase_count(&self) -> usize {
        self.behavior.purchase_history.len()
    }

    /// Append a purchase and bump the version
    pub fn record_purchase(&mut self, product_id: impl Into<String>, quantity: u32) {
        self.behavior.purchase_history.push(PurchaseRecord {
            product_id: product_id.into(),
            quantity,
            purchased_at: Utc::now(),
        });
        self.meta.touch();
    }

    /// Count a completed sale and bump the version
    pub fn record_sale(&mut self) {
        self.reputation.transaction_count += 1;
        self.meta.touch();
    }
}

impl Entity for User {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
