use crate::{Coordinates, Entity, EntityMeta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant as seen at transaction creation time.
///
/// The coordinates are copied, not referenced, so later mutation of the
/// user or product does not change what the transaction recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartySnapshot {
    pub id: String,
    pub coordinates: Coordinates,
}

impl PartySnapshot {
    pub fn of<E: Entity>(entity: &E) -> Self {
        Self {
            id: entity.id().to_string(),
            coordinates: entity.coordinates().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceAdjustment {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pricing {
    pub base: f64,
    pub adjustments: Vec<PriceAdjustment>,
    pub final_price: f64,
    pub currency: String,
}

impl Pricing {
    pub fn total_adjustment(&self) -> f64 {
        self.adjustments.iter().map(|a| a.amount).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl TransactionStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Confirmed => write!(f, "confirmed"),
            TransactionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Trust between buyer and seller, as computed at creation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TrustMetrics {
    pub distance: f64,
    pub similarity: f64,
    pub reputation: f64,
    pub history: f64,
    pub trust: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityProof {
    /// Hex SHA-256 of the canonical transaction fields
    pub hash: String,
    /// Hex HMAC-SHA256 of the same bytes
    pub signature: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub buyer: PartySnapshot,
    pub seller: PartySnapshot,
    pub product: PartySnapshot,
    pub quantity: u32,
    pub pricing: Pricing,
    pub status: TransactionStatus,
    pub trust: TrustMetrics,
    pub proof: SecurityProof,
}

impl Entity for Transaction {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
