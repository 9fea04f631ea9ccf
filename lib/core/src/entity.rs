use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::Coordinates;

/// Identity and lifecycle fields shared by products, users and transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityMeta {
    pub id: String,
    pub coordinates: Coordinates,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Version number - incremented on each mutation
    #[serde(default)]
    pub version: u64,
}

impl EntityMeta {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: id.into(),
            coordinates,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// New metadata with a random UUID v4 id
    #[inline]
    #[must_use]
    pub fn generated(coordinates: Coordinates) -> Self {
        Self::new(Uuid::new_v4().to_string(), coordinates)
    }

    /// Record a mutation
    #[inline]
    pub fn touch(&mut self) {
        self.version += 1;
    }
}

/// Anything placed in the coordinate space
pub trait Entity {
    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    #[inline]
    fn id(&self) -> &str {
        &self.meta().id
    }

    #[inline]
    fn coordinates(&self) -> &Coordinates {
        &self.meta().coordinates
    }

    #[inline]
    fn version(&self) -> u64 {
        self.meta().version
    }

    #[inline]
    fn created_at(&self) -> DateTime<Utc> {
        self.meta().created_at
    }
}
