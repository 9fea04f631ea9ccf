//! Search query definitions
//!
//! A query constrains any number of named dimensions, optionally filters on
//! product fields and free text, and asks for one page of ranked results.

use crate::error::{Result, SearchError};
use dimx_core::{Coordinates, ProductFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Constraint on a single dimension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Ideal value; defaults to the midpoint of the bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<f64>,
    /// Relative importance in [0, 1]
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for DimensionConstraint {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            preferred: None,
            weight: default_weight(),
        }
    }
}

impl DimensionConstraint {
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn preferred(value: f64) -> Self {
        Self {
            preferred: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_preferred(mut self, value: f64) -> Self {
        self.preferred = Some(value);
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    /// Bounds with defaults applied, ordered low to high
    pub fn bounds(&self, default_min: f64, default_max: f64) -> (f64, f64) {
        let lo = self.min.unwrap_or(default_min);
        let hi = self.max.unwrap_or(default_max);
        if lo <= hi {
            (lo, hi)
        } else {
            (hi, lo)
        }
    }

    /// Reject NaN and infinite bounds, preference or weight
    pub fn validate(&self, dimension: &str) -> Result<()> {
        let fields = [
            ("min", self.min),
            ("max", self.max),
            ("preferred", self.preferred),
            ("weight", Some(self.weight)),
        ];
        for (field, value) in fields {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(SearchError::InvalidQuery(format!(
                    "{dimension}.{field} must be finite, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Point the query aims at on this dimension
    pub fn target(&self, default_min: f64, default_max: f64) -> f64 {
        self.preferred.unwrap_or_else(|| {
            let (lo, hi) = self.bounds(default_min, default_max);
            (lo + hi) / 2.0
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Score,
    Price,
    Quality,
    Rating,
    Name,
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub field: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub filters: Vec<ProductFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDirective>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            dimensions: BTreeMap::new(),
            text: None,
            filters: Vec::new(),
            sort: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dimension(mut self, name: impl Into<String>, constraint: DimensionConstraint) -> Self {
        self.dimensions.insert(name.into(), constraint);
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: ProductFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = Some(SortDirective { field, order });
        self
    }

    #[must_use]
    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.dimensions
            .iter()
            .try_for_each(|(name, constraint)| constraint.validate(name))
    }

    /// Names of the constrained dimensions, sorted
    pub fn active_dimensions(&self) -> Vec<String> {
        self.dimensions.keys().cloned().collect()
    }

    /// One target value per constrained dimension
    pub fn query_point(&self, default_min: f64, default_max: f64) -> Coordinates {
        self.dimensions
            .iter()
            .map(|(name, c)| (name.clone(), c.target(default_min, default_max)))
            .collect()
    }
}
