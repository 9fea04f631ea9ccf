//! Relevance scoring for search candidates
//!
//! Candidates come out of the spatial index ordered by raw distance. The
//! scorer re-ranks them with per-dimension range fit, preference falloff and
//! constraint weights, then applies user, quality and seller multipliers.

use crate::query::{DimensionConstraint, SearchQuery};
use dimx_core::{cosine_similarity, Entity, Product, User};
use std::collections::BTreeMap;

/// Fraction of the range width a value may overshoot before its fit hits zero
pub const OUT_OF_RANGE_TOLERANCE: f64 = 0.1;
/// Ranges narrower than this are widened for falloff purposes
pub const MIN_RANGE_WIDTH: f64 = 1.0;

const USER_AFFINITY_BOOST: f64 = 0.2;
const QUALITY_BOOST: f64 = 0.2;
const REPUTATION_BOOST: f64 = 0.2;
const MAX_REPUTATION: f64 = 5.0;

/// 1.0 inside `[lo, hi]`, falling off linearly with the overshoot outside
pub fn range_fit(value: f64, lo: f64, hi: f64) -> f64 {
    if value >= lo && value <= hi {
        return 1.0;
    }
    let overshoot = if value < lo { lo - value } else { value - hi };
    let tolerance = (hi - lo).max(MIN_RANGE_WIDTH) * OUT_OF_RANGE_TOLERANCE;
    (1.0 - overshoot / tolerance).max(0.0)
}

/// 1.0 at the preferred value, decaying with distance relative to the range width
pub fn preference_falloff(value: f64, preferred: f64, width: f64) -> f64 {
    let width = width.max(MIN_RANGE_WIDTH);
    1.0 / (1.0 + (value - preferred).abs() / width)
}

/// Score breakdown for one product
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Final score in [0, 1]
    pub total: f64,
    /// Per-dimension relevance in [0, 1], before weighting
    pub relevance: BTreeMap<String, f64>,
}

/// Computes scores for a query
#[derive(Debug, Clone)]
pub struct Scorer {
    default_min: f64,
    default_max: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(0.0, 100.0)
    }
}

impl Scorer {
    pub fn new(default_min: f64, default_max: f64) -> Self {
        Self {
            default_min,
            default_max,
        }
    }

    /// Relevance of `value` against one constraint
    pub fn dimension_relevance(&self, constraint: &DimensionConstraint, value: f64) -> f64 {
        let (lo, hi) = constraint.bounds(self.default_min, self.default_max);
        let preferred = constraint.target(self.default_min, self.default_max);
        range_fit(value, lo, hi) * preference_falloff(value, preferred, hi - lo)
    }

    /// Score a product for a query, optionally personalised for a user
    pub fn score(&self, query: &SearchQuery, product: &Product, user: Option<&User>) -> Score {
        let coords = product.coordinates();
        let mut relevance = BTreeMap::new();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for (name, constraint) in &query.dimensions {
            let r = self.dimension_relevance(constraint, coords.get(name));
            let weight = constraint.weight.clamp(0.0, 1.0);
            weighted_sum += r * weight;
            weight_total += weight;
            relevance.insert(name.clone(), r);
        }

        let base = if relevance.is_empty() {
            1.0
        } else if weight_total > 0.0 {
            weighted_sum / weight_total
        } else {
            // all weights zero: plain mean
            relevance.values().sum::<f64>() / relevance.len() as f64
        };

        let mut total = base;
        if let Some(user) = user {
            let affinity = cosine_similarity(&user.profile.preferences, coords);
            total *= 1.0 + USER_AFFINITY_BOOST * affinity;
        }
        total *= (1.0 - QUALITY_BOOST) + QUALITY_BOOST * product.quality.clamp(0.0, 1.0);
        let reputation = (product.seller.reputation / MAX_REPUTATION).clamp(0.0, 1.0);
        total *= (1.0 - REPUTATION_BOOST) + REPUTATION_BOOST * reputation;

        Score {
            total: total.clamp(0.0, 1.0),
            relevance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimx_core::{Coordinates, Price, SellerSummary};

    fn product(value: f64, quality: f64, reputation: f64) -> Product {
        Product::new(
            "p",
            "Thing",
            Coordinates::from_pairs([("price", value)]).unwrap(),
            Price::new(value),
            SellerSummary {
                id: "s".to_string(),
                reputation,
                coordinates: Coordinates::new(),
            },
        )
        .with_quality(quality)
    }

    #[test]
    fn test_range_fit() {
        assert_eq!(range_fit(50.0, 40.0, 100.0), 1.0);
        assert_eq!(range_fit(40.0, 40.0, 100.0), 1.0);
        // 3 below a range of width 60 with tolerance 6
        assert!((range_fit(37.0, 40.0, 100.0) - 0.5).abs() < 1e-12);
        assert_eq!(range_fit(25.0, 40.0, 100.0), 0.0);
        assert_eq!(range_fit(150.0, 40.0, 100.0), 0.0);
    }

    #[test]
    fn test_preference_falloff_orders_by_proximity() {
        let near = preference_falloff(50.0, 70.0, 60.0);
        let far = preference_falloff(100.0, 70.0, 60.0);
        assert!(near > far);
        assert_eq!(preference_falloff(70.0, 70.0, 60.0), 1.0);
    }

    #[test]
    fn test_perfect_product_scores_one() {
        let scorer = Scorer::default();
        let query = SearchQuery::new().dimension("price", DimensionConstraint::preferred(50.0));
        let score = scorer.score(&query, &product(50.0, 1.0, 5.0), None);
        assert!((score.total - 1.0).abs() < 1e-12);
        assert_eq!(score.relevance["price"], 1.0);
    }

    #[test]
    fn test_quality_and_reputation_multipliers() {
        let scorer = Scorer::default();
        let query = SearchQuery::new().dimension("price", DimensionConstraint::preferred(50.0));
        let score = scorer.score(&query, &product(50.0, 0.0, 0.0), None);
        assert!((score.total - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weights_use_mean() {
        let scorer = Scorer::default();
        let query = SearchQuery::new()
            .dimension("price", DimensionConstraint::preferred(50.0).with_weight(0.0))
            .dimension("size", DimensionConstraint::range(0.0, 10.0).with_weight(0.0));
        let score = scorer.score(&query, &product(50.0, 1.0, 5.0), None);
        // price relevance 1.0, size (value 0 inside [0,10], preferred 5) = 1/(1+0.5)
        let expected = (1.0 + 1.0 / 1.5) / 2.0;
        assert!((score.total - expected).abs() < 1e-12);
    }

    #[test]
    fn test_user_affinity_clamped() {
        let scorer = Scorer::default();
        let query = SearchQuery::new().dimension("price", DimensionConstraint::preferred(50.0));
        let user = User::new("u", "Ann", Coordinates::new())
            .with_preferences(Coordinates::from_pairs([("price", 1.0)]).unwrap());
        let score = scorer.score(&query, &product(50.0, 1.0, 5.0), Some(&user));
        assert_eq!(score.total, 1.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let scorer = Scorer::default();
        let query = SearchQuery::new()
            .dimension("price", DimensionConstraint::range(10.0, 20.0).with_weight(0.7))
            .dimension("other", DimensionConstraint::default().with_weight(0.3));
        for value in [-500.0, 0.0, 15.0, 21.0, 1e6] {
            let score = scorer.score(&query, &product(value, 0.5, 2.5), None);
            assert!((0.0..=1.0).contains(&score.total));
            assert!(score.relevance.values().all(|r| (0.0..=1.0).contains(r)));
        }
    }
}
