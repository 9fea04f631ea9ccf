//! Distance and similarity primitives over sparse coordinate vectors
//!
//! All functions are total and symmetric. Dimensions missing from one side
//! are treated as `0.0`, and every function runs in O(|union of dimensions|).

use crate::Coordinates;
use serde::{Deserialize, Serialize};

/// Distance metric selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Distance {
    #[default]
    Euclidean,
    Manhattan,
    Cosine,
}

impl Distance {
    /// Compute the distance between two vectors under this metric.
    /// Cosine is reported as `1 - similarity`.
    #[inline]
    pub fn compute(self, a: &Coordinates, b: &Coordinates) -> f64 {
        match self {
            Distance::Euclidean => euclidean_distance(a, b),
            Distance::Manhattan => manhattan_distance(a, b),
            Distance::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }
}

/// sqrt(Σ (aᵤ - bᵤ)²) over the union of present dimensions
pub fn euclidean_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    a.union_dimensions(b)
        .into_iter()
        .map(|dim| {
            let diff = a.get(dim) - b.get(dim);
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Σ |aᵤ - bᵤ| over the union of present dimensions
pub fn manhattan_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    a.union_dimensions(b)
        .into_iter()
        .map(|dim| (a.get(dim) - b.get(dim)).abs())
        .sum()
}

/// dot(a, b) / (‖a‖·‖b‖), defined as `0.0` when either norm is zero
pub fn cosine_similarity(a: &Coordinates, b: &Coordinates) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

/// Euclidean distance with each squared term scaled by `weights[u]` (default 1).
/// Negative weights count as zero.
pub fn weighted_euclidean_distance(
    a: &Coordinates,
    b: &Coordinates,
    weights: &Coordinates,
) -> f64 {
    a.union_dimensions(b)
        .into_iter()
        .map(|dim| {
            let weight = if weights.contains(dim) { weights.get(dim).max(0.0) } else { 1.0 };
            let diff = a.get(dim) - b.get(dim);
            weight * diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Euclidean distance restricted to `dims`
pub fn projected_euclidean_distance<S: AsRef<str>>(
    a: &Coordinates,
    b: &Coordinates,
    dims: &[S],
) -> f64 {
    dims.iter()
        .map(|dim| {
            let diff = a.get(dim.as_ref()) - b.get(dim.as_ref());
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}
