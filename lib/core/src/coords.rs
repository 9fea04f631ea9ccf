use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A sparse coordinate vector: named dimensions mapped to finite values.
///
/// Dimensions that are absent read as `0.0`. Iteration follows the
/// lexicographic order of dimension names, which keeps index construction
/// and canonical serialization deterministic.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Coordinates {
    values: BTreeMap<String, f64>,
}

impl Coordinates {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from `(dimension, value)` pairs, rejecting non-finite values
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut coords = Self::new();
        for (dimension, value) in pairs {
            coords.set(dimension, value)?;
        }
        Ok(coords)
    }

    /// Set a dimension. Fails with `InvalidCoordinate` for NaN or infinite values.
    pub fn set(&mut self, dimension: impl Into<String>, value: f64) -> Result<()> {
        let dimension = dimension.into();
        if !value.is_finite() {
            return Err(Error::InvalidCoordinate { dimension, value });
        }
        self.values.insert(dimension, value);
        Ok(())
    }

    pub fn remove(&mut self, dimension: &str) -> Option<f64> {
        self.values.remove(dimension)
    }

    /// Value on a dimension, `0.0` when absent
    #[inline]
    #[must_use]
    pub fn get(&self, dimension: &str) -> f64 {
        self.values.get(dimension).copied().unwrap_or(0.0)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, dimension: &str) -> bool {
        self.values.contains_key(dimension)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Euclidean norm
    #[inline]
    pub fn norm(&self) -> f64 {
        self.values.values().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product; only dimensions present in both vectors contribute
    pub fn dot(&self, other: &Coordinates) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .values
            .iter()
            .filter_map(|(dim, v)| large.values.get(dim).map(|w| v * w))
            .sum()
    }

    /// Sorted union of the dimension names of both vectors
    pub fn union_dimensions<'a>(&'a self, other: &'a Coordinates) -> Vec<&'a str> {
        let mut dims: Vec<&str> = self.dimensions().chain(other.dimensions()).collect();
        dims.sort_unstable();
        dims.dedup();
        dims
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Coordinates::from_pairs(raw).map_err(serde::de::Error::custom)
    }
}

impl FromIterator<(String, f64)> for Coordinates {
    /// Collects pairs, silently skipping non-finite values
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        let values = iter.into_iter().filter(|(_, v)| v.is_finite()).collect();
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dimension_reads_zero() {
        let coords = Coordinates::from_pairs([("price", 10.0)]).unwrap();
        assert_eq!(coords.get("price"), 10.0);
        assert_eq!(coords.get("weight"), 0.0);
        assert!(!coords.contains("weight"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut coords = Coordinates::new();
        assert!(coords.set("x", f64::NAN).is_err());
        assert!(coords.set("x", f64::INFINITY).is_err());
        assert!(coords.is_empty());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinates = serde_json::from_str(r#"{"a": 1.5, "b": -2}"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.get("b"), -2.0);
        let dims: Vec<&str> = ok.dimensions().collect();
        assert_eq!(dims, vec!["a", "b"]);
    }

    #[test]
    fn test_dot_and_union() {
        let a = Coordinates::from_pairs([("x", 1.0), ("y", 2.0)]).unwrap();
        let b = Coordinates::from_pairs([("y", 3.0), ("z", 4.0)]).unwrap();
        assert_eq!(a.dot(&b), 6.0);
        assert_eq!(a.union_dimensions(&b), vec!["x", "y", "z"]);
    }
}
