//! Explainability for search results
//!
//! Every hit carries its final score, the per-dimension relevance that fed
//! into it, and its raw distance to the query point.

use dimx_core::{Entity, Product};
use serde::Serialize;
use std::collections::BTreeMap;

/// A ranked product with its score breakdown
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub product: Product,
    /// Final score in [0, 1]
    pub score: f64,
    /// Per-dimension relevance in [0, 1]
    pub relevance: BTreeMap<String, f64>,
    /// Euclidean distance to the query point over the constrained dimensions
    pub distance: f64,
}

impl SearchHit {
    pub fn id(&self) -> &str {
        self.product.id()
    }

    /// Dimension with the highest relevance, if any were constrained
    pub fn top_dimension(&self) -> Option<&str> {
        self.relevance
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMetadata {
    /// Hits that survived scoring and filtering, before pagination
    pub total_matched: usize,
    /// Candidates pulled from the index
    pub candidates: usize,
    pub dimensions: Vec<String>,
    pub elapsed_ms: f64,
    /// Index generation the query ran against
    pub generation: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub items: Vec<SearchHit>,
    pub metadata: SearchMetadata,
}

impl SearchResults {
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(SearchHit::id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats::compute(self)
    }
}

/// Summary of a result page
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub results_count: usize,
    pub avg_score: f64,
    pub best_score: f64,
    pub top_contributing_dimension: Option<String>,
}

impl SearchStats {
    pub fn compute(results: &SearchResults) -> Self {
        if results.items.is_empty() {
            return Self {
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_dimension: None,
            };
        }

        let scores: Vec<f64> = results.items.iter().map(|h| h.score).collect();
        let avg_score = scores.iter().sum::<f64>() / scores.len() as f64;
        let best = results
            .items
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score));

        Self {
            results_count: results.items.len(),
            avg_score,
            best_score: best.map(|h| h.score).unwrap_or(0.0),
            top_contributing_dimension: best.and_then(|h| h.top_dimension()).map(str::to_string),
        }
    }
}
