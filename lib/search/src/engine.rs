use crate::cluster::ClusterMap;
use crate::error::{Result, SearchError};
use crate::explain::{SearchHit, SearchMetadata, SearchResults};
use crate::query::{SearchQuery, SortDirective, SortField, SortOrder};
use crate::score::Scorer;
use crate::suggest::SuggestionIndex;
use chrono::{DateTime, Utc};
use dimx_core::{euclidean_distance, Catalog, Entity, Filter, Product, SpatialIndex, User};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Configuration for a search engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidates fetched from the index per requested result
    pub overfetch_factor: usize,
    pub default_min: f64,
    pub default_max: f64,
    pub cluster_cell_size: f64,
    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 3,
            default_min: 0.0,
            default_max: 100.0,
            cluster_cell_size: 10.0,
            suggestion_limit: 10,
        }
    }
}

/// Everything derived from one product snapshot. Never mutated after build.
struct IndexGeneration {
    index: SpatialIndex,
    clusters: ClusterMap,
    suggestions: SuggestionIndex,
    generation: u64,
    built_at: DateTime<Utc>,
}

/// Shape of the current index generation
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub products: usize,
    pub dimensions: usize,
    pub clusters: usize,
    pub depth: usize,
    pub generation: u64,
    pub built_at: DateTime<Utc>,
}

/// Dimensional product search over an immutable, swappable index
pub struct SearchEngine {
    config: SearchConfig,
    scorer: Scorer,
    current: RwLock<Option<Arc<IndexGeneration>>>,
    generations: AtomicU64,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            scorer: Scorer::new(config.default_min, config.default_max),
            config,
            current: RwLock::new(None),
            generations: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    /// Rebuild the index, cluster map and suggestions from a full product
    /// snapshot, then swap them in. Queries already running keep the
    /// generation they started with.
    pub fn update_index(&self, products: Vec<Product>) {
        let start = Instant::now();
        let clusters = ClusterMap::build(&products, self.config.cluster_cell_size);
        let suggestions = SuggestionIndex::build(&products);
        let index = SpatialIndex::build(products);
        let generation = self.generations.fetch_add(1, AtomicOrdering::AcqRel) + 1;

        info!(
            generation,
            products = index.len(),
            dimensions = index.dimensions().len(),
            depth = index.depth(),
            clusters = clusters.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Search index rebuilt"
        );

        let built = Arc::new(IndexGeneration {
            index,
            clusters,
            suggestions,
            generation,
            built_at: Utc::now(),
        });
        *self.current.write() = Some(built);
    }

    /// Rebuild from the current contents of a catalog
    pub fn rebuild_from(&self, catalog: &Catalog) {
        self.update_index(catalog.snapshot());
    }

    fn current(&self) -> Result<Arc<IndexGeneration>> {
        self.current.read().clone().ok_or(SearchError::NotInitialized)
    }

    /// Run a query, optionally personalised for `user`
    pub fn search(&self, query: &SearchQuery, user: Option<&User>) -> Result<SearchResults> {
        let start = Instant::now();
        query.validate()?;
        let gen = self.current()?;

        let dims = query.active_dimensions();
        let point = query.query_point(self.config.default_min, self.config.default_max);

        let candidates: Vec<(&Product, f64)> = if dims.is_empty() {
            gen.index.iter().map(|p| (p, 0.0)).collect()
        } else {
            let fetch = query.limit.saturating_mul(self.config.overfetch_factor);
            gen.index.nearest_projected(&point, fetch, &dims)
        };
        let candidate_count = candidates.len();

        let needle = query.text.as_deref().map(str::to_lowercase);
        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter_map(|(product, distance)| {
                let score = self.scorer.score(query, product, user);
                if !dims.is_empty() && score.total <= 0.0 {
                    return None;
                }
                if !query.filters.as_slice().matches(product) {
                    return None;
                }
                if let Some(needle) = &needle {
                    if !matches_text(product, needle) {
                        return None;
                    }
                }
                Some(SearchHit {
                    product: product.clone(),
                    score: score.total,
                    relevance: score.relevance,
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| compare_hits(a, b, query.sort));
        let total_matched = hits.len();
        let items: Vec<SearchHit> = hits
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            generation = gen.generation,
            candidates = candidate_count,
            matched = total_matched,
            returned = items.len(),
            elapsed_ms,
            "Search executed"
        );

        Ok(SearchResults {
            items,
            metadata: SearchMetadata {
                total_matched,
                candidates: candidate_count,
                dimensions: dims,
                elapsed_ms,
                generation: gen.generation,
            },
        })
    }

    /// Names and categories containing `partial`, capped at the configured limit
    pub fn suggestions(&self, partial: &str, dimension: Option<&str>) -> Vec<String> {
        match self.current() {
            Ok(gen) => gen
                .suggestions
                .suggest(partial, dimension, self.config.suggestion_limit),
            Err(_) => Vec::new(),
        }
    }

    /// Cluster cell of an indexed product
    pub fn cluster_of(&self, product_id: &str) -> Result<String> {
        let gen = self.current()?;
        gen.clusters
            .cluster_of(product_id)
            .map(str::to_string)
            .ok_or_else(|| SearchError::ProductNotIndexed(product_id.to_string()))
    }

    /// Other products in the same cluster cell, nearest first
    pub fn similar_products(&self, product_id: &str, limit: usize) -> Result<Vec<(Product, f64)>> {
        let gen = self.current()?;
        let anchor = gen
            .index
            .get(product_id)
            .ok_or_else(|| SearchError::ProductNotIndexed(product_id.to_string()))?;
        let key = gen
            .clusters
            .cluster_of(product_id)
            .ok_or_else(|| SearchError::ProductNotIndexed(product_id.to_string()))?;

        let mut similar: Vec<(Product, f64)> = gen
            .clusters
            .members(key)
            .iter()
            .filter(|id| id.as_str() != product_id)
            .filter_map(|id| gen.index.get(id))
            .map(|p| {
                let dist = euclidean_distance(anchor.coordinates(), p.coordinates());
                (p.clone(), dist)
            })
            .collect();
        similar.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.id().cmp(b.0.id())));
        similar.truncate(limit);
        Ok(similar)
    }

    pub fn stats(&self) -> Result<IndexStats> {
        let gen = self.current()?;
        Ok(IndexStats {
            products: gen.index.len(),
            dimensions: gen.index.dimensions().len(),
            clusters: gen.clusters.len(),
            depth: gen.index.depth(),
            generation: gen.generation,
            built_at: gen.built_at,
        })
    }
}

fn matches_text(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product
            .categories
            .iter()
            .any(|c| c.to_lowercase().contains(needle))
}

fn compare_hits(a: &SearchHit, b: &SearchHit, sort: Option<SortDirective>) -> Ordering {
    let primary = match sort {
        None => b.score.total_cmp(&a.score),
        Some(directive) => {
            let ord = match directive.field {
                SortField::Score => a.score.total_cmp(&b.score),
                SortField::Price => a.product.price.base.total_cmp(&b.product.price.base),
                SortField::Quality => a.product.quality.total_cmp(&b.product.quality),
                SortField::Rating => a
                    .product
                    .seller
                    .reputation
                    .total_cmp(&b.product.seller.reputation),
                SortField::Name => a.product.name.cmp(&b.product.name),
                SortField::Distance => a.distance.total_cmp(&b.distance),
            };
            match directive.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
    };
    primary.then_with(|| a.id().cmp(b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DimensionConstraint;
    use dimx_core::{Coordinates, Price, ProductFilter, SellerSummary};
    use std::collections::HashSet;

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product::new(
            id,
            name,
            Coordinates::from_pairs([("price", price)]).unwrap(),
            Price::new(price),
            SellerSummary {
                id: "seller".to_string(),
                reputation: 4.0,
                coordinates: Coordinates::new(),
            },
        )
        .with_quality(0.5)
        .with_availability(10)
    }

    fn priced_engine() -> SearchEngine {
        let engine = SearchEngine::default();
        engine.update_index(vec![
            product("p25", "Budget Kettle", 25.0).with_category("Kitchen"),
            product("p50", "Steel Kettle", 50.0).with_category("Kitchen"),
            product("p100", "Glass Kettle", 100.0).with_category("Kitchen"),
            product("p150", "Smart Kettle", 150.0).with_category("Smart Home"),
        ]);
        engine
    }

    #[test]
    fn test_search_before_index_is_reported() {
        let engine = SearchEngine::default();
        assert_eq!(
            engine.search(&SearchQuery::new(), None).unwrap_err(),
            SearchError::NotInitialized
        );
        assert!(engine.suggestions("a", None).is_empty());
        assert!(engine.stats().is_err());
    }

    #[test]
    fn test_range_query_excludes_out_of_range_and_ranks_by_midpoint() {
        let engine = priced_engine();
        let query = SearchQuery::new()
            .dimension("price", DimensionConstraint::range(40.0, 100.0).with_weight(1.0))
            .page(10, 0);
        let results = engine.search(&query, None).unwrap();
        assert_eq!(results.ids(), vec!["p50", "p100"]);
        assert_eq!(results.metadata.total_matched, 2);
        assert_eq!(results.metadata.dimensions, vec!["price".to_string()]);
    }

    #[test]
    fn test_non_finite_constraint_rejected() {
        let engine = priced_engine();
        let query =
            SearchQuery::new().dimension("price", DimensionConstraint::range(f64::NAN, 100.0));
        assert!(matches!(
            engine.search(&query, None),
            Err(SearchError::InvalidQuery(_))
        ));

        let constraint = DimensionConstraint::range(0.0, 100.0).with_preferred(f64::INFINITY);
        let query = SearchQuery::new().dimension("price", constraint);
        assert!(matches!(
            engine.search(&query, None),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_scores_and_relevance_in_unit_interval() {
        let engine = priced_engine();
        let query = SearchQuery::new()
            .dimension("price", DimensionConstraint::range(0.0, 200.0).with_preferred(60.0))
            .dimension("missing", DimensionConstraint::default().with_weight(0.2));
        let results = engine.search(&query, None).unwrap();
        assert_eq!(results.len(), 4);
        for hit in &results.items {
            assert!((0.0..=1.0).contains(&hit.score));
            assert!(hit.relevance.values().all(|r| (0.0..=1.0).contains(r)));
        }
    }

    #[test]
    fn test_pages_are_disjoint() {
        let engine = SearchEngine::default();
        engine.update_index(
            (0..30)
                .map(|i| product(&format!("p{}", i), "Item", i as f64 * 3.0))
                .collect(),
        );
        let base = SearchQuery::new().dimension("price", DimensionConstraint::range(0.0, 100.0));
        let first = engine.search(&base.clone().page(5, 0), None).unwrap();
        let second = engine.search(&base.clone().page(5, 5), None).unwrap();
        let beyond = engine.search(&base.page(5, 500), None).unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);
        let a: HashSet<&str> = first.ids().into_iter().collect();
        assert!(second.ids().iter().all(|id| !a.contains(id)));
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_filters_and_text() {
        let engine = priced_engine();
        let query = SearchQuery::new()
            .filter(ProductFilter::Category("kitchen".into()))
            .filter(ProductFilter::PriceRange { min: Some(30.0), max: None })
            .text("KETTLE");
        let results = engine.search(&query, None).unwrap();
        let ids: HashSet<&str> = results.ids().into_iter().collect();
        assert_eq!(ids, HashSet::from(["p50", "p100"]));

        let query = SearchQuery::new().text("smart");
        assert_eq!(engine.search(&query, None).unwrap().ids(), vec!["p150"]);
    }

    #[test]
    fn test_explicit_sort() {
        let engine = priced_engine();
        let query = SearchQuery::new().sort_by(SortField::Price, SortOrder::Desc);
        let results = engine.search(&query, None).unwrap();
        assert_eq!(results.ids(), vec!["p150", "p100", "p50", "p25"]);

        let query = SearchQuery::new().sort_by(SortField::Name, SortOrder::Asc);
        let results = engine.search(&query, None).unwrap();
        assert_eq!(results.ids(), vec!["p25", "p100", "p150", "p50"]);
    }

    #[test]
    fn test_user_preferences_boost() {
        let engine = SearchEngine::default();
        let a = Product::new(
            "a",
            "A",
            Coordinates::from_pairs([("x", 50.0), ("y", 0.0)]).unwrap(),
            Price::new(1.0),
            SellerSummary { id: "s".into(), reputation: 5.0, coordinates: Coordinates::new() },
        );
        let mut b = a.clone();
        b.meta.id = "b".to_string();
        b.meta.coordinates = Coordinates::from_pairs([("x", 50.0), ("y", 40.0)]).unwrap();
        engine.update_index(vec![a, b]);

        let user = User::new("u", "Ann", Coordinates::new())
            .with_preferences(Coordinates::from_pairs([("y", 1.0)]).unwrap());
        let query = SearchQuery::new().dimension("x", DimensionConstraint::range(0.0, 60.0));

        let anonymous = engine.search(&query, None).unwrap();
        let personal = engine.search(&query, Some(&user)).unwrap();
        let score_of = |r: &SearchResults, id: &str| {
            r.items.iter().find(|h| h.id() == id).map(|h| h.score).unwrap()
        };
        assert!(score_of(&personal, "b") > score_of(&anonymous, "b"));
        assert_eq!(score_of(&personal, "a"), score_of(&anonymous, "a"));
    }

    #[test]
    fn test_rebuild_swaps_generation() {
        let engine = priced_engine();
        assert_eq!(engine.stats().unwrap().generation, 1);
        let catalog = Catalog::from_entities(vec![product("only", "Only", 10.0)]);
        engine.rebuild_from(&catalog);
        let stats = engine.stats().unwrap();
        assert_eq!(stats.generation, 2);
        assert_eq!(stats.products, 1);
        let results = engine.search(&SearchQuery::new(), None).unwrap();
        assert_eq!(results.ids(), vec!["only"]);
        assert_eq!(results.metadata.generation, 2);
    }

    #[test]
    fn test_suggestions() {
        let engine = priced_engine();
        let suggestions = engine.suggestions("kett", None);
        assert_eq!(suggestions.len(), 4);
        assert_eq!(engine.suggestions("HOME", Some("price")), vec!["Smart Home"]);
        assert!(engine.suggestions("kettle", Some("weight")).is_empty());
    }

    #[test]
    fn test_similar_products_share_cluster() {
        let engine = SearchEngine::default();
        engine.update_index(vec![
            product("a", "A", 41.0),
            product("b", "B", 48.0),
            product("c", "C", 44.0),
            product("d", "D", 75.0),
        ]);
        let similar = engine.similar_products("a", 5).unwrap();
        let ids: Vec<&str> = similar.iter().map(|(p, _)| p.id()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert_eq!(engine.cluster_of("d").unwrap(), "price:7");
        assert!(matches!(
            engine.similar_products("zzz", 5),
            Err(SearchError::ProductNotIndexed(_))
        ));
    }
}
