use crate::distance::{euclidean_distance, projected_euclidean_distance};
use crate::{Coordinates, Entity, Product};
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Pool entry, ordered so the heap top is the worst (furthest) candidate
#[derive(Clone, Copy)]
struct Candidate {
    idx: usize,
    dist: f64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: larger distance = higher priority
        OrderedFloat(self.dist)
            .cmp(&OrderedFloat(other.dist))
            .then_with(|| self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
struct KdNode {
    product: Product,
    /// Index into `SpatialIndex::dimensions`; `None` when no dimension was observed
    axis: Option<usize>,
    split: f64,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Clone, Copy)]
enum Metric<'a> {
    Full,
    Projected(&'a [String]),
}

impl Metric<'_> {
    #[inline]
    fn distance(&self, a: &Coordinates, b: &Coordinates) -> f64 {
        match self {
            Metric::Full => euclidean_distance(a, b),
            Metric::Projected(dims) => projected_euclidean_distance(a, b, dims),
        }
    }

    #[inline]
    fn covers(&self, dimension: &str) -> bool {
        match self {
            Metric::Full => true,
            Metric::Projected(dims) => dims.iter().any(|d| d == dimension),
        }
    }
}

/// Balanced k-d tree over a fixed product set.
///
/// The tree is immutable once built: any change to the product set means
/// building a new index. Splitting axes cycle through the sorted union of
/// all observed dimension names, with missing values read as `0.0`.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    nodes: Vec<KdNode>,
    root: Option<usize>,
    dimensions: Vec<String>,
    id_to_node: AHashMap<String, usize>,
    depth: usize,
}

impl SpatialIndex {
    /// Build the tree in O(n log² n)
    pub fn build(products: Vec<Product>) -> Self {
        let mut dimensions: Vec<String> = products
            .iter()
            .flat_map(|p| p.coordinates().dimensions().map(str::to_string))
            .collect();
        dimensions.sort_unstable();
        dimensions.dedup();

        let mut index = Self {
            nodes: Vec::with_capacity(products.len()),
            root: None,
            dimensions,
            id_to_node: AHashMap::with_capacity(products.len()),
            depth: 0,
        };
        index.root = index.build_node(products, 0);

        for (idx, node) in index.nodes.iter().enumerate() {
            index.id_to_node.insert(node.product.id().to_string(), idx);
        }
        index
    }

    fn build_node(&mut self, mut items: Vec<Product>, depth: usize) -> Option<usize> {
        if items.is_empty() {
            return None;
        }
        self.depth = self.depth.max(depth + 1);

        let axis = if self.dimensions.is_empty() {
            None
        } else {
            Some(depth % self.dimensions.len())
        };
        if let Some(axis) = axis {
            let dim = &self.dimensions[axis];
            items.sort_by_key(|p| OrderedFloat(p.coordinates().get(dim)));
        }

        let median = items.len() / 2;
        let upper = items.split_off(median + 1);
        let product = items.pop()?;
        let lower = items;

        let split = axis
            .map(|a| product.coordinates().get(&self.dimensions[a]))
            .unwrap_or(0.0);

        let idx = self.nodes.len();
        self.nodes.push(KdNode {
            product,
            axis,
            split,
            left: None,
            right: None,
        });

        let left = self.build_node(lower, depth + 1);
        let right = self.build_node(upper, depth + 1);
        self.nodes[idx].left = left;
        self.nodes[idx].right = right;
        Some(idx)
    }

    /// k nearest products by Euclidean distance over all dimensions.
    /// Results are ascending by distance.
    pub fn nearest(&self, query: &Coordinates, k: usize) -> Vec<(&Product, f64)> {
        self.search(query, k, Metric::Full)
    }

    /// k nearest products by Euclidean distance restricted to `dims`
    pub fn nearest_projected(
        &self,
        query: &Coordinates,
        k: usize,
        dims: &[String],
    ) -> Vec<(&Product, f64)> {
        self.search(query, k, Metric::Projected(dims))
    }

    fn search(&self, query: &Coordinates, k: usize, metric: Metric<'_>) -> Vec<(&Product, f64)> {
        if k == 0 || self.root.is_none() {
            return Vec::new();
        }

        let mut pool: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        self.search_node(self.root, query, k, metric, &mut pool);

        let mut results: Vec<Candidate> = pool.into_vec();
        results.sort_unstable();
        results
            .into_iter()
            .map(|c| (&self.nodes[c.idx].product, c.dist))
            .collect()
    }

    fn search_node(
        &self,
        node_idx: Option<usize>,
        query: &Coordinates,
        k: usize,
        metric: Metric<'_>,
        pool: &mut BinaryHeap<Candidate>,
    ) {
        let Some(idx) = node_idx else {
            return;
        };
        let node = &self.nodes[idx];

        let dist = metric.distance(query, node.product.coordinates());
        if pool.len() < k {
            pool.push(Candidate { idx, dist });
        } else if pool.peek().map_or(false, |worst| dist < worst.dist) {
            pool.pop();
            pool.push(Candidate { idx, dist });
        }

        let gap = match node.axis {
            Some(axis) if metric.covers(&self.dimensions[axis]) => {
                query.get(&self.dimensions[axis]) - node.split
            }
            _ => 0.0,
        };
        let (near, far) = if gap < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.search_node(near, query, k, metric, pool);

        let worst = pool.peek().map_or(f64::INFINITY, |c| c.dist);
        if pool.len() < k || gap.abs() < worst {
            self.search_node(far, query, k, metric, pool);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.id_to_node.get(id).map(|&idx| &self.nodes[idx].product)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.nodes.iter().map(|n| &n.product)
    }

    /// Sorted union of dimension names observed at build time
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
