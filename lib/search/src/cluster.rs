use ahash::AHashMap;
use dimx_core::{Coordinates, Entity, Product};

/// Products bucketed by discretized coordinates.
///
/// Each value is floored to a multiple of `cell_size`; products whose
/// floored vectors are equal share a cell.
#[derive(Debug, Clone, Default)]
pub struct ClusterMap {
    cell_size: f64,
    cells: AHashMap<String, Vec<String>>,
    product_cells: AHashMap<String, String>,
}

/// Key of the cell containing `coords`, e.g. `price:40|weight:0`
pub fn cell_key(coords: &Coordinates, cell_size: f64) -> String {
    let size = if cell_size > 0.0 { cell_size } else { 1.0 };
    coords
        .iter()
        .map(|(dim, value)| format!("{}:{}", dim, (value / size).floor() as i64))
        .collect::<Vec<_>>()
        .join("|")
}

impl ClusterMap {
    pub fn build<'a>(products: impl IntoIterator<Item = &'a Product>, cell_size: f64) -> Self {
        let mut map = Self {
            cell_size,
            ..Self::default()
        };
        for product in products {
            let key = cell_key(product.coordinates(), cell_size);
            map.cells
                .entry(key.clone())
                .or_default()
                .push(product.id().to_string());
            map.product_cells.insert(product.id().to_string(), key);
        }
        for members in map.cells.values_mut() {
            members.sort();
        }
        map
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell key of an indexed product
    pub fn cluster_of(&self, product_id: &str) -> Option<&str> {
        self.product_cells.get(product_id).map(String::as_str)
    }

    /// Product IDs in a cell, sorted
    pub fn members(&self, key: &str) -> &[String] {
        self.cells.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimx_core::{Price, SellerSummary};

    fn product(id: &str, price: f64) -> Product {
        Product::new(
            id,
            id,
            Coordinates::from_pairs([("price", price)]).unwrap(),
            Price::new(price),
            SellerSummary {
                id: "s".to_string(),
                reputation: 3.0,
                coordinates: Coordinates::new(),
            },
        )
    }

    #[test]
    fn test_cell_key_floors() {
        let coords = Coordinates::from_pairs([("a", 19.9), ("b", -0.5)]).unwrap();
        assert_eq!(cell_key(&coords, 10.0), "a:1|b:-1");
    }

    #[test]
    fn test_products_share_cells() {
        let products = vec![product("x", 41.0), product("y", 49.0), product("z", 51.0)];
        let map = ClusterMap::build(&products, 10.0);
        assert_eq!(map.len(), 2);
        let key = map.cluster_of("x").unwrap();
        assert_eq!(map.members(key), &["x".to_string(), "y".to_string()]);
        assert_ne!(map.cluster_of("z"), Some(key));
        assert!(map.members("nope").is_empty());
    }
}
