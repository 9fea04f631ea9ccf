use dimx_core::{Entity, Product};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct Term {
    /// Spelling of the first occurrence
    display: String,
    /// Dimensions carried by the products that contributed this term
    dimensions: BTreeSet<String>,
}

/// Vocabulary of product names and categories for type-ahead suggestions
#[derive(Debug, Clone, Default)]
pub struct SuggestionIndex {
    /// Keyed by the lowercased term
    terms: BTreeMap<String, Term>,
}

impl SuggestionIndex {
    pub fn build<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut index = Self::default();
        for product in products {
            let dims: Vec<&str> = product.coordinates().dimensions().collect();
            index.add(&product.name, &dims);
            for category in &product.categories {
                index.add(category, &dims);
            }
        }
        index
    }

    fn add(&mut self, term: &str, dims: &[&str]) {
        if term.trim().is_empty() {
            return;
        }
        let entry = self.terms.entry(term.to_lowercase()).or_insert_with(|| Term {
            display: term.to_string(),
            dimensions: BTreeSet::new(),
        });
        entry.dimensions.extend(dims.iter().map(|d| d.to_string()));
    }

    /// Terms containing `partial` (case-insensitive), ordered by their
    /// lowercased form.
    /// With `dimension`, only terms from products carrying it are considered.
    pub fn suggest(&self, partial: &str, dimension: Option<&str>, limit: usize) -> Vec<String> {
        let needle = partial.to_lowercase();
        self.terms
            .iter()
            .filter(|(lowered, _)| lowered.contains(&needle))
            .filter(|(_, term)| dimension.map_or(true, |d| term.dimensions.contains(d)))
            .map(|(_, term)| term.display.clone())
            .take(limit)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimx_core::{Coordinates, Price, SellerSummary};

    fn product(id: &str, name: &str, dim: &str, category: &str) -> Product {
        Product::new(
            id,
            name,
            Coordinates::from_pairs([(dim, 1.0)]).unwrap(),
            Price::new(1.0),
            SellerSummary {
                id: "s".to_string(),
                reputation: 3.0,
                coordinates: Coordinates::new(),
            },
        )
        .with_category(category)
    }

    #[test]
    fn test_case_insensitive_substring() {
        let products = vec![
            product("1", "Espresso Machine", "pressure", "Kitchen"),
            product("2", "Press Kit", "weight", "Tools"),
        ];
        let index = SuggestionIndex::build(&products);
        assert_eq!(index.suggest("PRESS", None, 10), vec!["Espresso Machine", "Press Kit"]);
        assert_eq!(index.suggest("kit", None, 10), vec!["Kitchen", "Press Kit"]);
    }

    #[test]
    fn test_dimension_restricts_sources() {
        let products = vec![
            product("1", "Espresso Machine", "pressure", "Kitchen"),
            product("2", "Press Kit", "weight", "Tools"),
        ];
        let index = SuggestionIndex::build(&products);
        assert_eq!(index.suggest("press", Some("weight"), 10), vec!["Press Kit"]);
        assert!(index.suggest("press", Some("color"), 10).is_empty());
    }

    #[test]
    fn test_limit_and_dedup() {
        let products: Vec<Product> = (0..15)
            .map(|i| product(&i.to_string(), &format!("Item {:02}", i), "x", "Items"))
            .collect();
        let index = SuggestionIndex::build(&products);
        let suggestions = index.suggest("item", None, 10);
        assert_eq!(suggestions.len(), 10);
        assert_eq!(suggestions[0], "Item 00");

        let all = index.suggest("item", None, 100);
        assert_eq!(all.len(), 16);
        assert_eq!(all.iter().filter(|s| s.as_str() == "Items").count(), 1);
    }

    #[test]
    fn test_case_variants_collapse_to_first_spelling() {
        let products = vec![
            product("1", "Kettle", "weight", "Kitchen"),
            product("2", "Whisk", "weight", "kitchen"),
            product("3", "kitchen scale", "color", "KITCHEN"),
        ];
        let index = SuggestionIndex::build(&products);
        assert_eq!(index.suggest("kitch", None, 10), vec!["Kitchen", "kitchen scale"]);
        assert_eq!(index.suggest("KITCHEN", Some("color"), 10), vec!["Kitchen", "kitchen scale"]);
        assert_eq!(index.len(), 4);
    }
}
