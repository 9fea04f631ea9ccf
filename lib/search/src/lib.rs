//! # dimx Search
//!
//! Dimensional product search with explainable, preference-weighted ranking.
//!
//! ## Features
//!
//! - **Dimension constraints**: min / max / preferred bounds with per-dimension weights
//! - **Spatial candidates**: k-d tree nearest neighbours, over-fetched and then re-scored
//! - **Personalisation**: optional boost from the requesting user's preference vector
//! - **Explainability**: per-dimension relevance and distance on every hit
//! - **Suggestions and clusters**: type-ahead over names and categories, grid-cell neighbours
//!
//! ## Example
//!
//! ```rust
//! use dimx_core::{Coordinates, Price, Product, SellerSummary};
//! use dimx_search::{DimensionConstraint, SearchEngine, SearchQuery};
//!
//! let seller = SellerSummary {
//!     id: "s1".to_string(),
//!     reputation: 4.0,
//!     coordinates: Coordinates::new(),
//! };
//! let products = vec![
//!     Product::new(
//!         "p1",
//!         "Kettle",
//!         Coordinates::from_pairs([("price", 50.0)]).unwrap(),
//!         Price::new(50.0),
//!         seller.clone(),
//!     ),
//!     Product::new(
//!         "p2",
//!         "Toaster",
//!         Coordinates::from_pairs([("price", 95.0)]).unwrap(),
//!         Price::new(95.0),
//!         seller,
//!     ),
//! ];
//!
//! let engine = SearchEngine::default();
//! engine.update_index(products);
//!
//! let query = SearchQuery::new().dimension("price", DimensionConstraint::range(40.0, 100.0));
//! let results = engine.search(&query, None).unwrap();
//! assert_eq!(results.items[0].product.name, "Kettle");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Query     │────>│ SpatialIndex│────>│ Candidates  │
//! │ (dimensions)│     │  (k-d tree) │     │ (3 x limit) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │   Scorer    │<──────────┘
//!                      │ (fit, boost)│
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │ Filter/Sort │
//!                      │  Paginate   │
//!                      └─────────────┘
//! ```

pub mod cluster;
pub mod engine;
pub mod error;
pub mod explain;
pub mod query;
pub mod score;
pub mod suggest;

pub use cluster::{cell_key, ClusterMap};
pub use engine::{IndexStats, SearchConfig, SearchEngine};
pub use error::{Result, SearchError};
pub use explain::{SearchHit, SearchMetadata, SearchResults, SearchStats};
pub use query::{DimensionConstraint, SearchQuery, SortDirective, SortField, SortOrder};
pub use score::{preference_falloff, range_fit, Score, Scorer};
pub use suggest::SuggestionIndex;
