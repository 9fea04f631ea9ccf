//! # dimx Core
//!
//! Core library for the dimx dimensional marketplace engine.
//!
//! This crate provides the shared data model and spatial algorithms:
//!
//! - [`Coordinates`] - Sparse named-dimension vectors
//! - [`distance`] - Euclidean, Manhattan, cosine and weighted distance primitives
//! - [`Product`], [`User`], [`Transaction`] - Entities placed in the coordinate space
//! - [`SpatialIndex`] - Balanced k-d tree for k-nearest-neighbour queries
//! - [`Catalog`], [`UserStore`] - In-memory entity stores
//! - [`ProductFilter`] - Composable product predicates
//!
//! ## Example
//!
//! ```rust
//! use dimx_core::{Coordinates, Price, Product, SellerSummary, SpatialIndex};
//!
//! let seller = SellerSummary {
//!     id: "s1".to_string(),
//!     reputation: 4.5,
//!     coordinates: Coordinates::new(),
//! };
//! let coords = Coordinates::from_pairs([("price", 50.0), ("weight", 2.0)]).unwrap();
//! let product = Product::new("p1", "Kettle", coords, Price::new(50.0), seller);
//!
//! let index = SpatialIndex::build(vec![product]);
//! let query = Coordinates::from_pairs([("price", 45.0)]).unwrap();
//! let nearest = index.nearest(&query, 5);
//! assert_eq!(nearest.len(), 1);
//! ```

pub mod coords;
pub mod distance;
pub mod entity;
pub mod error;
pub mod filter;
pub mod kdtree;
pub mod product;
pub mod store;
pub mod transaction;
pub mod user;

pub use coords::Coordinates;
pub use distance::{
    cosine_similarity, euclidean_distance, manhattan_distance, weighted_euclidean_distance,
    Distance,
};
pub use entity::{Entity, EntityMeta};
pub use error::{Error, Result};
pub use filter::{Filter, ProductFilter};
pub use kdtree::SpatialIndex;
pub use product::{Price, Product, SellerSummary};
pub use store::{Catalog, EntityStore, UserStore};
pub use transaction::{
    PartySnapshot, PriceAdjustment, Pricing, SecurityProof, Transaction, TransactionStatus,
    TrustMetrics,
};
pub use user::{BehaviorLog, PurchaseRecord, Reputation, User, UserProfile};
