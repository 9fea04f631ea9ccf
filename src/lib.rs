//! # dimx
//!
//! An in-memory marketplace engine over a shared, arbitrary-dimensional
//! attribute space.
//!
//! Products and users are points with sparse named coordinates. dimx finds
//! products with a k-d tree and preference-weighted ranking, and settles
//! purchases with a trust score, dimension-adjusted pricing, fraud rules and a
//! tamper-evident HMAC proof per transaction.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! dimx --catalog catalog.json search --dim price=40:100 --limit 5
//! dimx --catalog catalog.json suggest lam
//! dimx --catalog catalog.json buy --buyer u1 --seller u2 --product p1
//! ```
//!
//! ### As a library
//!
//! ```rust
//! use dimx::prelude::*;
//! use std::sync::Arc;
//!
//! let seller = SellerSummary {
//!     id: "u2".to_string(),
//!     reputation: 4.0,
//!     coordinates: Coordinates::from_pairs([("price", 50.0)]).unwrap(),
//! };
//! let lamp = Product::new(
//!     "p1",
//!     "Desk lamp",
//!     Coordinates::from_pairs([("price", 45.0)]).unwrap(),
//!     Price::new(45.0),
//!     seller,
//! )
//! .with_availability(3);
//!
//! let catalog = Arc::new(Catalog::from_entities([lamp]));
//! let users = Arc::new(UserStore::from_entities([
//!     User::new("u1", "Ada", Coordinates::from_pairs([("price", 40.0)]).unwrap())
//!         .with_reputation(4.5),
//!     User::new("u2", "Bob", Coordinates::from_pairs([("price", 50.0)]).unwrap())
//!         .with_reputation(4.0),
//! ]));
//!
//! let search = SearchEngine::default();
//! search.rebuild_from(&catalog);
//! let query = SearchQuery::new().dimension("price", DimensionConstraint::range(40.0, 60.0));
//! assert_eq!(search.search(&query, None).unwrap().ids(), vec!["p1"]);
//!
//! let transactions =
//!     TransactionEngine::new(TransactionConfig::default(), catalog, users).unwrap();
//! let ctx = TransactionContext::new("u1", "u2", "p1", 1);
//! let outcome = transactions.create_transaction(ctx);
//! assert!(outcome.success);
//! ```
//!
//! ## Crate Structure
//!
//! - [`dimx-core`](dimx_core) - coordinates, distance primitives, entities, k-d index, stores
//! - [`dimx-search`](dimx_search) - queries, scoring, clusters, suggestions, `SearchEngine`
//! - [`dimx-transaction`](dimx_transaction) - trust, pricing, fraud rules, proofs,
//!   `TransactionEngine`

pub mod catalog;
pub mod config;

pub use catalog::{load_catalog, CatalogFile, LoadedCatalog};
pub use config::EngineConfig;

// Re-export core types
pub use dimx_core::{
    Catalog, Coordinates, Distance, Entity, Error, Price, Product, ProductFilter, Result,
    SellerSummary, SpatialIndex, Transaction, TransactionStatus, User, UserStore,
};

// Re-export search
pub use dimx_search::{
    DimensionConstraint, SearchConfig, SearchEngine, SearchError, SearchQuery, SearchResults,
    SearchStats, SortField, SortOrder,
};

// Re-export transactions
pub use dimx_transaction::{
    TransactionConfig, TransactionContext, TransactionEngine, TransactionError, TransactionOutcome,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        load_catalog, Catalog, Coordinates, DimensionConstraint, Distance, EngineConfig, Entity,
        Error, Price, Product, ProductFilter, Result, SearchConfig, SearchEngine, SearchQuery,
        SellerSummary, SortField, SortOrder, TransactionConfig, TransactionContext,
        TransactionEngine, TransactionStatus, User, UserStore,
    };
}
