//! JSON catalog files
//!
//! ```json
//! { "products": [ ... ], "users": [ ... ] }
//! ```

use dimx_core::{Catalog, Product, Result, User, UserStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub users: Vec<User>,
}

/// Stores populated from a catalog file, ready to hand to the engines
pub struct LoadedCatalog {
    pub catalog: Arc<Catalog>,
    pub users: Arc<UserStore>,
}

impl CatalogFile {
    pub fn into_stores(self) -> LoadedCatalog {
        let catalog = Catalog::new();
        for product in self.products {
            if catalog.contains(&product.meta.id) {
                warn!(
                    product_id = %product.meta.id,
                    "Duplicate product id in catalog, later entry wins"
                );
            }
            catalog.upsert(product);
        }
        let users = UserStore::new();
        for user in self.users {
            if users.contains(&user.meta.id) {
                warn!(user_id = %user.meta.id, "Duplicate user id in catalog, later entry wins");
            }
            users.upsert(user);
        }
        LoadedCatalog {
            catalog: Arc::new(catalog),
            users: Arc::new(users),
        }
    }
}

/// Read products and users from a JSON file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<LoadedCatalog> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;
    let file: CatalogFile = serde_json::from_str(&data)?;
    let loaded = file.into_stores();
    info!(
        path = %path.display(),
        products = loaded.catalog.len(),
        users = loaded.users.len(),
        "Catalog loaded"
    );
    Ok(loaded)
}
