use crate::{Entity, Error, Product, Result, User};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// In-memory keyed store for one kind of entity.
///
/// Each engine receives its stores explicitly (usually behind an `Arc`).
/// Every write bumps both the entity version and the store generation, so
/// consumers holding derived structures can tell they are stale.
pub struct EntityStore<T> {
    entries: RwLock<AHashMap<String, T>>,
    generation: AtomicU64,
}

pub type Catalog = EntityStore<Product>;
pub type UserStore = EntityStore<User>;

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(AHashMap::new()),
            generation: AtomicU64::new(0),
        }
    }
}

impl<T: Entity + Clone> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let store = Self::new();
        for entity in entities {
            store.upsert(entity);
        }
        store
    }

    /// Insert or replace an entity. A replacement keeps the original creation
    /// time and continues the version sequence. Returns the stored version.
    pub fn upsert(&self, mut entity: T) -> u64 {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(entity.id()) {
            let meta = entity.meta_mut();
            meta.created_at = existing.created_at();
            meta.version = existing.version();
            meta.touch();
        }
        let version = entity.version();
        entries.insert(entity.id().to_string(), entity);
        self.generation.fetch_add(1, Ordering::AcqRel);
        version
    }

    /// Get a copy of an entity by ID
    pub fn get(&self, id: &str) -> Option<T> {
        self.entries.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Mutate an entity in place and bump its version
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut entries = self.entries.write();
        let entity = entries.get_mut(id)?;
        let result = f(entity);
        entity.meta_mut().touch();
        self.generation.fetch_add(1, Ordering::AcqRel);
        Some(result)
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        let removed = self.entries.write().remove(id);
        if removed.is_some() {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    /// Copy of every entity, sorted by ID
    pub fn snapshot(&self) -> Vec<T> {
        let mut all: Vec<T> = self.entries.read().values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    /// Number of writes seen so far
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl EntityStore<Product> {
    /// Check and decrement availability under a single write lock.
    /// Returns the remaining stock.
    pub fn reserve(&self, product_id: &str, quantity: u32) -> Result<u32> {
        let mut entries = self.entries.write();
        let product = entries
            .get_mut(product_id)
            .ok_or_else(|| Error::ProductNotFound(product_id.to_string()))?;

        if quantity > product.availability {
            return Err(Error::InsufficientAvailability {
                product_id: product_id.to_string(),
                requested: quantity,
                available: product.availability,
            });
        }

        product.availability -= quantity;
        product.meta.touch();
        self.generation.fetch_add(1, Ordering::AcqRel);
        debug!(product_id, quantity, remaining = product.availability, "Reserved stock");
        Ok(product.availability)
    }

    /// Return previously reserved stock
    pub fn release(&self, product_id: &str, quantity: u32) -> Result<u32> {
        self.update(product_id, |product| {
            product.availability = product.availability.saturating_add(quantity);
            product.availability
        })
        .ok_or_else(|| Error::ProductNotFound(product_id.to_string()))
    }
}
