use std::convert::Infallible;
use std::sync::RwLock;

use indexmap::IndexMap;

use crate::{Item, ItemId, NewItem};

/// Durable, keyed storage for inventory items.
///
/// Stores never touch the network, so every method is safe to call while
/// offline. A failing method means the storage layer itself is unavailable
/// (quota, corruption, I/O) and the error must reach the caller.
///
/// All methods take `&self` to support stores with internal locking (e.g., RocksDB).
pub trait LocalStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every stored item in the store's iteration order.
    fn list(&self) -> Result<Vec<Item>, Self::Error>;

    /// Retrieves a single item, or None if not present.
    fn get(&self, id: ItemId) -> Result<Option<Item>, Self::Error>;

    /// Stores a new item under a freshly allocated identifier.
    fn insert(&self, item: &NewItem, pending: bool) -> Result<Item, Self::Error>;

    /// Replaces the item with the same id, or inserts it if absent.
    ///
    /// Advances the id allocator past `item.id`.
    fn upsert(&self, item: &Item) -> Result<(), Self::Error>;

    /// Removes an item. Removing an absent id is not an error.
    fn remove(&self, id: ItemId) -> Result<(), Self::Error>;

    /// Clears the store and inserts every given item.
    ///
    /// Callers never observe a half-replaced store: either the old content or
    /// the new one.
    fn replace_all(&self, items: &[Item]) -> Result<(), Self::Error>;
}

#[derive(Debug)]
struct MemoryState {
    items: IndexMap<ItemId, Item>,
    next_id: ItemId,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            next_id: 1,
        }
    }
}

impl MemoryState {
    fn bump(&mut self, id: ItemId) {
        self.next_id = self.next_id.max(id.saturating_add(1));
    }
}

/// An in-memory store preserving insertion order.
///
/// Useful for testing and as a reference implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given items.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut state = MemoryState::default();
        for item in items {
            state.bump(item.id);
            state.items.insert(item.id, item);
        }
        Self {
            state: RwLock::new(state),
        }
    }
}

impl LocalStore for MemoryStore {
    type Error = Infallible;

    fn list(&self) -> Result<Vec<Item>, Self::Error> {
        Ok(self.state.read().unwrap().items.values().cloned().collect())
    }

    fn get(&self, id: ItemId) -> Result<Option<Item>, Self::Error> {
        Ok(self.state.read().unwrap().items.get(&id).cloned())
    }

    fn insert(&self, item: &NewItem, pending: bool) -> Result<Item, Self::Error> {
        let mut state = self.state.write().unwrap();
        let id = state.next_id;
        state.bump(id);
        let stored = Item::from_draft(id, item.clone(), pending);
        state.items.insert(id, stored.clone());
        Ok(stored)
    }

    fn upsert(&self, item: &Item) -> Result<(), Self::Error> {
        let mut state = self.state.write().unwrap();
        state.bump(item.id);
        state.items.insert(item.id, item.clone());
        Ok(())
    }

    fn remove(&self, id: ItemId) -> Result<(), Self::Error> {
        self.state.write().unwrap().items.shift_remove(&id);
        Ok(())
    }

    fn replace_all(&self, items: &[Item]) -> Result<(), Self::Error> {
        let mut state = self.state.write().unwrap();
        state.items.clear();
        for item in items {
            state.bump(item.id);
            state.items.insert(item.id, item.clone());
        }
        Ok(())
    }
}
