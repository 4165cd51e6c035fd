use serde::{Deserialize, Serialize};

/// Identifier of an item.
///
/// Allocated by the local store for items created offline (temporary) or by
/// the remote for everything it has accepted (authoritative).
pub type ItemId = u64;

/// An item that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// A stored inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub quantity: i64,
    /// Set while the item exists locally but the remote has not confirmed it.
    #[serde(default)]
    pub pending: bool,
}

impl Item {
    /// Attaches an identifier to a draft.
    pub fn from_draft(id: ItemId, draft: NewItem, pending: bool) -> Self {
        Self {
            id,
            name: draft.name,
            quantity: draft.quantity,
            pending,
        }
    }

    /// The item's fields without its identifier.
    pub fn draft(&self) -> NewItem {
        NewItem {
            name: self.name.clone(),
            quantity: self.quantity,
        }
    }

    pub fn with_pending(self, pending: bool) -> Self {
        Self { pending, ..self }
    }
}
