//! Local order registry
//!
//! The list of order ids this device placed, most recent first. The backend
//! has no notion of session ownership, so this list is the only way a
//! customer finds "their" orders again.

use crate::storage::{LocalStoreExt, SharedStore, keys};

pub struct OrderRegistry {
    ids: Vec<String>,
    store: SharedStore,
}

impl OrderRegistry {
    /// Read the persisted list once; duplicates from older writes are dropped.
    pub fn load(store: SharedStore) -> Self {
        let raw = match store.get_json::<Vec<String>>(keys::MY_ORDERS) {
            Ok(ids) => ids.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable order registry");
                Vec::new()
            }
        };

        let mut ids: Vec<String> = Vec::with_capacity(raw.len());
        for id in raw {
            if !id.is_empty() && !ids.contains(&id) {
                ids.push(id);
            }
        }

        Self { ids, store }
    }

    /// Prepend an id unless already known; returns whether it was inserted.
    pub fn register_order(&mut self, id: &str) -> bool {
        if id.is_empty() || self.contains(id) {
            return false;
        }
        self.ids.insert(0, id.to_string());
        tracing::info!(order_id = %id, "Order registered locally");
        self.persist();
        true
    }

    /// Remove an id; returns whether it was present.
    pub fn forget_order(&mut self, id: &str) -> bool {
        self.forget_many(std::slice::from_ref(&id)) == 1
    }

    /// Remove several ids with a single write; returns how many were removed.
    pub fn forget_many<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let before = self.ids.len();
        self.ids
            .retain(|known| !ids.iter().any(|id| AsRef::<str>::as_ref(id) == known.as_str()));
        let removed = before - self.ids.len();
        if removed > 0 {
            tracing::info!(removed, remaining = self.ids.len(), "Pruned orders from registry");
            self.persist();
        }
        removed
    }

    /// Current ids, most recent first
    pub fn load_all(&self) -> Vec<String> {
        self.ids.clone()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    fn persist(&self) {
        if let Err(e) = self.store.set_json(keys::MY_ORDERS, &self.ids) {
            tracing::warn!(error = %e, "Failed to persist order registry");
        }
    }
}

impl std::fmt::Debug for OrderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderRegistry").field("ids", &self.ids).finish()
    }
}
