//! Per-entry data store.
//!
//! Holds the runtime object an integration creates for each loaded config
//! entry (typically its hub connection), keyed by [`EntryId`]. The store is
//! owned by the composition root; integrations look handles up instead of
//! keeping their own copies.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use pulsehub_domain::id::EntryId;

pub struct EntryStore<T> {
    entries: RwLock<HashMap<EntryId, Arc<T>>>,
}

impl<T> EntryStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register `value` under `entry_id`, returning the handle it replaced.
    pub fn insert(&self, entry_id: EntryId, value: Arc<T>) -> Option<Arc<T>> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(entry_id, value)
    }

    /// Object stored for `entry_id`.
    #[must_use]
    pub fn get(&self, entry_id: EntryId) -> Option<Arc<T>> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&entry_id)
            .cloned()
    }

    /// Remove and return the object stored for `entry_id`.
    pub fn remove(&self, entry_id: EntryId) -> Option<Arc<T>> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&entry_id)
    }

    #[must_use]
    pub fn contains(&self, entry_id: EntryId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(&entry_id)
    }

    /// Number of loaded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for EntryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_inserted_handle() {
        let store = EntryStore::new();
        let entry = EntryId::new();
        store.insert(entry, Arc::new("hub"));

        assert!(store.contains(entry));
        assert_eq!(store.get(entry).as_deref(), Some(&"hub"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn should_share_the_same_handle() {
        let store = EntryStore::new();
        let entry = EntryId::new();
        let handle = Arc::new(42);
        store.insert(entry, Arc::clone(&handle));

        let looked_up = store.get(entry).unwrap();
        assert!(Arc::ptr_eq(&handle, &looked_up));
    }

    #[test]
    fn should_replace_existing_handle() {
        let store = EntryStore::new();
        let entry = EntryId::new();
        store.insert(entry, Arc::new(1));

        let previous = store.insert(entry, Arc::new(2));
        assert_eq!(previous.as_deref(), Some(&1));
        assert_eq!(store.get(entry).as_deref(), Some(&2));
    }

    #[test]
    fn should_forget_removed_entry() {
        let store = EntryStore::new();
        let entry = EntryId::new();
        store.insert(entry, Arc::new("hub"));

        assert!(store.remove(entry).is_some());
        assert!(store.get(entry).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn should_return_none_for_unknown_entry() {
        let store: EntryStore<()> = EntryStore::default();
        assert!(store.get(EntryId::new()).is_none());
        assert!(store.remove(EntryId::new()).is_none());
    }
}
