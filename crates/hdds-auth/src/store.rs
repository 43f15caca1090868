// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handle-keyed record store shared by the identity and handshake registries.
//!
//! The map lock is held only for insert/lookup/erase. Each record sits behind
//! its own lock so a caller can check and mutate one record atomically
//! without blocking unrelated handles.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

pub(crate) type Shared<R> = Arc<Mutex<R>>;

pub(crate) struct HandleStore<R> {
    records: Mutex<HashMap<u64, Shared<R>>>,
}

impl<R> HandleStore<R> {
    pub(crate) fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn insert(&self, handle: u64, record: R) {
        self.records
            .lock()
            .insert(handle, Arc::new(Mutex::new(record)));
    }

    /// Short-lived shared reference to the record, if the handle is live.
    pub(crate) fn get(&self, handle: u64) -> Option<Shared<R>> {
        self.records.lock().get(&handle).cloned()
    }

    pub(crate) fn contains(&self, handle: u64) -> bool {
        self.records.lock().contains_key(&handle)
    }

    pub(crate) fn remove(&self, handle: u64) -> Option<Shared<R>> {
        self.records.lock().remove(&handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let store = HandleStore::new();
        store.insert(1, "a".to_string());
        store.insert(2, "b".to_string());

        assert_eq!(store.len(), 2);
        assert!(store.contains(1));
        assert_eq!(*store.get(2).expect("live handle").lock(), "b");

        let removed = store.remove(1).expect("removed");
        assert_eq!(*removed.lock(), "a");
        assert!(store.get(1).is_none());
        assert!(store.remove(1).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_mutation_visible_through_store() {
        let store = HandleStore::new();
        store.insert(9, 0u32);
        if let Some(record) = store.get(9) {
            *record.lock() += 5;
        }
        assert_eq!(*store.get(9).expect("live").lock(), 5);
    }
}
