// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Keyed concurrent mapping

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

/// A concurrent map with value-copy reads.
///
/// Readers never observe torn values; `range` walks a snapshot, so a visitor
/// is free to mutate the map it is iterating and writes made mid-iteration
/// are not observed by that iteration.
pub struct SyncMap<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> SyncMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Insert a value, returning the previous one (swap semantics).
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, value)
    }

    /// Remove a key, returning the value it held.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }

    /// Return the existing value for `key`, or insert `value`.
    ///
    /// The boolean reports whether the key was already present.
    pub fn get_or_insert(&self, key: K, value: V) -> (V, bool) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match guard.get(&key) {
            Some(existing) => (existing.clone(), true),
            None => {
                guard.insert(key, value.clone());
                (value, false)
            }
        }
    }

    /// Replace the value for `key` only if it currently equals `current`.
    pub fn compare_and_swap(&self, key: &K, current: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match guard.get_mut(key) {
            Some(existing) if existing == current => {
                *existing = new;
                true
            }
            _ => false,
        }
    }

    /// Remove `key` only if its value currently equals `current`.
    pub fn compare_and_remove(&self, key: &K, current: &V) -> bool
    where
        V: PartialEq,
    {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match guard.get(key) {
            Some(existing) if existing == current => {
                guard.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Walk a snapshot of the map; the visitor returns whether to continue.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (key, value) in self.entries() {
            if !visit(&key, &value) {
                break;
            }
        }
    }

    /// Snapshot of all entries at the time of the call.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Snapshot of all keys at the time of the call.
    pub fn keys(&self) -> Vec<K> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl<K, V> Default for SyncMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "map_tests.rs"]
mod tests;
