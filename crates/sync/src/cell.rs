// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Copy-on-write cell for shared configuration values

use std::sync::RwLock;

/// A cell whose value is read by copy and replaced wholesale.
///
/// Readers never see a half-updated value. Intended for settings-like state
/// that is read on every pass and replaced rarely.
pub struct SyncCell<T> {
    inner: RwLock<T>,
}

impl<T: Clone> SyncCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub fn load(&self) -> T {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn store(&self, value: T) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = value;
    }

    /// Replace the value, returning the previous one.
    pub fn swap(&self, value: T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, value)
    }

    /// Replace the value only if it currently equals `current`.
    pub fn compare_and_swap(&self, current: &T, new: T) -> bool
    where
        T: PartialEq,
    {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if *guard == *current {
            *guard = new;
            true
        } else {
            false
        }
    }
}

impl<T: Clone + Default> Default for SyncCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
#[path = "cell_tests.rs"]
mod tests;
