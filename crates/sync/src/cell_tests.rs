// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

use super::*;

#[derive(Debug, Clone, Default, PartialEq)]
struct Settings {
    limit: u32,
    label: String,
}

#[test]
fn load_returns_copy() {
    let cell = SyncCell::new(Settings {
        limit: 3,
        label: "a".into(),
    });

    let mut copy = cell.load();
    copy.limit = 99;

    assert_eq!(cell.load().limit, 3);
}

#[test]
fn store_replaces_wholesale() {
    let cell = SyncCell::<Settings>::default();
    cell.store(Settings {
        limit: 7,
        label: "b".into(),
    });

    let loaded = cell.load();
    assert_eq!(loaded.limit, 7);
    assert_eq!(loaded.label, "b");
}

#[test]
fn swap_returns_previous() {
    let cell = SyncCell::new(1u32);
    assert_eq!(cell.swap(2), 1);
    assert_eq!(cell.load(), 2);
}

#[test]
fn compare_and_swap_checks_current() {
    let cell = SyncCell::new(1u32);
    assert!(!cell.compare_and_swap(&5, 9));
    assert_eq!(cell.load(), 1);

    assert!(cell.compare_and_swap(&1, 9));
    assert_eq!(cell.load(), 9);
}
