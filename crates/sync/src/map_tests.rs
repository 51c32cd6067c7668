// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

use super::*;

#[test]
fn insert_get_remove() {
    let map: SyncMap<&str, u32> = SyncMap::new();

    assert!(map.is_empty());
    assert_eq!(map.insert("a", 1), None);
    assert_eq!(map.insert("a", 2), Some(1));
    assert!(map.contains(&"a"));
    assert_eq!(map.get(&"a"), Some(2));
    assert_eq!(map.len(), 1);

    assert_eq!(map.remove(&"a"), Some(2));
    assert_eq!(map.remove(&"a"), None);
    assert!(!map.contains(&"a"));
}

#[test]
fn get_or_insert_keeps_existing() {
    let map: SyncMap<&str, u32> = SyncMap::new();

    let (value, present) = map.get_or_insert("k", 1);
    assert_eq!((value, present), (1, false));

    let (value, present) = map.get_or_insert("k", 9);
    assert_eq!((value, present), (1, true));
    assert_eq!(map.get(&"k"), Some(1));
}

#[test]
fn compare_and_swap_requires_current() {
    let map: SyncMap<&str, u32> = SyncMap::new();
    map.insert("k", 1);

    assert!(!map.compare_and_swap(&"k", &5, 2));
    assert_eq!(map.get(&"k"), Some(1));

    assert!(map.compare_and_swap(&"k", &1, 2));
    assert_eq!(map.get(&"k"), Some(2));

    assert!(!map.compare_and_swap(&"missing", &2, 3));
}

#[test]
fn compare_and_remove_requires_current() {
    let map: SyncMap<&str, u32> = SyncMap::new();
    map.insert("k", 1);

    assert!(!map.compare_and_remove(&"k", &5));
    assert!(map.contains(&"k"));

    assert!(map.compare_and_remove(&"k", &1));
    assert!(!map.contains(&"k"));
}

#[test]
fn range_stops_when_visitor_returns_false() {
    let map: SyncMap<u32, u32> = SyncMap::new();
    for i in 0..10 {
        map.insert(i, i);
    }

    let mut visited = 0;
    map.range(|_, _| {
        visited += 1;
        visited < 3
    });
    assert_eq!(visited, 3);
}

#[test]
fn range_visitor_may_mutate_map() {
    let map: SyncMap<u32, u32> = SyncMap::new();
    for i in 0..5 {
        map.insert(i, i);
    }

    // Deleting while iterating must not deadlock or skip the snapshot.
    let mut visited = 0;
    map.range(|k, _| {
        visited += 1;
        map.remove(k);
        true
    });
    assert_eq!(visited, 5);
    assert!(map.is_empty());
}

#[test]
fn concurrent_writers_converge() {
    use std::sync::Arc;

    let map: Arc<SyncMap<u32, u32>> = Arc::new(SyncMap::new());
    let mut handles = Vec::new();
    for t in 0..4u32 {
        let map = Arc::clone(&map);
        handles.push(std::thread::spawn(move || {
            for i in 0..100 {
                map.insert(t * 100 + i, i);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(map.len(), 400);
}
