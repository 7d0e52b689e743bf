//! Generational arena tests.
//!
//! These tests verify generation counter increments, stale handle detection
//! and slot reuse.

use brickwork_core::alloc::{Arena, IndexSlot};

#[test]
fn test_insert_and_get() {
    let mut arena = Arena::new();

    let idx = arena.insert(42);
    assert_eq!(arena.get(idx), Some(&42));

    let idx2 = arena.insert(100);
    assert_eq!(arena.get(idx2), Some(&100));

    // Original value should still be accessible
    assert_eq!(arena.get(idx), Some(&42));
}

#[test]
fn test_insert_with_sees_own_handle() {
    let mut arena = Arena::new();

    let idx = arena.insert_with(|slot| slot.index());
    assert_eq!(arena.get(idx), Some(&0));
}

#[test]
fn test_get_mut() {
    let mut arena = Arena::new();

    let idx = arena.insert(42);
    if let Some(value) = arena.get_mut(idx) {
        *value = 100;
    }

    assert_eq!(arena.get(idx), Some(&100));
}

#[test]
fn test_out_of_range_returns_none() {
    let arena = Arena::<i32>::new();
    assert_eq!(arena.get(IndexSlot::new(0, 999)), None);
    assert!(!arena.contains(IndexSlot::new(0, 999)));
}

#[test]
fn test_generation_increments_on_reuse() {
    let mut arena = Arena::new();

    let first = arena.insert("a");
    arena.remove(first);
    let second = arena.insert("b");
    arena.remove(second);
    let third = arena.insert("c");

    assert_eq!(first.index(), third.index());
    assert_eq!(third.generation(), 2);
    assert_eq!(arena.get(first), None);
    assert_eq!(arena.get(second), None);
    assert_eq!(arena.get(third), Some(&"c"));
}

#[test]
fn test_keys_skip_removed() {
    let mut arena = Arena::new();
    let a = arena.insert(1);
    let b = arena.insert(2);
    let c = arena.insert(3);

    arena.remove(b);

    assert_eq!(arena.keys(), vec![a, c]);
    assert_eq!(arena.len(), 2);
    assert!(!arena.is_empty());
}

#[test]
fn test_bits_roundtrip_distinct() {
    let a = IndexSlot::new(0, 0);
    let b = IndexSlot::new(1, 0);
    assert_ne!(a.to_bits(), b.to_bits());
    assert_eq!(b.generation(), 1);
    assert_eq!(b.index(), 0);
}
