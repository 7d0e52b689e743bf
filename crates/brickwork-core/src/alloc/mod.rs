//! Arenas and hash collections.
//!
//! Grids and items live in generational [`Arena`]s; lookups keyed by their
//! handles use the AHash-backed [`HashMap`].

pub mod arena;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use arena::{Arena, IndexSlot};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keyed_map_drops_stale_handles() {
        let mut arena = Arena::new();
        let mut names: HashMap<IndexSlot, &str> = HashMap::new();
        let first = arena.insert(1);
        names.insert(first, "first");

        arena.remove(first);
        let second = arena.insert(2);
        names.insert(second, "second");

        // The reused index carries a new generation, so the old key misses.
        assert_eq!(first.index(), second.index());
        assert_eq!(names.len(), 2);
        assert!(arena.get(first).is_none());
        assert_eq!(names.get(&second), Some(&"second"));
    }

    #[test]
    fn test_slot_set() {
        let mut arena = Arena::new();
        let slots: HashSet<IndexSlot> = (0..3).map(|n| arena.insert(n)).collect();
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|slot| arena.contains(*slot)));
    }
}
