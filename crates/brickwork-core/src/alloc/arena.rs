use crate::profiling::profile_function;
use std::num::NonZeroU64;

/// A generational handle into an [`Arena`].
///
/// The upper 32 bits hold the generation, the lower 32 bits the slot index
/// plus one, so `Option<IndexSlot>` costs nothing extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexSlot(NonZeroU64);

impl IndexSlot {
    pub fn new(generation: u32, idx: u32) -> Self {
        let raw = ((generation as u64) << 32) | (idx as u64 + 1);
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn generation(&self) -> u32 {
        (self.0.get() >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        (self.0.get() & u32::MAX as u64) as u32 - 1
    }

    /// Raw packed value, stable for the lifetime of the entry.
    pub fn to_bits(&self) -> u64 {
        self.0.get()
    }
}

struct Entry<T> {
    generation: u32,
    data: Option<T>,
}

/// Generational arena.
///
/// Removing an entry bumps the slot generation, so handles to removed
/// entries resolve to `None` instead of aliasing whatever reuses the slot.
pub struct Arena<T> {
    vec: Vec<Entry<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub const fn new() -> Self {
        Self {
            vec: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, data: T) -> IndexSlot {
        self.insert_with(|_| data)
    }

    /// Insert a value that needs to know its own handle.
    pub fn insert_with(&mut self, make: impl FnOnce(IndexSlot) -> T) -> IndexSlot {
        profile_function!();
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            let entry = &mut self.vec[idx as usize];
            let slot = IndexSlot::new(entry.generation, idx);
            entry.data = Some(make(slot));
            slot
        } else {
            let idx = self.vec.len() as u32;
            let slot = IndexSlot::new(0, idx);
            self.vec.push(Entry {
                generation: 0,
                data: Some(make(slot)),
            });
            slot
        }
    }

    fn entry(&self, idx: IndexSlot) -> Option<&Entry<T>> {
        self.vec
            .get(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
    }

    pub fn get(&self, idx: IndexSlot) -> Option<&T> {
        self.entry(idx).and_then(|entry| entry.data.as_ref())
    }

    pub fn get_mut(&mut self, idx: IndexSlot) -> Option<&mut T> {
        self.vec
            .get_mut(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
            .and_then(|entry| entry.data.as_mut())
    }

    pub fn contains(&self, idx: IndexSlot) -> bool {
        self.get(idx).is_some()
    }

    pub fn remove(&mut self, idx: IndexSlot) -> Option<T> {
        profile_function!();
        let index = idx.index();
        let entry = self
            .vec
            .get_mut(index as usize)
            .filter(|entry| entry.generation == idx.generation())?;
        let data = entry.data.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(data)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (IndexSlot, &T)> {
        self.vec.iter().enumerate().filter_map(|(idx, entry)| {
            entry
                .data
                .as_ref()
                .map(|data| (IndexSlot::new(entry.generation, idx as u32), data))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (IndexSlot, &mut T)> {
        self.vec.iter_mut().enumerate().filter_map(|(idx, entry)| {
            let generation = entry.generation;
            entry
                .data
                .as_mut()
                .map(|data| (IndexSlot::new(generation, idx as u32), data))
        })
    }

    /// Handles of all live entries in slot order.
    pub fn keys(&self) -> Vec<IndexSlot> {
        self.iter().map(|(slot, _)| slot).collect()
    }
}

static_assertions::assert_eq_size!(IndexSlot, Option<IndexSlot>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_insert() {
        let mut arena = Arena::<u8>::new();
        let idx = arena.insert(15);
        assert_eq!(idx.generation(), 0);
        assert_eq!(idx.index(), 0);
        assert_eq!(arena.get(idx), Some(&15));
    }

    #[test]
    fn test_arena_stale_handle() {
        let mut arena = Arena::<u8>::new();
        let _ = arena.insert(15);
        let stale = IndexSlot::new(1, 0);
        assert_eq!(arena.get(stale), None);
    }

    #[test]
    fn test_arena_remove_reuses_slot() {
        let mut arena = Arena::<u8>::new();
        let idx = arena.insert(15);
        assert_eq!(arena.remove(idx), Some(15));
        let new_idx = arena.insert(45);
        assert_eq!(idx.index(), new_idx.index());
        assert_ne!(idx.generation(), new_idx.generation());
        assert_eq!(arena.get(idx), None);
        assert_eq!(arena.remove(idx), None);
    }

    #[test]
    fn test_arena_iter() {
        let mut arena = Arena::<u8>::new();
        let slots: Vec<_> = (0..100).map(|i| arena.insert(i)).collect();
        arena.remove(slots[0]);
        arena.remove(slots[1]);
        let collected: Vec<_> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(collected.len(), 98);
        for i in 2..100 {
            assert_eq!(collected[i - 2], i as u8);
        }
        assert_eq!(arena.len(), 98);
    }
}
