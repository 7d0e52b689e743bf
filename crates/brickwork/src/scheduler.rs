//! Frame-paced read/write batching.
//!
//! Work that measures the document (reads) and work that mutates it (writes)
//! is registered per key and flushed once per frame: every read of a batch
//! runs before any write, so the document is never measured in the middle of
//! being restyled.

use crate::item::ItemId;
use brickwork_core::profiling::profile_function;
use indexmap::IndexMap;
use std::hash::Hash;

/// Kinds of per-item frame work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    Layout,
    Visibility,
    Move,
    Scroll,
}

/// Scheduler key: one pending task per kind and item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickKey {
    pub kind: TickKind,
    pub item: ItemId,
}

impl TickKey {
    pub fn new(kind: TickKind, item: ItemId) -> Self {
        Self { kind, item }
    }
}

/// Keys that can jump the queue.
pub trait SchedulerKey: Copy + Eq + Hash {
    fn is_priority(&self) -> bool;
}

impl SchedulerKey for TickKey {
    fn is_priority(&self) -> bool {
        matches!(self.kind, TickKind::Move | TickKind::Scroll)
    }
}

/// Keyed queue of pending frame tasks.
pub struct FrameScheduler<K, T> {
    tasks: IndexMap<K, T>,
    batch_size: usize,
}

impl<K: SchedulerKey, T> FrameScheduler<K, T> {
    pub fn new(batch_size: usize) -> Self {
        Self {
            tasks: IndexMap::new(),
            batch_size: batch_size.max(1),
        }
    }

    /// Register a task, replacing and requeueing any task with the same key.
    /// Priority keys go to the front, everything else to the back.
    pub fn register(&mut self, key: K, task: T) {
        self.tasks.shift_remove(&key);
        if key.is_priority() {
            self.tasks.shift_insert(0, key, task);
        } else {
            self.tasks.insert(key, task);
        }
    }

    /// Remove a task that has not been drained yet.
    pub fn cancel(&mut self, key: &K) -> Option<T> {
        self.tasks.shift_remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tasks.contains_key(key)
    }

    /// Take up to one batch of tasks in queue order.
    pub fn drain(&mut self) -> Vec<(K, T)> {
        profile_function!();
        let count = self.tasks.len().min(self.batch_size);
        let batch: Vec<(K, T)> = self.tasks.drain(..count).collect();
        if !batch.is_empty() {
            tracing::trace!(
                "Draining {} frame tasks, {} left",
                batch.len(),
                self.tasks.len()
            );
        }
        batch
    }

    pub fn needs_frame(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
