//! FIFO callback queues attached to item transitions.

use crate::item::ItemId;

/// Handle to a pending group of per-item completions (one layout pass, one
/// show/hide call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) u64);

/// Called once with `(interrupted, item)`.
pub type ItemCallbackFn = Box<dyn FnOnce(bool, ItemId)>;

/// A queued completion.
pub enum ItemCallback {
    /// User supplied closure.
    User(ItemCallbackFn),
    /// Counts towards a pending group owned by the grid system.
    Group(GroupId),
}

impl std::fmt::Debug for ItemCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemCallback::User(_) => f.write_str("User(..)"),
            ItemCallback::Group(id) => write!(f, "Group({})", id.0),
        }
    }
}

/// Callbacks waiting for a transition to end.
///
/// Flushing takes the whole queue first, so callbacks added while the
/// previous batch runs wait for the next flush.
#[derive(Debug, Default)]
pub struct CallbackQueue {
    callbacks: Vec<ItemCallback>,
}

impl CallbackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: ItemCallback) {
        self.callbacks.push(callback);
    }

    pub fn push_opt(&mut self, callback: Option<ItemCallback>) {
        if let Some(callback) = callback {
            self.push(callback);
        }
    }

    pub fn take(&mut self) -> Vec<ItemCallback> {
        std::mem::take(&mut self.callbacks)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empties_queue() {
        let mut queue = CallbackQueue::new();
        queue.push(ItemCallback::Group(GroupId(1)));
        queue.push_opt(None);
        queue.push_opt(Some(ItemCallback::Group(GroupId(2))));
        assert_eq!(queue.len(), 2);

        let taken = queue.take();
        assert_eq!(taken.len(), 2);
        assert!(queue.is_empty());
        assert!(matches!(taken[0], ItemCallback::Group(GroupId(1))));
    }
}
