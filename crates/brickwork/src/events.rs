//! Grid events and the per-grid listener registry.

use crate::drag::GestureEvent;
use crate::grid::GridId;
use crate::item::ItemId;
use brickwork_core::host::ElementId;
use indexmap::IndexMap;

/// How a sort decision rearranges the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortAction {
    /// Remove the item and insert it at the target index.
    #[default]
    Move,
    /// Exchange the item with the one at the target index.
    Swap,
}

/// Payload of the send/receive family of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferInfo {
    pub item: ItemId,
    pub from_grid: GridId,
    pub from_index: usize,
    pub to_grid: GridId,
    pub to_index: usize,
}

/// Event kinds listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Synchronize,
    LayoutStart,
    LayoutEnd,
    Add,
    Remove,
    ShowStart,
    ShowEnd,
    HideStart,
    HideEnd,
    Filter,
    Sort,
    Move,
    BeforeSend,
    Send,
    BeforeReceive,
    Receive,
    DragInit,
    DragStart,
    DragMove,
    DragScroll,
    DragEnd,
    DragReleaseStart,
    DragReleaseEnd,
    Destroy,
}

/// An event emitted by a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    Synchronize,
    LayoutStart {
        items: Vec<ItemId>,
        instant: bool,
    },
    LayoutEnd {
        items: Vec<ItemId>,
    },
    Add {
        items: Vec<ItemId>,
    },
    Remove {
        items: Vec<ItemId>,
        indices: Vec<usize>,
    },
    ShowStart {
        items: Vec<ItemId>,
    },
    ShowEnd {
        items: Vec<ItemId>,
    },
    HideStart {
        items: Vec<ItemId>,
    },
    HideEnd {
        items: Vec<ItemId>,
    },
    Filter {
        shown: Vec<ItemId>,
        hidden: Vec<ItemId>,
    },
    Sort {
        current: Vec<ItemId>,
        previous: Vec<ItemId>,
    },
    Move {
        item: ItemId,
        from_index: usize,
        to_index: usize,
        action: SortAction,
    },
    BeforeSend(TransferInfo),
    Send(TransferInfo),
    BeforeReceive(TransferInfo),
    Receive(TransferInfo),
    DragInit {
        item: ItemId,
        event: GestureEvent,
    },
    DragStart {
        item: ItemId,
        event: GestureEvent,
    },
    DragMove {
        item: ItemId,
        event: GestureEvent,
    },
    DragScroll {
        item: ItemId,
        scroller: ElementId,
    },
    DragEnd {
        item: ItemId,
        event: GestureEvent,
    },
    DragReleaseStart {
        item: ItemId,
    },
    DragReleaseEnd {
        item: ItemId,
    },
    Destroy,
}

impl GridEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GridEvent::Synchronize => EventKind::Synchronize,
            GridEvent::LayoutStart { .. } => EventKind::LayoutStart,
            GridEvent::LayoutEnd { .. } => EventKind::LayoutEnd,
            GridEvent::Add { .. } => EventKind::Add,
            GridEvent::Remove { .. } => EventKind::Remove,
            GridEvent::ShowStart { .. } => EventKind::ShowStart,
            GridEvent::ShowEnd { .. } => EventKind::ShowEnd,
            GridEvent::HideStart { .. } => EventKind::HideStart,
            GridEvent::HideEnd { .. } => EventKind::HideEnd,
            GridEvent::Filter { .. } => EventKind::Filter,
            GridEvent::Sort { .. } => EventKind::Sort,
            GridEvent::Move { .. } => EventKind::Move,
            GridEvent::BeforeSend(_) => EventKind::BeforeSend,
            GridEvent::Send(_) => EventKind::Send,
            GridEvent::BeforeReceive(_) => EventKind::BeforeReceive,
            GridEvent::Receive(_) => EventKind::Receive,
            GridEvent::DragInit { .. } => EventKind::DragInit,
            GridEvent::DragStart { .. } => EventKind::DragStart,
            GridEvent::DragMove { .. } => EventKind::DragMove,
            GridEvent::DragScroll { .. } => EventKind::DragScroll,
            GridEvent::DragEnd { .. } => EventKind::DragEnd,
            GridEvent::DragReleaseStart { .. } => EventKind::DragReleaseStart,
            GridEvent::DragReleaseEnd { .. } => EventKind::DragReleaseEnd,
            GridEvent::Destroy => EventKind::Destroy,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GridEvent)>;

/// Ordered, synchronous listener dispatch per [`EventKind`].
#[derive(Default)]
pub struct EventBus {
    listeners: IndexMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
    destroyed: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners run in subscription order.
    ///
    /// A destroyed bus hands out ids but never calls the listener.
    pub fn subscribe(&mut self, kind: EventKind, listener: impl FnMut(&GridEvent) + 'static) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        if !self.destroyed {
            self.listeners
                .entry(kind)
                .or_default()
                .push((id, Box::new(listener)));
        }
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.listeners.get(&kind).is_some_and(|l| !l.is_empty())
    }

    pub fn emit(&mut self, event: &GridEvent) {
        if self.destroyed {
            return;
        }
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    /// Drop every listener and ignore all further emits.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for n in 0..3 {
            let log = log.clone();
            bus.subscribe(EventKind::Synchronize, move |_| log.borrow_mut().push(n));
        }
        bus.emit(&GridEvent::Synchronize);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = count.clone();
        let id = bus.subscribe(EventKind::Destroy, move |_| *counter.borrow_mut() += 1);
        assert!(bus.has_listeners(EventKind::Destroy));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&GridEvent::Destroy);
        assert_eq!(*count.borrow(), 0);
        assert!(!bus.has_listeners(EventKind::Destroy));
    }

    #[test]
    fn test_destroyed_bus_is_silent() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        bus.destroy();
        let counter = count.clone();
        bus.subscribe(EventKind::Synchronize, move |_| *counter.borrow_mut() += 1);
        bus.emit(&GridEvent::Synchronize);
        assert_eq!(*count.borrow(), 0);
        assert!(bus.is_destroyed());
    }
}
