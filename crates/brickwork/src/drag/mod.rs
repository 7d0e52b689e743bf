//! Drag controller.
//!
//! Gestures arrive through [`GridSystem::handle_gesture`]. A gesture stays
//! pending until the grid's [`DragStartPredicate`] resolves it; after that
//! every move accumulates displacement and is applied in the next frame,
//! and the [`DragSortPredicate`] is consulted on a debounce to reorder the
//! item or move it into another grid.

mod gesture;
mod predicate;

pub use gesture::{GestureEvent, GesturePhase};
pub use predicate::{
    DefaultSortPredicate, DefaultStartPredicate, DragSortPredicate, DragStartPredicate, SortContext,
    SortDecision, StartContext, StartDecision, StartState, overlap_score,
};

use crate::config::{DragAxis, DragSort, GridSettings};
use crate::events::{GridEvent, SortAction, TransferInfo};
use crate::grid::{GridId, GridSystem, LayoutTrigger, SendOptions, Tick, move_in_place, normalize_index};
use crate::item::ItemId;
use crate::scheduler::TickKind;
use crate::timer::Debounce;
use brickwork_core::host::{self, ElementId};
use brickwork_core::math::Vec2;
use brickwork_core::profiling::profile_function;
use std::sync::Arc;

/// Distance the pointer must travel after a reorder before the item may
/// sort back into the index it just left.
const BOUNCE_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StartPhase {
    #[default]
    Idle,
    Pending,
    Resolved,
    Rejected,
}

/// Per-item drag session.
#[derive(Debug, Clone)]
pub struct ItemDrag {
    origin: GridId,
    phase: StartPhase,
    start_state: StartState,
    started_at: f32,
    active: bool,
    migrated: bool,
    last_event: Option<GestureEvent>,
    prev_delta: Vec2,
    /// Translate inside the drag container.
    left: Vec2,
    /// Position relative to the grid element.
    grid_pos: Vec2,
    /// Client position of the element's border box.
    client: Vec2,
    container: Option<ElementId>,
    container_diff: Vec2,
    scrollers: Vec<ElementId>,
    blocked_index: Option<usize>,
    since_sort: Vec2,
    pub(crate) sort_debounce: Debounce,
}

impl ItemDrag {
    pub(crate) fn new(origin: GridId, sort_interval: f32) -> Self {
        Self {
            origin,
            phase: StartPhase::Idle,
            start_state: StartState::default(),
            started_at: 0.0,
            active: false,
            migrated: false,
            last_event: None,
            prev_delta: Vec2::ZERO,
            left: Vec2::ZERO,
            grid_pos: Vec2::ZERO,
            client: Vec2::ZERO,
            container: None,
            container_diff: Vec2::ZERO,
            scrollers: Vec::new(),
            blocked_index: None,
            since_sort: Vec2::ZERO,
            sort_debounce: Debounce::new(sort_interval),
        }
    }

    /// Forget the session but keep the origin grid and timer settings.
    fn reset(&mut self) {
        *self = Self::new(self.origin, self.sort_debounce.delay());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Waiting for the start predicate.
    pub fn is_pending(&self) -> bool {
        self.phase == StartPhase::Pending
    }

    /// Grid the session belongs to, even after the item moved into another.
    pub fn origin_grid(&self) -> GridId {
        self.origin
    }

    /// The item was moved into another grid during this session.
    pub fn is_migrated(&self) -> bool {
        self.migrated
    }

    pub fn client_position(&self) -> Vec2 {
        self.client
    }

    pub fn grid_position(&self) -> Vec2 {
        self.grid_pos
    }

    pub fn last_event(&self) -> Option<&GestureEvent> {
        self.last_event.as_ref()
    }

    pub(crate) fn needs_frame(&self) -> bool {
        self.is_pending() || self.sort_debounce.is_pending()
    }
}

impl GridSystem {
    /// Feed a gesture event for the item under the pointer.
    pub fn handle_gesture(&mut self, id: ItemId, event: GestureEvent) {
        let now = self.clock;
        let Some(drag) = self.item_mut(id).and_then(|item| item.drag.as_mut()) else {
            return;
        };
        drag.last_event = Some(event);

        if event.is_final {
            self.gesture_end(id, event);
            return;
        }
        if drag.phase == StartPhase::Idle {
            drag.phase = StartPhase::Pending;
            drag.started_at = now;
            drag.start_state = StartState::default();
        }
        let (phase, active) = (drag.phase, drag.active);
        match phase {
            StartPhase::Pending => self.recheck_start_predicate(id),
            StartPhase::Resolved if active => self.drag_move(id),
            _ => {}
        }
    }

    /// Run the start predicate against the latest event.
    pub(crate) fn recheck_start_predicate(&mut self, id: ItemId) {
        let Some(settings) = self.item_settings(id) else {
            return;
        };
        let now = self.clock;
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        let element = item.element;
        let Some(drag) = item.drag.as_mut().filter(|drag| drag.is_pending()) else {
            return;
        };
        let Some(event) = drag.last_event else {
            return;
        };
        let mut state = std::mem::take(&mut drag.start_state);
        let elapsed = (now - drag.started_at).max(event.elapsed);
        let decision = settings.drag_start_predicate.check(
            &StartContext {
                host: host.as_ref(),
                item: id,
                element,
                event: &event,
                elapsed,
            },
            &mut state,
        );
        drag.start_state = state;
        match decision {
            StartDecision::Pending => {}
            StartDecision::Reject => drag.phase = StartPhase::Rejected,
            StartDecision::Start => {
                drag.phase = StartPhase::Resolved;
                self.drag_start(id, event);
            }
        }
    }

    fn gesture_end(&mut self, id: ItemId, event: GestureEvent) {
        let Some(settings) = self.item_settings(id) else {
            return;
        };
        let now = self.clock;
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        let element = item.element;
        let Some(drag) = item.drag.as_mut() else {
            return;
        };
        let elapsed = (now - drag.started_at).max(event.elapsed);
        let mut state = std::mem::take(&mut drag.start_state);
        settings.drag_start_predicate.finish(
            &StartContext {
                host: host.as_ref(),
                item: id,
                element,
                event: &event,
                elapsed,
            },
            &mut state,
        );
        let resolved = drag.phase == StartPhase::Resolved && drag.active;
        drag.phase = StartPhase::Idle;
        if resolved {
            self.drag_end(id, event);
        }
    }

    fn drag_start(&mut self, id: ItemId, event: GestureEvent) {
        profile_function!();
        let Some(settings) = self.item_settings(id) else {
            return;
        };
        let host = self.host.clone();
        let Some(item) = self.item(id) else {
            return;
        };
        if !item.is_active() {
            return;
        }
        let (grid, element) = (item.grid, item.element);
        let Some(grid_element) = self.grid(grid).map(|g| g.element()) else {
            return;
        };

        let mut translate = host::translate(host.as_ref(), element);
        self.stop_item_layout(id, true, Some(translate));
        if let Some(diff) = self.item(id).filter(|i| i.migrate.active).map(|i| i.migrate.container_diff) {
            translate -= diff;
            self.migrate_stop(id, true, Some(translate));
        }
        if let Some(item) = self.item_mut(id)
            && item.release.active
        {
            item.release = Default::default();
            host.remove_class(element, &settings.classes.releasing);
        }

        let container = settings.drag_container.unwrap_or(grid_element);
        let parent = host.parent(element).unwrap_or(grid_element);
        let translate = host::translate(host.as_ref(), element);
        let grid_pos = translate - host::offset_diff(host.as_ref(), parent, grid_element);
        let container_diff = host::offset_diff(host.as_ref(), container, grid_element);
        let left = grid_pos + container_diff;
        if parent != container {
            host.append_child(container, element);
            host::set_translate(host.as_ref(), element, left);
        }
        let rect = host.bounding_rect(element);

        let mut scrollers = host.scroll_parents(container);
        for scroller in host.scroll_parents(grid_element) {
            if !scrollers.contains(&scroller) {
                scrollers.push(scroller);
            }
        }

        let Some(drag) = self.item_mut(id).and_then(|item| item.drag.as_mut()) else {
            return;
        };
        drag.active = true;
        drag.migrated = false;
        drag.prev_delta = event.delta;
        drag.left = left;
        drag.grid_pos = grid_pos;
        drag.client = Vec2::new(rect.x, rect.y);
        drag.container = Some(container);
        drag.container_diff = container_diff;
        drag.scrollers = scrollers;
        drag.blocked_index = None;
        drag.since_sort = Vec2::ZERO;
        let origin = drag.origin;

        host.add_class(element, &settings.classes.dragging);
        tracing::debug!("Drag started for {} in {}", id, origin);
        self.emit(origin, GridEvent::DragInit { item: id, event });
        self.emit(origin, GridEvent::DragStart { item: id, event });
    }

    fn drag_move(&mut self, id: ItemId) {
        if !self.item(id).is_some_and(|item| item.is_active()) {
            self.drag_stop(id);
            return;
        }
        self.schedule(TickKind::Move, id, Tick::Move);
    }

    /// Read phase of a move tick: fold the latest event into the position.
    pub(crate) fn drag_prepare_move(&mut self, id: ItemId) {
        let Some(settings) = self.origin_settings(id) else {
            return;
        };
        let now = self.clock;
        let Some(drag) = self
            .item_mut(id)
            .and_then(|item| item.drag.as_mut())
            .filter(|drag| drag.active)
        else {
            return;
        };
        let Some(event) = drag.last_event else {
            return;
        };
        let mut diff = event.delta - drag.prev_delta;
        drag.prev_delta = event.delta;
        match settings.drag_axis {
            DragAxis::Both => {}
            DragAxis::X => diff.y = 0.0,
            DragAxis::Y => diff.x = 0.0,
        }
        drag.left += diff;
        drag.grid_pos += diff;
        drag.client += diff;
        drag.since_sort += diff;
        if drag.since_sort.length() >= BOUNCE_DISTANCE {
            drag.blocked_index = None;
        }
        if !matches!(settings.drag_sort, DragSort::Disabled) && drag.sort_debounce.trigger(now) {
            self.check_overlap(id);
        }
    }

    pub(crate) fn drag_apply_move(&mut self, id: ItemId) {
        let Some(item) = self.item(id) else {
            return;
        };
        let Some(drag) = item.drag.as_ref().filter(|drag| drag.active) else {
            return;
        };
        let (origin, left, event) = (drag.origin, drag.left, drag.last_event);
        host::set_translate(self.host.as_ref(), item.element, left);
        if let Some(event) = event {
            self.emit(origin, GridEvent::DragMove { item: id, event });
        }
    }

    /// Notify the system that `scroller` scrolled.
    pub fn handle_scroll(&mut self, scroller: ElementId) {
        let dragged: Vec<ItemId> = self
            .items
            .iter()
            .filter(|(_, item)| {
                item.drag
                    .as_ref()
                    .is_some_and(|drag| drag.active && drag.scrollers.contains(&scroller))
            })
            .map(|(_, item)| item.id)
            .collect();
        for id in dragged {
            self.schedule(TickKind::Scroll, id, Tick::Scroll { scroller });
        }
    }

    /// Read phase of a scroll tick: keep the element under the pointer.
    pub(crate) fn drag_prepare_scroll(&mut self, id: ItemId) {
        let Some(settings) = self.origin_settings(id) else {
            return;
        };
        let host = self.host.clone();
        let now = self.clock;
        let Some(item) = self.item(id) else {
            return;
        };
        let element = item.element;
        let Some(grid_element) = self.grid(item.grid).map(|g| g.element()) else {
            return;
        };
        let Some(drag) = self
            .item_mut(id)
            .and_then(|item| item.drag.as_mut())
            .filter(|drag| drag.active)
        else {
            return;
        };
        let container = drag.container.unwrap_or(grid_element);
        drag.container_diff = host::offset_diff(host.as_ref(), container, grid_element);
        let rect = host.bounding_rect(element);
        let applied = host::translate(host.as_ref(), element);
        drag.left = applied + (drag.client - Vec2::new(rect.x, rect.y));
        drag.grid_pos = drag.left - drag.container_diff;
        if !matches!(settings.drag_sort, DragSort::Disabled) && drag.sort_debounce.trigger(now) {
            self.check_overlap(id);
        }
    }

    pub(crate) fn drag_apply_scroll(&mut self, id: ItemId, scroller: ElementId) {
        let Some(item) = self.item(id) else {
            return;
        };
        let Some(drag) = item.drag.as_ref().filter(|drag| drag.active) else {
            return;
        };
        let (origin, left) = (drag.origin, drag.left);
        host::set_translate(self.host.as_ref(), item.element, left);
        self.emit(origin, GridEvent::DragScroll { item: id, scroller });
    }

    fn origin_settings(&self, id: ItemId) -> Option<Arc<GridSettings>> {
        let origin = self.item(id)?.drag.as_ref()?.origin;
        self.grid(origin)
            .map(|grid| grid.settings.clone())
            .or_else(|| self.item_settings(id))
    }

    /// Ask the sort predicate where the dragged item belongs and apply the
    /// answer.
    pub(crate) fn check_overlap(&mut self, id: ItemId) {
        profile_function!();
        let Some(settings) = self.origin_settings(id) else {
            return;
        };
        let Some(item) = self.item(id) else {
            return;
        };
        let Some(drag) = item.drag.as_ref().filter(|drag| drag.active) else {
            return;
        };
        if !item.is_active() {
            return;
        }
        let event = drag.last_event;
        let blocked = drag.blocked_index;
        let container = drag.container;
        let current_grid = item.grid;
        let Some(decision) = settings.drag_sort_predicate.check(&SortContext {
            system: self,
            item: id,
            event: event.as_ref(),
        }) else {
            return;
        };

        let (Some(current), Some(target)) = (self.grid(current_grid), self.grid(decision.grid)) else {
            return;
        };
        let Some(current_index) = current.items.iter().position(|i| *i == id) else {
            return;
        };
        let is_migration = current_grid != decision.grid;
        let target_index = normalize_index(target.items.len(), decision.index, is_migration);

        if !is_migration {
            if blocked == Some(target_index) || current_index == target_index {
                return;
            }
            if let Some(grid) = self.grid_mut(current_grid) {
                match decision.action {
                    SortAction::Move => move_in_place(&mut grid.items, current_index, target_index),
                    SortAction::Swap => grid.items.swap(current_index, target_index),
                }
            }
            if let Some(drag) = self.item_mut(id).and_then(|item| item.drag.as_mut()) {
                drag.blocked_index = Some(current_index);
                drag.since_sort = Vec2::ZERO;
            }
            self.emit(
                current_grid,
                GridEvent::Move {
                    item: id,
                    from_index: current_index,
                    to_index: target_index,
                    action: decision.action,
                },
            );
            self.layout(current_grid, LayoutTrigger::Animated);
            return;
        }

        let target_grid = decision.grid;
        let displaced = target.items.get(target_index).copied();
        let info = TransferInfo {
            item: id,
            from_grid: current_grid,
            from_index: current_index,
            to_grid: target_grid,
            to_index: target_index,
        };
        self.emit(current_grid, GridEvent::BeforeSend(info));
        self.emit(target_grid, GridEvent::BeforeReceive(info));

        if let Some(grid) = self.grid_mut(current_grid) {
            grid.items.retain(|i| *i != id);
        }
        if let Some(grid) = self.grid_mut(target_grid) {
            let index = target_index.min(grid.items.len());
            grid.items.insert(index, id);
        }
        if let Some(item) = self.item_mut(id) {
            item.grid = target_grid;
            item.sort_data = None;
            if let Some(drag) = item.drag.as_mut() {
                drag.migrated = target_grid != drag.origin;
                drag.blocked_index = None;
            }
        }
        tracing::debug!("{} dragged from {} into {}", id, current_grid, target_grid);
        self.emit(current_grid, GridEvent::Send(info));
        self.emit(target_grid, GridEvent::Receive(info));

        if decision.action == SortAction::Swap
            && let Some(displaced) = displaced
            && self.item(displaced).is_some_and(|item| item.is_active() && item.grid == target_grid)
        {
            let mut options = SendOptions::default()
                .layout_sender(LayoutTrigger::Skip)
                .layout_receiver(LayoutTrigger::Skip);
            if let Some(container) = container {
                options = options.append_to(container);
            }
            self.send(target_grid, displaced, current_grid, current_index as isize, options);
        }

        self.layout(current_grid, LayoutTrigger::Animated);
        self.layout(target_grid, LayoutTrigger::Animated);
    }

    fn drag_end(&mut self, id: ItemId, event: GestureEvent) {
        profile_function!();
        if !self.item(id).is_some_and(|item| item.is_active()) {
            self.drag_stop(id);
            return;
        }
        self.cancel_tick(TickKind::Move, id);
        self.cancel_tick(TickKind::Scroll, id);
        let sort_pending = self
            .item_mut(id)
            .and_then(|item| item.drag.as_mut())
            .is_some_and(|drag| drag.sort_debounce.finish());
        if sort_pending {
            self.check_overlap(id);
        }

        let settings = self.origin_settings(id);
        let Some(item) = self.item_mut(id) else {
            return;
        };
        let element = item.element;
        let Some(drag) = item.drag.as_mut() else {
            return;
        };
        let (origin, migrated, diff) = (drag.origin, drag.migrated, drag.container_diff);
        drag.reset();
        item.release.container_diff = diff;
        if let Some(settings) = settings {
            self.host.remove_class(element, &settings.classes.dragging);
        }
        tracing::debug!("Drag ended for {}", id);
        self.emit(origin, GridEvent::DragEnd { item: id, event });

        if migrated {
            self.finish_drag_migration(id);
        } else {
            self.release_start(id);
        }
    }

    /// Settle an item that was dropped into another grid: move it into that
    /// grid's drag container and release it there.
    fn finish_drag_migration(&mut self, id: ItemId) {
        let origin_settings = self.origin_settings(id);
        let Some(target_settings) = self.item_settings(id) else {
            return;
        };
        let host = self.host.clone();
        let Some(item) = self.item(id) else {
            return;
        };
        let (target_grid, element, child, active) = (item.grid, item.element, item.child, item.is_active());
        let Some(target_element) = self.grid(target_grid).map(|g| g.element()) else {
            return;
        };
        self.cancel_tick(TickKind::Move, id);
        self.cancel_tick(TickKind::Scroll, id);

        let origin_classes = origin_settings
            .as_ref()
            .map(|settings| settings.classes.clone())
            .unwrap_or_else(|| target_settings.classes.clone());
        let classes = &target_settings.classes;
        host.remove_class(element, &origin_classes.dragging);
        if origin_classes.item != classes.item {
            host.remove_class(element, &origin_classes.item);
            host.add_class(element, &classes.item);
        }
        if origin_classes.shown != classes.shown {
            host.remove_class(element, &origin_classes.shown);
            host.add_class(element, &classes.shown);
        }

        let container = target_settings.drag_container.unwrap_or(target_element);
        let mut translate = host::translate(host.as_ref(), element);
        let current = host.parent(element);
        let moved = current.is_some_and(|current| current != container);
        if let Some(current) = current
            && moved
        {
            host.append_child(container, element);
            translate -= host::offset_diff(host.as_ref(), current, container);
        }

        let container_diff = host::offset_diff(host.as_ref(), container, target_element);
        if let Some(item) = self.item_mut(id) {
            item.drag = target_settings
                .drag_enabled
                .then(|| ItemDrag::new(target_grid, target_settings.drag_sort_interval));
            item.release.container_diff = container_diff;
        }
        self.refresh_dimensions(id, false);
        self.compute_sort_data(id);
        if moved {
            host::set_translate(host.as_ref(), element, translate);
        }
        if let Some(child) = child {
            host::set_styles(host.as_ref(), child, target_settings.visibility_styles(active));
        }
        self.release_start(id);
    }

    /// Abort a drag without committing anything further. The element goes
    /// back into its grid element at its grid-relative position.
    pub(crate) fn drag_stop(&mut self, id: ItemId) {
        let Some(item) = self.item(id) else {
            return;
        };
        let Some(drag) = item.drag.as_ref().filter(|drag| drag.active) else {
            return;
        };
        if drag.migrated {
            self.finish_drag_migration(id);
            return;
        }
        let settings = self.origin_settings(id);
        self.cancel_tick(TickKind::Move, id);
        self.cancel_tick(TickKind::Scroll, id);

        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        let (grid, element) = (item.grid, item.element);
        let Some(drag) = item.drag.as_mut() else {
            return;
        };
        let grid_pos = drag.grid_pos;
        drag.reset();
        if let Some(grid_element) = self.grid(grid).map(|g| g.element())
            && host.parent(element) != Some(grid_element)
        {
            host.append_child(grid_element, element);
            host::set_translate(host.as_ref(), element, grid_pos);
        }
        if let Some(settings) = settings {
            host.remove_class(element, &settings.classes.dragging);
        }
        tracing::debug!("Drag of {} aborted", id);
    }
}
