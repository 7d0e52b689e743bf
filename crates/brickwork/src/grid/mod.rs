//! Grids and the system that owns them.
//!
//! [`GridSystem`] owns every grid and item, the frame scheduler and the
//! clock. All public operations are methods on it and take a [`GridId`];
//! the host application feeds it frames, gestures, scroll and resize
//! notifications.

mod ops;
mod target;

pub use ops::{
    AddOptions, FilterBy, FilterCallback, FilterOptions, LayoutCallback, LayoutOutcome,
    LayoutTrigger, MoveOptions, RemoveOptions, SendOptions, SortOptions, VisibilityCallback,
    VisibilityOptions,
};
pub use target::{ItemTarget, normalize_index};
pub(crate) use target::move_in_place;

use crate::animation::Easing;
use crate::config::{GridConfig, GridSettings, ItemSource};
use crate::drag::ItemDrag;
use crate::error::{GridError, GridResult};
use crate::events::{EventBus, EventKind, GridEvent, ListenerId};
use crate::item::{Item, ItemFlags, ItemId};
use crate::layout::LayoutStrategy;
use crate::queue::{GroupId, ItemCallback};
use crate::scheduler::{FrameScheduler, TickKey, TickKind};
use crate::timer::Debounce;
use brickwork_core::alloc::{Arena, HashMap, IndexSlot};
use brickwork_core::config::{Config, ProfilingMode};
use brickwork_core::geometry::{Margins, Rect};
use brickwork_core::host::{self, ElementId, Host, StyleMap};
use brickwork_core::logging;
use brickwork_core::math::Vec2;
use brickwork_core::profiling::{self, profile_function, profile_scope};
use brickwork_layout::PackedLayout;
use std::fmt;
use std::sync::Arc;

/// Generational handle to a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridId(IndexSlot);

impl GridId {
    pub(crate) fn from_slot(slot: IndexSlot) -> Self {
        Self(slot)
    }

    pub(crate) fn slot(&self) -> IndexSlot {
        self.0
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({}v{})", self.0.index(), self.0.generation())
    }
}

/// A grid container.
pub struct Grid {
    pub(crate) id: GridId,
    pub(crate) element: ElementId,
    /// Authoritative item order.
    pub(crate) items: Vec<ItemId>,
    pub(crate) rect: Rect<f32>,
    pub(crate) borders: Margins,
    pub(crate) settings: Arc<GridSettings>,
    pub(crate) layout: Box<dyn LayoutStrategy>,
    pub(crate) events: EventBus,
    pub(crate) resize: Option<Debounce>,
    pub(crate) layout_id: u64,
    pub(crate) packed: Option<PackedLayout>,
    /// Visibility changes waiting for the next layout to start.
    pub(crate) deferred_visibility: Vec<ops::DeferredVisibility>,
    /// Size styles the last layout wrote to the container.
    pub(crate) sized: (bool, bool),
}

impl Grid {
    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Container rect measured at the last layout pass.
    pub fn rect(&self) -> Rect<f32> {
        self.rect
    }

    pub fn borders(&self) -> Margins {
        self.borders
    }

    pub fn settings(&self) -> &Arc<GridSettings> {
        &self.settings
    }

    /// Id of the most recent layout pass.
    pub fn layout_id(&self) -> u64 {
        self.layout_id
    }

    /// Result of the most recent layout pass.
    pub fn packed(&self) -> Option<&PackedLayout> {
        self.packed.as_ref()
    }
}

/// Frame task payloads, keyed by [`TickKey`].
#[derive(Debug, Clone)]
pub(crate) enum Tick {
    Layout { duration: f32, easing: Easing },
    Visibility { target: StyleMap, duration: f32, easing: Easing },
    Move,
    Scroll { scroller: ElementId },
}

/// What a tick's read phase measured.
#[derive(Debug, Clone)]
pub(crate) enum TickRead {
    None,
    Translate(Vec2),
    Styles(StyleMap),
}

pub(crate) enum GroupKind {
    Layout {
        grid: GridId,
        layout_id: u64,
        callback: Option<LayoutCallback>,
    },
    Visibility {
        grid: GridId,
        showing: bool,
        callback: Option<VisibilityCallback>,
        completed: Vec<ItemId>,
        parent: Option<GroupId>,
    },
    Filter {
        shown: Vec<ItemId>,
        hidden: Vec<ItemId>,
        callback: Option<FilterCallback>,
    },
}

pub(crate) struct PendingGroup {
    remaining: usize,
    items: Vec<ItemId>,
    kind: GroupKind,
}

/// Owner of every grid and item.
pub struct GridSystem {
    pub(crate) host: Arc<dyn Host>,
    pub(crate) config: Config,
    pub(crate) grids: Arena<Grid>,
    pub(crate) items: Arena<Item>,
    pub(crate) scheduler: FrameScheduler<TickKey, Tick>,
    groups: HashMap<GroupId, PendingGroup>,
    next_group: u64,
    /// Seconds since the system was created.
    pub(crate) clock: f32,
    pub(crate) elements: HashMap<ElementId, ItemId>,
}

impl GridSystem {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, Config::default())
    }

    pub fn with_config(host: Arc<dyn Host>, config: Config) -> Self {
        if config.logging {
            logging::init();
        }
        if let Some(backend) = config.profiling.backend() {
            profiling::init_profiling(backend);
        }
        Self {
            host,
            scheduler: FrameScheduler::new(config.batch_size),
            config,
            grids: Arena::new(),
            items: Arena::new(),
            groups: HashMap::new(),
            next_group: 0,
            clock: 0.0,
            elements: HashMap::new(),
        }
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// Seconds of frame time seen so far.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Create a grid on `element`.
    ///
    /// Fails when the element is not attached or when dragging is enabled
    /// without gesture support.
    pub fn create_grid(&mut self, element: ElementId, config: GridConfig) -> GridResult<GridId> {
        profile_function!();
        if !self.host.is_attached(element) {
            tracing::warn!("Refusing to create a grid on detached {}", element);
            return Err(GridError::InvalidRoot(element));
        }
        let GridConfig {
            items,
            layout,
            settings,
        } = config;
        if settings.drag_enabled && !self.host.supports_gestures() {
            return Err(GridError::GestureUnavailable);
        }

        let settings = Arc::new(settings);
        self.host.add_class(element, &settings.classes.container);
        let resize = settings.layout_on_resize.map(Debounce::new);
        let layout_on_init = settings.layout_on_init;
        let slot = self.grids.insert_with(|slot| Grid {
            id: GridId(slot),
            element,
            items: Vec::new(),
            rect: Rect::ZERO,
            borders: Margins::ZERO,
            settings,
            layout: layout.into_strategy(),
            events: EventBus::new(),
            resize,
            layout_id: 0,
            packed: None,
            deferred_visibility: Vec::new(),
            sized: (false, false),
        });
        let id = GridId(slot);

        let elements = match items {
            ItemSource::Children => self.host.children(element),
            ItemSource::Selector(selector) => self
                .host
                .children(element)
                .into_iter()
                .filter(|child| self.host.matches(*child, &selector))
                .collect(),
            ItemSource::Elements(elements) => elements,
        };
        let added = self.add(
            id,
            &elements,
            AddOptions::default().layout(LayoutTrigger::Skip),
        );
        tracing::debug!("Created {} on {} with {} items", id, element, added.len());

        if layout_on_init {
            self.layout(id, LayoutTrigger::Instant);
        }
        Ok(id)
    }

    pub fn grid(&self, id: GridId) -> Option<&Grid> {
        self.grids.get(id.0)
    }

    pub(crate) fn grid_mut(&mut self, id: GridId) -> Option<&mut Grid> {
        self.grids.get_mut(id.0)
    }

    /// Ids of all live grids.
    pub fn grids(&self) -> Vec<GridId> {
        self.grids.keys().into_iter().map(GridId).collect()
    }

    pub fn is_destroyed(&self, id: GridId) -> bool {
        !self.grids.contains(id.0)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.slot())
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id.slot())
    }

    /// Settings of the grid `id` currently belongs to.
    pub(crate) fn item_settings(&self, id: ItemId) -> Option<Arc<GridSettings>> {
        let item = self.item(id)?;
        self.grid(item.grid).map(|grid| grid.settings.clone())
    }

    /// The item managing `element`, if any.
    pub fn item_for_element(&self, element: ElementId) -> Option<ItemId> {
        self.elements.get(&element).copied()
    }

    /// Item order of a grid. Empty for unknown grids.
    pub fn items(&self, grid: GridId) -> Vec<ItemId> {
        self.grid(grid).map(|g| g.items.clone()).unwrap_or_default()
    }

    /// Resolve a target to an item of `grid`.
    pub fn get_item(&self, grid: GridId, target: impl Into<ItemTarget>) -> Option<ItemId> {
        let grid = self.grid(grid)?;
        match target.into() {
            ItemTarget::Index(index) => {
                let len = grid.items.len() as isize;
                let index = if index < 0 { len + index } else { index };
                if index < 0 {
                    None
                } else {
                    grid.items.get(index as usize).copied()
                }
            }
            ItemTarget::Element(element) => self
                .elements
                .get(&element)
                .copied()
                .filter(|id| self.item(*id).is_some_and(|item| item.grid == grid.id)),
            ItemTarget::Item(id) => self
                .item(id)
                .filter(|item| item.grid == grid.id)
                .map(|item| item.id),
        }
    }

    /// Resolve several targets, skipping the ones that do not resolve.
    pub fn grid_items(&self, grid: GridId, targets: &[ItemTarget]) -> Vec<ItemId> {
        targets
            .iter()
            .filter_map(|target| self.get_item(grid, *target))
            .collect()
    }

    pub fn on(
        &mut self,
        grid: GridId,
        kind: EventKind,
        listener: impl FnMut(&GridEvent) + 'static,
    ) -> Option<ListenerId> {
        self.grid_mut(grid)
            .map(|grid| grid.events.subscribe(kind, listener))
    }

    pub fn off(&mut self, grid: GridId, listener: ListenerId) -> bool {
        self.grid_mut(grid)
            .is_some_and(|grid| grid.events.unsubscribe(listener))
    }

    pub(crate) fn emit(&mut self, grid: GridId, event: GridEvent) {
        if let Some(grid) = self.grid_mut(grid) {
            grid.events.emit(&event);
        }
    }

    pub(crate) fn has_listeners(&self, grid: GridId, kind: EventKind) -> bool {
        self.grid(grid)
            .is_some_and(|grid| grid.events.has_listeners(kind))
    }

    /// Whether anything is left to do on the next frame.
    pub fn needs_frame(&self) -> bool {
        self.scheduler.needs_frame()
            || self.items.iter().any(|(_, item)| {
                item.layout.animator.is_animating()
                    || item.visibility.animator.is_animating()
                    || item.drag.as_ref().is_some_and(|drag| drag.needs_frame())
            })
            || self
                .grids
                .iter()
                .any(|(_, grid)| grid.resize.as_ref().is_some_and(|r| r.is_pending()))
    }

    /// Advance the system by `dt` seconds.
    ///
    /// Steps running animations, fires due timers and flushes one batch of
    /// scheduled reads and writes. Returns [`Self::needs_frame`].
    pub fn frame(&mut self, dt: f32) -> bool {
        profile_function!();
        if self.config.profiling != ProfilingMode::Off {
            profiling::new_frame();
        }
        let dt = dt.max(0.0);
        self.clock += dt;
        self.step_animations(dt);
        self.fire_timers();
        self.flush_ticks();
        self.needs_frame()
    }

    /// Notify the system that the viewport was resized.
    pub fn handle_resize(&mut self) {
        let now = self.clock;
        let mut due = Vec::new();
        for (slot, grid) in self.grids.iter_mut() {
            if let Some(resize) = grid.resize.as_mut()
                && resize.trigger(now)
            {
                due.push(GridId(slot));
            }
        }
        for grid in due {
            self.layout_after_resize(grid);
        }
    }

    fn layout_after_resize(&mut self, grid: GridId) {
        tracing::debug!("Relayout of {} after resize", grid);
        self.refresh_items(grid, &[], false);
        self.layout(grid, LayoutTrigger::Animated);
    }

    fn step_animations(&mut self, dt: f32) {
        profile_scope!("step_animations");
        let order: Vec<ItemId> = self
            .grids
            .iter()
            .flat_map(|(_, grid)| grid.items.iter().copied())
            .collect();
        for id in order {
            let Some(item) = self.items.get_mut(id.slot()) else {
                continue;
            };
            let element = item.element;
            let child = item.child;
            let layout_frame = item.layout.animator.step(dt);
            let visibility_frame = item.visibility.animator.step(dt);

            if let Some(frame) = layout_frame {
                host::set_styles(self.host.as_ref(), element, &frame.values);
                if frame.finished && frame.notify {
                    self.finish_item_layout(id);
                }
            }
            if let Some(frame) = visibility_frame {
                if let Some(child) = child {
                    host::set_styles(self.host.as_ref(), child, &frame.values);
                }
                if frame.finished && frame.notify {
                    self.finish_visibility(id);
                }
            }
        }
    }

    fn fire_timers(&mut self) {
        let now = self.clock;
        let due: Vec<GridId> = self
            .grids
            .iter_mut()
            .filter_map(|(slot, grid)| {
                grid.resize
                    .as_mut()
                    .is_some_and(|resize| resize.poll(now))
                    .then_some(GridId(slot))
            })
            .collect();
        for grid in due {
            self.layout_after_resize(grid);
        }

        let ids: Vec<ItemId> = self.items.keys().into_iter().map(ItemId::from_slot).collect();
        for id in ids {
            let Some(drag) = self.items.get_mut(id.slot()).and_then(|item| item.drag.as_mut()) else {
                continue;
            };
            let sort_due = drag.sort_debounce.poll(now);
            let pending = drag.is_pending();
            if sort_due {
                self.check_overlap(id);
            }
            if pending {
                self.recheck_start_predicate(id);
            }
        }
    }

    fn flush_ticks(&mut self) {
        profile_scope!("flush_ticks");
        let batch = self.scheduler.drain();
        if batch.is_empty() {
            return;
        }
        let mut reads = Vec::with_capacity(batch.len());
        for (key, tick) in &batch {
            reads.push(self.tick_read(*key, tick));
        }
        for ((key, tick), read) in batch.into_iter().zip(reads) {
            self.tick_write(key, tick, read);
        }
    }

    fn tick_read(&mut self, key: TickKey, tick: &Tick) -> TickRead {
        let Some(item) = self.item(key.item) else {
            return TickRead::None;
        };
        match tick {
            Tick::Layout { .. } => TickRead::Translate(host::translate(self.host.as_ref(), item.element)),
            Tick::Visibility { target, .. } => match item.child {
                Some(child) => TickRead::Styles(host::current_styles(self.host.as_ref(), child, target)),
                None => TickRead::None,
            },
            Tick::Move => {
                self.drag_prepare_move(key.item);
                TickRead::None
            }
            Tick::Scroll { .. } => {
                self.drag_prepare_scroll(key.item);
                TickRead::None
            }
        }
    }

    fn tick_write(&mut self, key: TickKey, tick: Tick, read: TickRead) {
        match (tick, read) {
            (Tick::Layout { duration, easing }, TickRead::Translate(current)) => {
                self.layout_tick_write(key.item, current, duration, easing);
            }
            (Tick::Visibility { target, duration, easing }, read) => {
                let current = match read {
                    TickRead::Styles(styles) => styles,
                    _ => StyleMap::new(),
                };
                self.visibility_tick_write(key.item, current, target, duration, easing);
            }
            (Tick::Move, _) => self.drag_apply_move(key.item),
            (Tick::Scroll { scroller }, _) => self.drag_apply_scroll(key.item, scroller),
            (Tick::Layout { .. }, _) => {}
        }
    }

    pub(crate) fn schedule(&mut self, kind: TickKind, item: ItemId, tick: Tick) {
        self.scheduler.register(TickKey::new(kind, item), tick);
    }

    pub(crate) fn cancel_tick(&mut self, kind: TickKind, item: ItemId) {
        self.scheduler.cancel(&TickKey::new(kind, item));
    }

    /// Run queued callbacks for `item`.
    pub(crate) fn run_callbacks(&mut self, callbacks: Vec<ItemCallback>, interrupted: bool, item: ItemId) {
        for callback in callbacks {
            match callback {
                ItemCallback::User(callback) => callback(interrupted, item),
                ItemCallback::Group(group) => self.group_item_done(group, item, interrupted),
            }
        }
    }

    pub(crate) fn new_group(&mut self, remaining: usize, items: Vec<ItemId>, kind: GroupKind) -> GroupId {
        self.next_group += 1;
        let id = GroupId(self.next_group);
        self.groups.insert(
            id,
            PendingGroup {
                remaining,
                items,
                kind,
            },
        );
        id
    }

    /// Count one completion towards a group; completes it on the last one.
    pub(crate) fn group_item_done(&mut self, id: GroupId, item: ItemId, interrupted: bool) {
        let Some(group) = self.groups.get_mut(&id) else {
            return;
        };
        if let GroupKind::Visibility { completed, .. } = &mut group.kind
            && !interrupted
        {
            completed.push(item);
        }
        group.remaining = group.remaining.saturating_sub(1);
        if group.remaining > 0 {
            return;
        }
        if let Some(group) = self.groups.remove(&id) {
            self.complete_group(group);
        }
    }

    fn group_part_done(&mut self, id: GroupId) {
        let Some(group) = self.groups.get_mut(&id) else {
            return;
        };
        group.remaining = group.remaining.saturating_sub(1);
        if group.remaining == 0
            && let Some(group) = self.groups.remove(&id)
        {
            self.complete_group(group);
        }
    }

    fn complete_group(&mut self, group: PendingGroup) {
        match group.kind {
            GroupKind::Layout {
                grid,
                layout_id,
                callback,
            } => {
                let superseded = self.grid(grid).is_none_or(|g| g.layout_id != layout_id);
                if let Some(callback) = callback {
                    callback(LayoutOutcome {
                        items: group.items.clone(),
                        superseded,
                    });
                }
                if superseded {
                    tracing::trace!("Layout pass {} of {} was superseded", layout_id, grid);
                } else {
                    self.emit(grid, GridEvent::LayoutEnd { items: group.items });
                }
            }
            GroupKind::Visibility {
                grid,
                showing,
                callback,
                completed,
                parent,
            } => {
                if let Some(callback) = callback {
                    callback(completed.clone());
                }
                let event = if showing {
                    GridEvent::ShowEnd { items: completed }
                } else {
                    GridEvent::HideEnd { items: completed }
                };
                self.emit(grid, event);
                if let Some(parent) = parent {
                    self.group_part_done(parent);
                }
            }
            GroupKind::Filter {
                shown,
                hidden,
                callback,
            } => {
                if let Some(callback) = callback {
                    callback(shown, hidden);
                }
            }
        }
    }

    /// Create an item for `element` in `grid`. The element is appended to
    /// the grid element when it lives elsewhere.
    pub(crate) fn create_item(&mut self, grid: GridId, element: ElementId, active: Option<bool>) -> Option<ItemId> {
        let (grid_element, settings) = {
            let grid = self.grid(grid)?;
            (grid.element, grid.settings.clone())
        };
        if self.elements.contains_key(&element) {
            tracing::warn!("{} is already managed by a grid", element);
            return None;
        }
        let host = self.host.clone();
        if host.parent(element) != Some(grid_element) {
            host.append_child(grid_element, element);
        }
        let is_active = match active {
            Some(active) => {
                host.set_displayed(element, active);
                active
            }
            None => host.is_displayed(element),
        };
        let child = host.children(element).first().copied();

        let slot = self
            .items
            .insert_with(|slot| Item::new(ItemId::from_slot(slot), grid, element, child, is_active));
        let id = ItemId::from_slot(slot);
        self.elements.insert(element, id);

        let classes = &settings.classes;
        host.add_class(element, &classes.item);
        host.add_class(element, if is_active { &classes.shown } else { &classes.hidden });
        host::set_translate(host.as_ref(), element, Vec2::ZERO);
        if let Some(child) = child {
            host::set_styles(host.as_ref(), child, settings.visibility_styles(is_active));
        }
        if settings.drag_enabled
            && let Some(item) = self.item_mut(id)
        {
            item.drag = Some(ItemDrag::new(grid, settings.drag_sort_interval));
        }
        self.refresh_dimensions(id, false);
        if !settings.sort_data.is_empty() {
            self.compute_sort_data(id);
        }
        Some(id)
    }

    /// Re-measure an item. Hidden items are skipped unless `force` is set.
    pub(crate) fn refresh_dimensions(&mut self, id: ItemId, force: bool) {
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if item.is_destroyed() || (!force && item.flags.contains(ItemFlags::HIDDEN)) {
            return;
        }
        item.size = host.size(item.element);
        let margins = host.margins(item.element);
        item.margins = Margins::new(
            margins.left.max(0.0),
            margins.right.max(0.0),
            margins.top.max(0.0),
            margins.bottom.max(0.0),
        );
    }

    /// Recompute an item's sort data from its grid's extractors.
    pub(crate) fn compute_sort_data(&mut self, id: ItemId) {
        let Some((element, grid)) = self.item(id).map(|item| (item.element, item.grid)) else {
            return;
        };
        let Some(settings) = self.grid(grid).map(|g| g.settings.clone()) else {
            return;
        };
        let data = settings
            .sort_data
            .iter()
            .map(|(field, extract)| (field.clone(), extract(self.host.as_ref(), element)))
            .collect();
        if let Some(item) = self.item_mut(id) {
            item.sort_data = Some(data);
        }
    }

    pub(crate) fn ensure_sort_data(&mut self, id: ItemId) {
        if self.item(id).is_some_and(|item| item.sort_data.is_none()) {
            self.compute_sort_data(id);
        }
    }

    /// Tear an item down: stop every transition, flush its queues as
    /// interrupted, strip styles and classes and drop it from its grid.
    pub(crate) fn destroy_item(&mut self, id: ItemId, remove_element: bool) {
        let Some((grid, element, child)) = self.item(id).map(|i| (i.grid, i.element, i.child)) else {
            return;
        };
        self.drag_stop(id);
        self.release_stop(id, true, None);
        self.migrate_stop(id, true, None);
        self.stop_item_layout(id, true, None);
        self.stop_visibility(id, true);
        for kind in [TickKind::Layout, TickKind::Visibility, TickKind::Move, TickKind::Scroll] {
            self.cancel_tick(kind, id);
        }

        let callbacks = match self.item_mut(id) {
            Some(item) => {
                item.flags.remove(ItemFlags::ACTIVE);
                item.flags.insert(ItemFlags::DESTROYED);
                item.layout.animator.stop();
                item.visibility.animator.stop();
                let mut callbacks = item.layout.queue.take();
                callbacks.extend(item.visibility.queue.take());
                callbacks.extend(item.settle.take());
                callbacks
            }
            None => Vec::new(),
        };
        self.run_callbacks(callbacks, true, id);

        let host = self.host.clone();
        host.clear_styles(element);
        if let Some(child) = child {
            host.clear_styles(child);
        }
        if let Some(settings) = self.grid(grid).map(|g| g.settings.clone()) {
            let classes = &settings.classes;
            for class in [
                &classes.item,
                &classes.shown,
                &classes.hidden,
                &classes.positioning,
                &classes.dragging,
                &classes.releasing,
            ] {
                host.remove_class(element, class);
            }
        }
        if let Some(grid) = self.grid_mut(grid) {
            grid.items.retain(|item| *item != id);
        }
        if remove_element {
            host.remove_element(element);
        }
        self.elements.remove(&element);
        self.items.remove(id.slot());
        tracing::trace!("Destroyed {}", id);
    }
}
