//! Public grid operations.

use super::target::move_in_place;
use super::{GridId, GridSystem, GroupKind, ItemTarget, normalize_index};
use crate::events::{GridEvent, SortAction};
use crate::item::{Item, ItemFlags, ItemId};
use crate::queue::{GroupId, ItemCallback, ItemCallbackFn};
use crate::sort::{SortBy, SortData, compare_sort_data, parse_criteria, reference_order, sorted_order};
use brickwork_core::geometry::Size;
use brickwork_core::host::{ElementId, StyleProperty};
use brickwork_core::math::Vec2;
use brickwork_core::profiling::profile_function;
use std::cmp::Ordering;
use std::fmt;

/// Called when every item of a layout pass settled.
pub type LayoutCallback = Box<dyn FnOnce(LayoutOutcome)>;
/// Called with the items whose show/hide completed without interruption.
pub type VisibilityCallback = Box<dyn FnOnce(Vec<ItemId>)>;
/// Called with the shown and hidden items once a filter settled.
pub type FilterCallback = Box<dyn FnOnce(Vec<ItemId>, Vec<ItemId>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOutcome {
    pub items: Vec<ItemId>,
    /// A newer layout pass started before this one finished.
    pub superseded: bool,
}

/// Whether and how an operation lays the grid out afterwards.
#[derive(Default)]
pub enum LayoutTrigger {
    Skip,
    Instant,
    #[default]
    Animated,
    AnimatedWithCallback(LayoutCallback),
}

impl LayoutTrigger {
    pub fn is_skip(&self) -> bool {
        matches!(self, LayoutTrigger::Skip)
    }
}

impl fmt::Debug for LayoutTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutTrigger::Skip => f.write_str("Skip"),
            LayoutTrigger::Instant => f.write_str("Instant"),
            LayoutTrigger::Animated => f.write_str("Animated"),
            LayoutTrigger::AnimatedWithCallback(_) => f.write_str("AnimatedWithCallback(..)"),
        }
    }
}

#[derive(Debug)]
pub struct AddOptions {
    /// Insertion index; negative values count from the end, `-1` appends.
    pub index: isize,
    /// Force the initial visibility instead of reading it from the host.
    pub active: Option<bool>,
    pub layout: LayoutTrigger,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            index: -1,
            active: None,
            layout: LayoutTrigger::Animated,
        }
    }
}

impl AddOptions {
    pub fn index(mut self, index: isize) -> Self {
        self.index = index;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn layout(mut self, layout: LayoutTrigger) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Debug, Default)]
pub struct RemoveOptions {
    pub remove_elements: bool,
    pub layout: LayoutTrigger,
}

impl RemoveOptions {
    pub fn remove_elements(mut self, remove: bool) -> Self {
        self.remove_elements = remove;
        self
    }

    pub fn layout(mut self, layout: LayoutTrigger) -> Self {
        self.layout = layout;
        self
    }
}

pub struct VisibilityOptions {
    pub instant: bool,
    /// Start the transitions together with the layout they trigger.
    pub sync_with_layout: bool,
    pub on_finish: Option<VisibilityCallback>,
    pub layout: LayoutTrigger,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            instant: false,
            sync_with_layout: true,
            on_finish: None,
            layout: LayoutTrigger::Animated,
        }
    }
}

impl VisibilityOptions {
    pub fn instant(mut self, instant: bool) -> Self {
        self.instant = instant;
        self
    }

    pub fn sync_with_layout(mut self, sync: bool) -> Self {
        self.sync_with_layout = sync;
        self
    }

    pub fn on_finish(mut self, callback: impl FnOnce(Vec<ItemId>) + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn layout(mut self, layout: LayoutTrigger) -> Self {
        self.layout = layout;
        self
    }
}

/// Selects the items a filter keeps visible.
pub enum FilterBy {
    Predicate(Box<dyn Fn(&Item) -> bool>),
    Selector(String),
}

impl FilterBy {
    pub fn predicate(predicate: impl Fn(&Item) -> bool + 'static) -> Self {
        FilterBy::Predicate(Box::new(predicate))
    }

    pub fn selector(selector: impl Into<String>) -> Self {
        FilterBy::Selector(selector.into())
    }
}

pub struct FilterOptions {
    pub instant: bool,
    pub sync_with_layout: bool,
    pub on_finish: Option<FilterCallback>,
    pub layout: LayoutTrigger,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            instant: false,
            sync_with_layout: true,
            on_finish: None,
            layout: LayoutTrigger::Animated,
        }
    }
}

impl FilterOptions {
    pub fn instant(mut self, instant: bool) -> Self {
        self.instant = instant;
        self
    }

    pub fn sync_with_layout(mut self, sync: bool) -> Self {
        self.sync_with_layout = sync;
        self
    }

    pub fn on_finish(mut self, callback: impl FnOnce(Vec<ItemId>, Vec<ItemId>) + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn layout(mut self, layout: LayoutTrigger) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Debug, Default)]
pub struct SortOptions {
    pub descending: bool,
    pub layout: LayoutTrigger,
}

impl SortOptions {
    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn layout(mut self, layout: LayoutTrigger) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Debug, Default)]
pub struct MoveOptions {
    pub action: SortAction,
    pub layout: LayoutTrigger,
}

impl MoveOptions {
    pub fn action(mut self, action: SortAction) -> Self {
        self.action = action;
        self
    }

    pub fn layout(mut self, layout: LayoutTrigger) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Default)]
pub struct SendOptions {
    /// Element the item is reparented into while it moves to its new
    /// place; the target grid element when `None`.
    pub append_to: Option<ElementId>,
    pub layout_sender: LayoutTrigger,
    pub layout_receiver: LayoutTrigger,
    /// Runs once the migration settles, `interrupted` when it was aborted.
    pub on_finish: Option<ItemCallbackFn>,
}

impl SendOptions {
    pub fn append_to(mut self, element: ElementId) -> Self {
        self.append_to = Some(element);
        self
    }

    pub fn layout_sender(mut self, layout: LayoutTrigger) -> Self {
        self.layout_sender = layout;
        self
    }

    pub fn layout_receiver(mut self, layout: LayoutTrigger) -> Self {
        self.layout_receiver = layout;
        self
    }

    pub fn on_finish(mut self, callback: impl FnOnce(bool, ItemId) + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }
}

/// A show/hide waiting for the next layout pass to start.
pub(crate) struct DeferredVisibility {
    items: Vec<ItemId>,
    showing: bool,
    instant: bool,
    group: GroupId,
}

impl GridSystem {
    /// Add elements as items of `grid`. Returns the created items.
    pub fn add(&mut self, grid: GridId, elements: &[ElementId], options: AddOptions) -> Vec<ItemId> {
        profile_function!();
        let Some(len) = self.grid(grid).map(|g| g.items.len()) else {
            tracing::warn!("add on unknown {}", grid);
            return Vec::new();
        };

        let mut added = Vec::with_capacity(elements.len());
        let mut needs_layout = false;
        for element in elements {
            let Some(id) = self.create_item(grid, *element, options.active) else {
                continue;
            };
            if let Some(item) = self.item_mut(id)
                && item.is_active()
            {
                // New items appear in place instead of sliding in.
                item.flags.insert(ItemFlags::SKIP_NEXT_ANIMATION);
                needs_layout = true;
            }
            added.push(id);
        }
        if added.is_empty() {
            return added;
        }

        let index = normalize_index(len, options.index, true);
        if let Some(g) = self.grid_mut(grid) {
            g.items.splice(index..index, added.iter().copied());
        }
        self.emit(grid, GridEvent::Add { items: added.clone() });
        if needs_layout {
            self.layout(grid, options.layout);
        }
        added
    }

    /// Remove items from `grid`, destroying their records.
    pub fn remove(&mut self, grid: GridId, targets: &[ItemTarget], options: RemoveOptions) -> Vec<ItemId> {
        profile_function!();
        let items = self.resolve_unique(grid, targets);
        let mut removed = Vec::with_capacity(items.len());
        let mut indices = Vec::with_capacity(items.len());
        let mut needs_layout = false;
        for id in items {
            let Some(index) = self.grid(grid).and_then(|g| g.items.iter().position(|i| *i == id)) else {
                continue;
            };
            if self.item(id).is_some_and(|item| item.is_active()) {
                needs_layout = true;
            }
            self.destroy_item(id, options.remove_elements);
            removed.push(id);
            indices.push(index);
        }
        if removed.is_empty() {
            return removed;
        }
        self.emit(
            grid,
            GridEvent::Remove {
                items: removed.clone(),
                indices,
            },
        );
        if needs_layout {
            self.layout(grid, options.layout);
        }
        removed
    }

    pub fn show(&mut self, grid: GridId, targets: &[ItemTarget], options: VisibilityOptions) {
        self.set_items_visibility(grid, targets, true, options);
    }

    pub fn hide(&mut self, grid: GridId, targets: &[ItemTarget], options: VisibilityOptions) {
        self.set_items_visibility(grid, targets, false, options);
    }

    fn set_items_visibility(&mut self, grid: GridId, targets: &[ItemTarget], showing: bool, options: VisibilityOptions) {
        profile_function!();
        if self.is_destroyed(grid) {
            return;
        }
        let items = self.resolve_unique(grid, targets);
        let sync = options.sync_with_layout && !options.layout.is_skip();
        self.change_visibility(
            grid,
            items,
            showing,
            options.instant,
            sync,
            options.on_finish,
            options.layout,
            None,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn change_visibility(
        &mut self,
        grid: GridId,
        items: Vec<ItemId>,
        showing: bool,
        instant: bool,
        sync: bool,
        on_finish: Option<VisibilityCallback>,
        layout: LayoutTrigger,
        parent: Option<GroupId>,
    ) {
        if items.is_empty() {
            if let Some(callback) = on_finish {
                callback(Vec::new());
            }
            if let Some(parent) = parent {
                self.group_part_done(parent);
            }
            return;
        }

        let start = if showing {
            GridEvent::ShowStart { items: items.clone() }
        } else {
            GridEvent::HideStart { items: items.clone() }
        };
        self.emit(grid, start);

        let mut needs_layout = false;
        let mut hidden = Vec::new();
        for id in &items {
            let Some(item) = self.item_mut(*id) else {
                continue;
            };
            let active = item.is_active();
            if active != showing {
                needs_layout = true;
            }
            if showing && !active {
                item.flags.insert(ItemFlags::SKIP_NEXT_ANIMATION);
            }
            if showing && item.flags.contains(ItemFlags::HIDDEN) {
                hidden.push(*id);
            }
            item.flags.set(ItemFlags::ACTIVE, showing);
        }
        if !hidden.is_empty() {
            self.refresh_item_list(&hidden, true);
        }

        let group = self.new_group(
            items.len(),
            items.clone(),
            GroupKind::Visibility {
                grid,
                showing,
                callback: on_finish,
                completed: Vec::new(),
                parent,
            },
        );
        let change = DeferredVisibility {
            items,
            showing,
            instant,
            group,
        };
        if needs_layout && sync {
            if let Some(g) = self.grid_mut(grid) {
                g.deferred_visibility.push(change);
            }
        } else {
            self.apply_visibility(change);
        }
        if needs_layout {
            self.layout(grid, layout);
        }
    }

    fn apply_visibility(&mut self, change: DeferredVisibility) {
        for id in change.items {
            let callback = Some(ItemCallback::Group(change.group));
            if change.showing {
                self.show_item(id, change.instant, callback);
            } else {
                self.hide_item(id, change.instant, callback);
            }
        }
    }

    /// Show the items matching `by` and hide the rest.
    pub fn filter(&mut self, grid: GridId, by: FilterBy, options: FilterOptions) {
        profile_function!();
        let order = self.items(grid);
        if order.is_empty() {
            return;
        }
        let mut shown = Vec::new();
        let mut hidden = Vec::new();
        for id in order {
            let Some(item) = self.item(id) else {
                continue;
            };
            let matches = match &by {
                FilterBy::Predicate(predicate) => predicate(item),
                FilterBy::Selector(selector) => self.host.matches(item.element, selector),
            };
            if matches {
                shown.push(id);
            } else {
                hidden.push(id);
            }
        }

        let sync = options.sync_with_layout && !options.layout.is_skip();
        let group = self.new_group(
            2,
            Vec::new(),
            GroupKind::Filter {
                shown: shown.clone(),
                hidden: hidden.clone(),
                callback: options.on_finish,
            },
        );
        self.emit(
            grid,
            GridEvent::Filter {
                shown: shown.clone(),
                hidden: hidden.clone(),
            },
        );
        self.change_visibility(
            grid,
            shown,
            true,
            options.instant,
            sync,
            None,
            LayoutTrigger::Skip,
            Some(group),
        );
        self.change_visibility(
            grid,
            hidden,
            false,
            options.instant,
            sync,
            None,
            LayoutTrigger::Skip,
            Some(group),
        );
        self.layout(grid, options.layout);
    }

    /// Reorder the items of `grid`.
    pub fn sort(&mut self, grid: GridId, by: SortBy, options: SortOptions) {
        profile_function!();
        let previous = self.items(grid);
        if previous.len() < 2 {
            return;
        }
        let descending = options.descending;
        let current = match by {
            SortBy::Comparator(compare) => {
                for id in &previous {
                    self.ensure_sort_data(*id);
                }
                sorted_order(&previous, |a, b| {
                    let (Some(a), Some(b)) = (self.item(a), self.item(b)) else {
                        return Ordering::Equal;
                    };
                    let ordering = compare(a, b);
                    if descending { ordering.reverse() } else { ordering }
                })
            }
            SortBy::Criteria(criteria) => {
                for id in &previous {
                    self.ensure_sort_data(*id);
                }
                let criteria = parse_criteria(&criteria);
                let empty = SortData::new();
                sorted_order(&previous, |a, b| {
                    let a = self.item(a).and_then(|i| i.sort_data()).unwrap_or(&empty);
                    let b = self.item(b).and_then(|i| i.sort_data()).unwrap_or(&empty);
                    compare_sort_data(a, b, &criteria, descending)
                })
            }
            SortBy::Reference(targets) => {
                let reference = self.grid_items(grid, &targets);
                reference_order(&previous, &reference, descending)
            }
        };

        if let Some(g) = self.grid_mut(grid) {
            g.items = current.clone();
        }
        self.emit(grid, GridEvent::Sort { current, previous });
        self.layout(grid, options.layout);
    }

    /// Move `item` to the index of `position`.
    pub fn move_item(
        &mut self,
        grid: GridId,
        item: impl Into<ItemTarget>,
        position: impl Into<ItemTarget>,
        options: MoveOptions,
    ) {
        if self.grid(grid).is_none_or(|g| g.items.len() < 2) {
            return;
        }
        let (Some(from_id), Some(to_id)) = (self.get_item(grid, item), self.get_item(grid, position)) else {
            return;
        };
        if from_id == to_id {
            return;
        }
        let Some(g) = self.grid_mut(grid) else {
            return;
        };
        let (Some(from_index), Some(to_index)) = (
            g.items.iter().position(|id| *id == from_id),
            g.items.iter().position(|id| *id == to_id),
        ) else {
            return;
        };
        match options.action {
            SortAction::Move => move_in_place(&mut g.items, from_index, to_index),
            SortAction::Swap => g.items.swap(from_index, to_index),
        }
        self.emit(
            grid,
            GridEvent::Move {
                item: from_id,
                from_index,
                to_index,
                action: options.action,
            },
        );
        self.layout(grid, options.layout);
    }

    /// Move an item into another grid at `position`. Returns whether the
    /// item was sent.
    pub fn send(
        &mut self,
        grid: GridId,
        item: impl Into<ItemTarget>,
        target_grid: GridId,
        position: impl Into<ItemTarget>,
        options: SendOptions,
    ) -> bool {
        profile_function!();
        if grid == target_grid || self.is_destroyed(target_grid) {
            return false;
        }
        let Some(id) = self.get_item(grid, item) else {
            return false;
        };
        let SendOptions {
            append_to,
            layout_sender,
            layout_receiver,
            on_finish,
        } = options;
        if !self.migrate_start(id, target_grid, position.into(), append_to, on_finish.map(ItemCallback::User)) {
            return false;
        }
        tracing::debug!("Sent {} from {} to {}", id, grid, target_grid);
        if self.item(id).is_some_and(|item| item.is_migrating()) {
            self.layout(grid, layout_sender);
            self.layout(target_grid, layout_receiver);
        }
        true
    }

    /// Re-append item elements to the grid element in item order.
    pub fn synchronize(&mut self, grid: GridId) {
        let Some((element, order)) = self.grid(grid).map(|g| (g.element, g.items.clone())) else {
            return;
        };
        let mut appended = false;
        for id in order {
            let Some(item_element) = self.item(id).map(|item| item.element) else {
                continue;
            };
            if self.host.parent(item_element) == Some(element) {
                self.host.append_child(element, item_element);
                appended = true;
            }
        }
        if appended {
            self.emit(grid, GridEvent::Synchronize);
        }
    }

    /// Run a layout pass.
    pub fn layout(&mut self, grid: GridId, trigger: LayoutTrigger) {
        profile_function!();
        let (instant, callback) = match trigger {
            LayoutTrigger::Skip => return,
            LayoutTrigger::Instant => (true, None),
            LayoutTrigger::Animated => (false, None),
            LayoutTrigger::AnimatedWithCallback(callback) => (false, Some(callback)),
        };
        let host = self.host.clone();
        let Some((element, active)) = self.grid(grid).map(|g| {
            let active: Vec<ItemId> = g
                .items
                .iter()
                .copied()
                .filter(|id| self.item(*id).is_some_and(|item| item.is_active()))
                .collect();
            (g.element, active)
        }) else {
            tracing::warn!("layout on unknown {}", grid);
            return;
        };
        let boxes: Vec<Size<f32>> = active
            .iter()
            .filter_map(|id| self.item(*id).map(|item| item.outer_size()))
            .collect();

        let rect = host.bounding_rect(element);
        let borders = host.borders(element);
        let container = Size::new(
            (rect.width - borders.horizontal()).max(0.0),
            (rect.height - borders.vertical()).max(0.0),
        );
        let Some(g) = self.grid_mut(grid) else {
            return;
        };
        g.layout_id += 1;
        g.rect = rect;
        g.borders = borders;
        let layout_id = g.layout_id;
        let packed = g.layout.compute(&boxes, container);
        if packed.slots.len() != boxes.len() {
            tracing::warn!(
                "Layout of {} returned {} slots for {} items",
                grid,
                packed.slots.len(),
                boxes.len()
            );
        }

        if packed.set_width || packed.set_height {
            let border_box = host.is_border_box(element);
            if packed.set_width {
                let extra = if border_box { borders.horizontal() } else { 0.0 };
                host.set_style(element, StyleProperty::Width, packed.width + extra);
            }
            if packed.set_height {
                let extra = if border_box { borders.vertical() } else { 0.0 };
                host.set_style(element, StyleProperty::Height, packed.height + extra);
            }
            g.sized = (g.sized.0 || packed.set_width, g.sized.1 || packed.set_height);
        }
        let positions: Vec<Vec2> = (0..active.len())
            .map(|i| packed.slots.get(i).map_or(Vec2::ZERO, |slot| Vec2::new(slot.x, slot.y)))
            .collect();
        tracing::debug!(
            "Layout pass {} of {}: {} items in {}x{}",
            layout_id,
            grid,
            active.len(),
            packed.width,
            packed.height
        );
        g.packed = Some(packed);

        self.emit(
            grid,
            GridEvent::LayoutStart {
                items: active.clone(),
                instant,
            },
        );
        if let Some(g) = self.grid_mut(grid) {
            if g.packed.as_ref().is_some_and(|p| p.set_width || p.set_height) {
                g.rect = host.bounding_rect(element);
            }
            let deferred = std::mem::take(&mut g.deferred_visibility);
            for change in deferred {
                self.apply_visibility(change);
            }
        }

        let group = self.new_group(
            active.len() + 1,
            active.clone(),
            GroupKind::Layout {
                grid,
                layout_id,
                callback,
            },
        );
        for (id, position) in active.into_iter().zip(positions) {
            let Some(item) = self.item_mut(id) else {
                self.group_item_done(group, id, true);
                continue;
            };
            item.position = position;
            if item.is_dragging() {
                self.group_item_done(group, id, false);
            } else {
                self.start_item_layout(id, instant, Some(ItemCallback::Group(group)));
            }
        }
        self.group_part_done(group);
    }

    /// Re-measure items. All items of the grid when `targets` is empty.
    /// With `force`, hidden items are displayed briefly to be measured.
    pub fn refresh_items(&mut self, grid: GridId, targets: &[ItemTarget], force: bool) {
        let items = if targets.is_empty() {
            self.items(grid)
        } else {
            self.resolve_unique(grid, targets)
        };
        self.refresh_item_list(&items, force);
    }

    pub(crate) fn refresh_item_list(&mut self, items: &[ItemId], force: bool) {
        let host = self.host.clone();
        for id in items {
            let Some(item) = self.item(*id) else {
                continue;
            };
            let element = item.element;
            let reveal = force && item.flags.contains(ItemFlags::HIDDEN) && !host.is_displayed(element);
            if reveal {
                host.set_displayed(element, true);
            }
            self.refresh_dimensions(*id, force);
            if reveal {
                host.set_displayed(element, false);
            }
        }
    }

    /// Recompute sort data. All items of the grid when `targets` is empty.
    pub fn refresh_sort_data(&mut self, grid: GridId, targets: &[ItemTarget]) {
        let items = if targets.is_empty() {
            self.items(grid)
        } else {
            self.resolve_unique(grid, targets)
        };
        for id in items {
            self.compute_sort_data(id);
        }
    }

    /// Destroy a grid and all of its items.
    pub fn destroy_grid(&mut self, grid: GridId, remove_elements: bool) {
        profile_function!();
        let Some(g) = self.grid_mut(grid) else {
            return;
        };
        let deferred = std::mem::take(&mut g.deferred_visibility);
        let order = g.items.clone();
        let element = g.element;
        let sized = g.sized;
        let container_class = g.settings.classes.container.clone();

        for change in deferred {
            for id in change.items {
                self.group_item_done(change.group, id, true);
            }
        }
        for id in order {
            self.destroy_item(id, remove_elements);
        }

        self.host.remove_class(element, &container_class);
        if sized.0 {
            self.host.remove_style(element, StyleProperty::Width);
        }
        if sized.1 {
            self.host.remove_style(element, StyleProperty::Height);
        }
        self.emit(grid, GridEvent::Destroy);
        if let Some(g) = self.grid_mut(grid) {
            g.events.destroy();
        }
        self.grids.remove(grid.slot());
        tracing::debug!("Destroyed {}", grid);
    }

    /// Resolve targets to items of `grid`, dropping duplicates.
    fn resolve_unique(&self, grid: GridId, targets: &[ItemTarget]) -> Vec<ItemId> {
        let mut items = Vec::with_capacity(targets.len());
        for id in self.grid_items(grid, targets) {
            if !items.contains(&id) {
                items.push(id);
            }
        }
        items
    }
}
