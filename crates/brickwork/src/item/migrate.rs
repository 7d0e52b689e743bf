use super::{ItemId, ItemMigrate};
use crate::drag::ItemDrag;
use crate::events::{GridEvent, TransferInfo};
use crate::grid::{GridId, GridSystem, ItemTarget, normalize_index};
use crate::queue::ItemCallback;
use brickwork_core::host::{self, ElementId};
use brickwork_core::math::Vec2;

impl GridSystem {
    /// Move an item from its grid into `target_grid` at `position`.
    ///
    /// Active items are reparented into `container` (the target grid element
    /// by default) keeping their on-screen position, and finish the move with
    /// their next layout. Returns `false` when the position does not resolve.
    pub(crate) fn migrate_start(
        &mut self,
        id: ItemId,
        target_grid: GridId,
        position: ItemTarget,
        container: Option<ElementId>,
        callback: Option<ItemCallback>,
    ) -> bool {
        let host = self.host.clone();
        let Some((grid, element, active, visible)) = self
            .item(id)
            .filter(|item| !item.is_destroyed())
            .map(|item| (item.grid, item.element, item.is_active(), item.is_visible()))
        else {
            return false;
        };
        let (Some(source), Some(target)) = (self.grid(grid), self.grid(target_grid)) else {
            return false;
        };
        let source_settings = source.settings.clone();
        let target_settings = target.settings.clone();
        let target_element = target.element;
        let Some(from_index) = source.items.iter().position(|i| *i == id) else {
            return false;
        };
        let to_index = match position {
            ItemTarget::Index(index) => normalize_index(target.items.len(), index, true),
            other => {
                let Some(target_item) = self.get_item(target_grid, other) else {
                    return false;
                };
                match target.items.iter().position(|i| *i == target_item) {
                    Some(index) => index,
                    None => return false,
                }
            }
        };
        let container = container.unwrap_or(target_element);

        // Settle whatever is in flight at the current visual position.
        self.drag_stop(id);
        let mut translate = host::translate(host.as_ref(), element);
        self.stop_item_layout(id, true, Some(translate));
        if let Some(diff) = self.item(id).filter(|i| i.migrate.active).map(|i| i.migrate.container_diff) {
            translate -= diff;
            self.migrate_stop(id, true, Some(translate));
        }
        if let Some(diff) = self.item(id).filter(|i| i.release.active).map(|i| i.release.container_diff) {
            translate -= diff;
            self.release_stop(id, true, Some(translate));
        }
        self.stop_visibility(id, true);

        let info = TransferInfo {
            item: id,
            from_grid: grid,
            from_index,
            to_grid: target_grid,
            to_index,
        };
        self.emit(grid, GridEvent::BeforeSend(info));
        self.emit(target_grid, GridEvent::BeforeReceive(info));

        let (from_class, to_class) = (&source_settings.classes, &target_settings.classes);
        if from_class.item != to_class.item {
            host.remove_class(element, &from_class.item);
            host.add_class(element, &to_class.item);
        }
        let (current_vis, next_vis) = if visible {
            (&from_class.shown, &to_class.shown)
        } else {
            (&from_class.hidden, &to_class.hidden)
        };
        if current_vis != next_vis {
            host.remove_class(element, current_vis);
            host.add_class(element, next_vis);
        }

        if let Some(source) = self.grid_mut(grid) {
            source.items.retain(|i| *i != id);
        }
        if let Some(target) = self.grid_mut(target_grid) {
            let index = to_index.min(target.items.len());
            target.items.insert(index, id);
        }

        let mut container_diff = Vec2::ZERO;
        if active {
            if let Some(current) = host.parent(element)
                && current != container
            {
                host.append_child(container, element);
                let offset = host::offset_diff(host.as_ref(), container, current);
                host::set_translate(host.as_ref(), element, translate + offset);
            }
            container_diff = host::offset_diff(host.as_ref(), container, target_element);
        } else {
            host.append_child(target_element, element);
        }

        let child = match self.item_mut(id) {
            Some(item) => {
                item.grid = target_grid;
                item.sort_data = None;
                item.drag = target_settings
                    .drag_enabled
                    .then(|| ItemDrag::new(target_grid, target_settings.drag_sort_interval));
                item.migrate = if active {
                    ItemMigrate {
                        active: true,
                        container: Some(container),
                        container_diff,
                    }
                } else {
                    ItemMigrate::default()
                };
                item.settle.push_opt(callback);
                item.child
            }
            None => return false,
        };
        if let Some(child) = child {
            host::set_styles(host.as_ref(), child, target_settings.visibility_styles(visible));
        }
        self.refresh_dimensions(id, false);

        self.emit(grid, GridEvent::Send(info));
        self.emit(target_grid, GridEvent::Receive(info));

        if !active {
            let callbacks = self.item_mut(id).map(|item| item.settle.take()).unwrap_or_default();
            self.run_callbacks(callbacks, false, id);
        }
        true
    }

    /// End a migration: move the element from the migration container into
    /// its grid element. Aborting keeps the current visual position, a
    /// normal stop lands on the layout position.
    pub(crate) fn migrate_stop(&mut self, id: ItemId, abort: bool, position: Option<Vec2>) {
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !item.migrate.active {
            return;
        }
        let migrate = std::mem::take(&mut item.migrate);
        let (grid, element, layout_position) = (item.grid, item.element, item.position);
        let callbacks = item.settle.take();

        if let Some(grid_element) = self.grid(grid).map(|g| g.element())
            && migrate.container != Some(grid_element)
        {
            let position = position.unwrap_or_else(|| {
                if abort {
                    host::translate(host.as_ref(), element) - migrate.container_diff
                } else {
                    layout_position
                }
            });
            host.append_child(grid_element, element);
            host::set_translate(host.as_ref(), element, position);
        }
        self.run_callbacks(callbacks, abort, id);
    }
}
