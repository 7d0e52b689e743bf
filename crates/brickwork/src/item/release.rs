use super::{ItemId, ItemRelease};
use crate::events::GridEvent;
use crate::grid::GridSystem;
use brickwork_core::host;
use brickwork_core::math::Vec2;

impl GridSystem {
    /// Hand a dropped item back to layout flow.
    pub(crate) fn release_start(&mut self, id: ItemId) {
        let Some(settings) = self.item_settings(id) else {
            return;
        };
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if item.is_destroyed() || item.release.active {
            return;
        }
        item.release.active = true;
        let (grid, element) = (item.grid, item.element);
        self.host.add_class(element, &settings.classes.releasing);
        self.emit(grid, GridEvent::DragReleaseStart { item: id });
        self.start_item_layout(id, false, None);
    }

    /// End a release. The element goes back into its grid element at
    /// `position`, or at its current visual position when `None`.
    pub(crate) fn release_stop(&mut self, id: ItemId, abort: bool, position: Option<Vec2>) {
        let Some(settings) = self.item_settings(id) else {
            return;
        };
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !item.release.active {
            return;
        }
        let (grid, element, diff) = (item.grid, item.element, item.release.container_diff);
        item.release = ItemRelease::default();
        let callbacks = item.settle.take();

        if let Some(grid_element) = self.grid(grid).map(|g| g.element())
            && host.parent(element) != Some(grid_element)
        {
            let position = position.unwrap_or_else(|| host::translate(host.as_ref(), element) - diff);
            host.append_child(grid_element, element);
            host::set_translate(host.as_ref(), element, position);
        }
        host.remove_class(element, &settings.classes.releasing);
        if !abort {
            self.emit(grid, GridEvent::DragReleaseEnd { item: id });
        }
        self.run_callbacks(callbacks, abort, id);
    }
}
