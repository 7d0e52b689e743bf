use super::{ItemFlags, ItemId};
use crate::animation::Easing;
use crate::grid::{GridSystem, Tick};
use crate::queue::ItemCallback;
use crate::scheduler::TickKind;
use brickwork_core::host::{self, StyleProperty, style_map};
use brickwork_core::math::Vec2;

/// Translates closer than this count as already in place.
const POSITION_EPSILON: f32 = 0.01;

impl GridSystem {
    /// Move an item to its layout target.
    ///
    /// The callback joins the layout queue. A layout already in flight is
    /// superseded and its queue flushed as interrupted.
    pub(crate) fn start_item_layout(&mut self, id: ItemId, instant: bool, callback: Option<ItemCallback>) {
        let Some(settings) = self.item_settings(id) else {
            if let Some(callback) = callback {
                self.run_callbacks(vec![callback], true, id);
            }
            return;
        };
        let Some(item) = self.item_mut(id) else {
            return;
        };

        let just_released = item.release.is_just_released();
        let (duration, easing) = if just_released {
            (settings.drag_release_duration, settings.drag_release_easing)
        } else {
            (settings.layout_duration, settings.layout_easing)
        };
        let was_positioning = item.is_positioning();
        let animate = !instant && !item.flags.contains(ItemFlags::SKIP_NEXT_ANIMATION) && duration > 0.0;

        let interrupted = if was_positioning {
            item.layout.queue.take()
        } else {
            Vec::new()
        };
        if just_released {
            item.release.positioning_started = true;
        }
        item.layout.queue.push_opt(callback);
        item.flags.remove(ItemFlags::SKIP_NEXT_ANIMATION);

        if was_positioning {
            self.cancel_tick(TickKind::Layout, id);
            self.run_callbacks(interrupted, true, id);
        }

        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !animate {
            let element = item.element;
            let target = item.layout_target();
            item.layout.animator.stop();
            host::set_translate(self.host.as_ref(), element, target);
            self.finish_item_layout(id);
            return;
        }

        item.layout.animator.detach();
        item.flags.insert(ItemFlags::POSITIONING);
        item.layout.interrupted = was_positioning;
        self.schedule(TickKind::Layout, id, Tick::Layout { duration, easing });
    }

    /// Write phase of a layout tick: `current` is the translate read in the
    /// same batch.
    pub(crate) fn layout_tick_write(&mut self, id: ItemId, current: Vec2, duration: f32, easing: Easing) {
        let Some(settings) = self.item_settings(id) else {
            return;
        };
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !item.is_positioning() {
            return;
        }
        let target = item.layout_target();
        if current.abs_diff_eq(target, POSITION_EPSILON) {
            if item.layout.interrupted {
                item.layout.animator.stop();
            }
            self.finish_item_layout(id);
            return;
        }

        if !item.layout.interrupted {
            host.add_class(item.element, &settings.classes.positioning);
        }
        item.layout.animator.start(
            style_map([
                (StyleProperty::TranslateX, current.x),
                (StyleProperty::TranslateY, current.y),
            ]),
            style_map([
                (StyleProperty::TranslateX, target.x),
                (StyleProperty::TranslateY, target.y),
            ]),
            duration,
            easing,
        );
        tracing::trace!("{} animating to {:?}", id, target);
    }

    /// Layout transition done: settle any release or migration and flush the
    /// layout queue.
    pub(crate) fn finish_item_layout(&mut self, id: ItemId) {
        let settings = self.item_settings(id);
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if item.is_destroyed() {
            return;
        }
        if item.flags.contains(ItemFlags::POSITIONING) {
            item.flags.remove(ItemFlags::POSITIONING);
            item.layout.interrupted = false;
            let element = item.element;
            if let Some(settings) = settings {
                self.host.remove_class(element, &settings.classes.positioning);
            }
        }
        self.release_stop(id, false, None);
        self.migrate_stop(id, false, None);
        let callbacks = match self.item_mut(id) {
            Some(item) => item.layout.queue.take(),
            None => return,
        };
        self.run_callbacks(callbacks, false, id);
    }

    /// Stop a layout transition where it is, or at `target` when given.
    pub(crate) fn stop_item_layout(&mut self, id: ItemId, process_callbacks: bool, target: Option<Vec2>) {
        let settings = self.item_settings(id);
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !item.is_positioning() {
            return;
        }
        let element = item.element;
        if item.layout.animator.is_animating() {
            let position = target.unwrap_or_else(|| host::translate(host.as_ref(), element));
            host::set_translate(host.as_ref(), element, position);
            item.layout.animator.stop();
        }
        item.flags.remove(ItemFlags::POSITIONING);
        item.layout.interrupted = false;
        let callbacks = if process_callbacks {
            item.layout.queue.take()
        } else {
            Vec::new()
        };
        if let Some(settings) = settings {
            host.remove_class(element, &settings.classes.positioning);
        }
        self.cancel_tick(TickKind::Layout, id);
        self.run_callbacks(callbacks, true, id);
    }
}
