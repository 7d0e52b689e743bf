use super::{ItemFlags, ItemId};
use crate::animation::Easing;
use crate::grid::{GridSystem, Tick};
use crate::queue::ItemCallback;
use crate::scheduler::TickKind;
use brickwork_core::host::{self, StyleMap};
use brickwork_core::math::Vec2;

impl GridSystem {
    /// Start showing an item.
    ///
    /// Showing a visible item calls back right away; showing a showing item
    /// only queues the callback unless `instant`.
    pub(crate) fn show_item(&mut self, id: ItemId, instant: bool, callback: Option<ItemCallback>) {
        let Some(settings) = self.item_settings(id) else {
            self.run_callbacks(callback.into_iter().collect(), true, id);
            return;
        };
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        let showing = item.is_showing();
        if !showing && item.is_visible() {
            self.run_callbacks(callback.into_iter().collect(), false, id);
            return;
        }
        if showing && !instant {
            item.visibility.queue.push_opt(callback);
            return;
        }

        let mut interrupted = Vec::new();
        if !showing {
            interrupted = item.visibility.queue.take();
            host.remove_class(item.element, &settings.classes.hidden);
            host.add_class(item.element, &settings.classes.shown);
            if !item.is_hiding() {
                host.set_displayed(item.element, true);
            }
        }
        item.visibility.queue.push_opt(callback);
        item.flags.insert(ItemFlags::SHOWING);
        item.flags.remove(ItemFlags::HIDING | ItemFlags::HIDDEN);

        self.run_callbacks(interrupted, true, id);
        self.start_visibility_animation(id, true, instant);
    }

    /// Start hiding an item. Mirrors [`Self::show_item`].
    pub(crate) fn hide_item(&mut self, id: ItemId, instant: bool, callback: Option<ItemCallback>) {
        let Some(settings) = self.item_settings(id) else {
            self.run_callbacks(callback.into_iter().collect(), true, id);
            return;
        };
        let host = self.host.clone();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        let hiding = item.is_hiding();
        if !hiding && !item.is_visible() {
            self.run_callbacks(callback.into_iter().collect(), false, id);
            return;
        }
        if hiding && !instant {
            item.visibility.queue.push_opt(callback);
            return;
        }

        let mut interrupted = Vec::new();
        if !hiding {
            interrupted = item.visibility.queue.take();
            host.add_class(item.element, &settings.classes.hidden);
            host.remove_class(item.element, &settings.classes.shown);
        }
        item.visibility.queue.push_opt(callback);
        item.flags.insert(ItemFlags::HIDING | ItemFlags::HIDDEN);
        item.flags.remove(ItemFlags::SHOWING);

        self.run_callbacks(interrupted, true, id);
        self.start_visibility_animation(id, false, instant);
    }

    fn start_visibility_animation(&mut self, id: ItemId, visible: bool, instant: bool) {
        let Some(settings) = self.item_settings(id) else {
            return;
        };
        let target = settings.visibility_styles(visible).clone();
        let (duration, easing) = if visible {
            (settings.show_duration, settings.show_easing)
        } else {
            (settings.hide_duration, settings.hide_easing)
        };
        self.cancel_tick(TickKind::Visibility, id);

        let Some(item) = self.item_mut(id) else {
            return;
        };
        let child = match item.child {
            Some(child) if !target.is_empty() => child,
            _ => {
                self.finish_visibility(id);
                return;
            }
        };
        if instant || duration <= 0.0 {
            item.visibility.animator.stop();
            host::set_styles(self.host.as_ref(), child, &target);
            self.finish_visibility(id);
            return;
        }
        item.visibility.animator.detach();
        self.schedule(
            TickKind::Visibility,
            id,
            Tick::Visibility {
                target,
                duration,
                easing,
            },
        );
    }

    /// Write phase of a visibility tick.
    pub(crate) fn visibility_tick_write(
        &mut self,
        id: ItemId,
        current: StyleMap,
        target: StyleMap,
        duration: f32,
        easing: Easing,
    ) {
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !item.is_showing() && !item.is_hiding() {
            return;
        }
        item.visibility.animator.start(current, target, duration, easing);
    }

    /// Complete whichever visibility transition is running.
    pub(crate) fn finish_visibility(&mut self, id: ItemId) {
        let Some(item) = self.item(id) else {
            return;
        };
        if item.is_showing() {
            self.finish_show(id);
        } else if item.is_hiding() {
            self.finish_hide(id);
        }
    }

    fn finish_show(&mut self, id: ItemId) {
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if item.flags.contains(ItemFlags::HIDDEN) {
            return;
        }
        item.flags.remove(ItemFlags::SHOWING);
        let callbacks = item.visibility.queue.take();
        self.run_callbacks(callbacks, false, id);
    }

    fn finish_hide(&mut self, id: ItemId) {
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !item.flags.contains(ItemFlags::HIDDEN) {
            return;
        }
        item.flags.remove(ItemFlags::HIDING);
        let element = item.element;
        self.stop_item_layout(id, true, Some(Vec2::ZERO));
        host::set_translate(self.host.as_ref(), element, Vec2::ZERO);
        self.host.set_displayed(element, false);
        let callbacks = match self.item_mut(id) {
            Some(item) => item.visibility.queue.take(),
            None => return,
        };
        self.run_callbacks(callbacks, false, id);
    }

    /// Halt a running show/hide where it is. The item keeps its logical
    /// visibility.
    pub(crate) fn stop_visibility(&mut self, id: ItemId, process_callbacks: bool) {
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if !item.is_showing() && !item.is_hiding() {
            return;
        }
        item.visibility.animator.stop();
        item.flags.remove(ItemFlags::SHOWING | ItemFlags::HIDING);
        let callbacks = if process_callbacks {
            item.visibility.queue.take()
        } else {
            Vec::new()
        };
        self.cancel_tick(TickKind::Visibility, id);
        self.run_callbacks(callbacks, true, id);
    }
}
