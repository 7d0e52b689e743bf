//! Grid items.
//!
//! An [`Item`] is the engine's record of one managed element: its measured
//! size, its logical position from the last layout pass, its visibility and
//! the transitions in flight. The controllers that drive those transitions
//! live in the submodules as `GridSystem` methods, since each of them needs
//! the host, the scheduler and the owning grid.

mod layout;
mod migrate;
mod release;
mod visibility;

use crate::animation::Animator;
use crate::drag::ItemDrag;
use crate::grid::GridId;
use crate::queue::CallbackQueue;
use crate::sort::SortData;
use bitflags::bitflags;
use brickwork_core::alloc::IndexSlot;
use brickwork_core::geometry::{Margins, Size};
use brickwork_core::host::ElementId;
use brickwork_core::math::Vec2;
use std::fmt;

/// Generational handle to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(IndexSlot);

impl ItemId {
    pub(crate) fn from_slot(slot: IndexSlot) -> Self {
        Self(slot)
    }

    pub(crate) fn slot(&self) -> IndexSlot {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({}v{})", self.0.index(), self.0.generation())
    }
}

bitflags! {
    /// Item state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u8 {
        /// Takes part in layout.
        const ACTIVE              = 1 << 0;
        /// Hidden, or on its way to hidden.
        const HIDDEN              = 1 << 1;
        const SHOWING             = 1 << 2;
        const HIDING              = 1 << 3;
        /// A layout transition is running or queued.
        const POSITIONING         = 1 << 4;
        /// Apply the next layout without animation.
        const SKIP_NEXT_ANIMATION = 1 << 5;
        const DESTROYED           = 1 << 6;
    }
}

/// Layout transition state (element channel).
#[derive(Debug, Default)]
pub(crate) struct ItemLayout {
    pub animator: Animator,
    pub queue: CallbackQueue,
    /// The transition replaced one that was still running.
    pub interrupted: bool,
}

/// Visibility transition state (child channel).
#[derive(Debug, Default)]
pub(crate) struct ItemVisibility {
    pub animator: Animator,
    pub queue: CallbackQueue,
}

/// Post-drag release record.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ItemRelease {
    pub active: bool,
    pub positioning_started: bool,
    pub container_diff: Vec2,
}

impl ItemRelease {
    /// Released but its layout has not started yet.
    pub fn is_just_released(&self) -> bool {
        self.active && !self.positioning_started
    }
}

/// Cross-grid migration record.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ItemMigrate {
    pub active: bool,
    pub container: Option<ElementId>,
    pub container_diff: Vec2,
}

pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) grid: GridId,
    pub(crate) element: ElementId,
    pub(crate) child: Option<ElementId>,
    pub(crate) size: Size<f32>,
    pub(crate) margins: Margins,
    pub(crate) position: Vec2,
    pub(crate) flags: ItemFlags,
    pub(crate) sort_data: Option<SortData>,
    pub(crate) layout: ItemLayout,
    pub(crate) visibility: ItemVisibility,
    pub(crate) drag: Option<ItemDrag>,
    pub(crate) release: ItemRelease,
    pub(crate) migrate: ItemMigrate,
    /// Callbacks waiting for a migration or release to settle.
    pub(crate) settle: CallbackQueue,
}

impl Item {
    pub(crate) fn new(id: ItemId, grid: GridId, element: ElementId, child: Option<ElementId>, active: bool) -> Self {
        let flags = if active {
            ItemFlags::ACTIVE
        } else {
            ItemFlags::HIDDEN
        };
        Self {
            id,
            grid,
            element,
            child,
            size: Size::new(0.0, 0.0),
            margins: Margins::ZERO,
            position: Vec2::ZERO,
            flags,
            sort_data: None,
            layout: ItemLayout::default(),
            visibility: ItemVisibility::default(),
            drag: None,
            release: ItemRelease::default(),
            migrate: ItemMigrate::default(),
            settle: CallbackQueue::new(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn grid(&self) -> GridId {
        self.grid
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// The content child that visibility styles are applied to.
    pub fn child(&self) -> Option<ElementId> {
        self.child
    }

    /// Border-box size from the last measurement.
    pub fn size(&self) -> Size<f32> {
        self.size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Size including margins, as handed to the layout.
    pub fn outer_size(&self) -> Size<f32> {
        Size::new(
            self.size.width + self.margins.horizontal(),
            self.size.height + self.margins.vertical(),
        )
    }

    /// Position assigned by the last layout pass, relative to the grid.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(ItemFlags::ACTIVE)
    }

    pub fn is_visible(&self) -> bool {
        !self.flags.contains(ItemFlags::HIDDEN)
    }

    pub fn is_showing(&self) -> bool {
        self.flags.contains(ItemFlags::SHOWING)
    }

    pub fn is_hiding(&self) -> bool {
        self.flags.contains(ItemFlags::HIDING)
    }

    pub fn is_positioning(&self) -> bool {
        self.flags.contains(ItemFlags::POSITIONING)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|drag| drag.is_active())
    }

    pub fn is_releasing(&self) -> bool {
        self.release.active
    }

    pub fn is_migrating(&self) -> bool {
        self.migrate.active
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags.contains(ItemFlags::DESTROYED)
    }

    /// Cached sort data; `None` until computed or after it went stale.
    pub fn sort_data(&self) -> Option<&SortData> {
        self.sort_data.as_ref()
    }

    pub fn drag(&self) -> Option<&ItemDrag> {
        self.drag.as_ref()
    }

    /// Offset added to the layout position while the element sits in another
    /// container.
    pub(crate) fn active_offset(&self) -> Vec2 {
        if self.release.active {
            self.release.container_diff
        } else if self.migrate.active {
            self.migrate.container_diff
        } else {
            Vec2::ZERO
        }
    }

    /// Translate the next layout transition aims for.
    pub(crate) fn layout_target(&self) -> Vec2 {
        self.position + self.active_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item::new(
            ItemId::from_slot(IndexSlot::new(0, 0)),
            GridId::from_slot(IndexSlot::new(0, 0)),
            ElementId::from_raw(1),
            None,
            true,
        )
    }

    #[test]
    fn test_new_item_flags() {
        let item = item();
        assert!(item.is_active());
        assert!(item.is_visible());
        assert!(!item.is_positioning());
        assert!(item.sort_data().is_none());
    }

    #[test]
    fn test_layout_target_prefers_release_offset() {
        let mut item = item();
        item.position = Vec2::new(10.0, 20.0);
        item.migrate.active = true;
        item.migrate.container_diff = Vec2::new(5.0, 5.0);
        assert_eq!(item.layout_target(), Vec2::new(15.0, 25.0));

        item.release.active = true;
        item.release.container_diff = Vec2::new(-10.0, 0.0);
        assert_eq!(item.layout_target(), Vec2::new(0.0, 20.0));
    }

    #[test]
    fn test_outer_size() {
        let mut item = item();
        item.size = Size::new(100.0, 50.0);
        item.margins = Margins::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(item.outer_size(), Size::new(103.0, 57.0));
    }
}
