use crate::item::ItemId;
use brickwork_core::host::ElementId;

/// Refers to an item of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTarget {
    /// Position in the grid order; negative values count from the end.
    Index(isize),
    Element(ElementId),
    Item(ItemId),
}

impl From<isize> for ItemTarget {
    fn from(index: isize) -> Self {
        ItemTarget::Index(index)
    }
}

impl From<i32> for ItemTarget {
    fn from(index: i32) -> Self {
        ItemTarget::Index(index as isize)
    }
}

impl From<ElementId> for ItemTarget {
    fn from(element: ElementId) -> Self {
        ItemTarget::Element(element)
    }
}

impl From<ItemId> for ItemTarget {
    fn from(item: ItemId) -> Self {
        ItemTarget::Item(item)
    }
}

/// Clamp `index` into the valid range of a collection of `len` elements.
///
/// Negative indices count from the end (`-1` is the last slot). With
/// `insertion` the range includes `len`, so `-1` appends.
pub fn normalize_index(len: usize, index: isize, insertion: bool) -> usize {
    let max = (len as isize - 1 + isize::from(insertion)).max(0);
    if index > max {
        max as usize
    } else if index < 0 {
        (max + index + 1).max(0) as usize
    } else {
        index as usize
    }
}

/// Move the element at `from` so it ends up at `to`.
pub fn move_in_place<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() {
        return;
    }
    let value = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, value);
}
