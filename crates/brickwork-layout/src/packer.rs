//! First-fit packer with a free-slot list.

use brickwork_core::geometry::{Rect, Size};
use brickwork_core::profiling::profile_function;
use std::cmp::Ordering;

/// Tolerance when testing whether a box fits into a slot.
const FIT_LEEWAY: f32 = 0.001;

/// Slots thinner than this are dropped.
const MIN_SLOT_EXTENT: f32 = 0.49;

/// Packing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackerSettings {
    /// Let every later box fall back into earlier gaps. Slower, denser.
    pub fill_gaps: bool,
    /// Pack left-to-right with a fixed height instead of top-to-bottom with a
    /// fixed width.
    pub horizontal: bool,
    /// Mirror placements across the final width.
    pub align_right: bool,
    /// Mirror placements across the final height.
    pub align_bottom: bool,
    /// Round the container size and every box to whole pixels.
    pub rounding: bool,
}

impl Default for PackerSettings {
    fn default() -> Self {
        Self {
            fill_gaps: false,
            horizontal: false,
            align_right: false,
            align_bottom: false,
            rounding: true,
        }
    }
}

impl PackerSettings {
    pub fn fill_gaps(mut self, fill_gaps: bool) -> Self {
        self.fill_gaps = fill_gaps;
        self
    }

    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn align_right(mut self, align_right: bool) -> Self {
        self.align_right = align_right;
        self
    }

    pub fn align_bottom(mut self, align_bottom: bool) -> Self {
        self.align_bottom = align_bottom;
        self
    }

    pub fn rounding(mut self, rounding: bool) -> Self {
        self.rounding = rounding;
        self
    }
}

/// Result of a packing pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackedLayout {
    /// One rectangle per input box, in input order.
    pub slots: Vec<Rect<f32>>,
    /// Content width. Fixed in vertical mode, grown in horizontal mode.
    pub width: f32,
    /// Content height. Grown in vertical mode, fixed in horizontal mode.
    pub height: f32,
    /// The caller must size the container's width explicitly.
    pub set_width: bool,
    /// The caller must size the container's height explicitly.
    pub set_height: bool,
}

impl PackedLayout {
    /// An empty layout for a container of the given size.
    pub fn empty(size: Size<f32>, settings: &PackerSettings) -> Self {
        let round = |v: f32| if settings.rounding { v.round() } else { v };
        Self {
            slots: Vec::new(),
            width: if settings.horizontal { 0.0 } else { round(size.width) },
            height: if settings.horizontal { round(size.height) } else { 0.0 },
            set_width: settings.horizontal,
            set_height: !settings.horizontal,
        }
    }
}

/// Rectangle packer.
///
/// Holds scratch buffers between passes; a pass never depends on the state
/// left by a previous one.
#[derive(Debug, Default)]
pub struct Packer {
    free: Vec<Rect<f32>>,
    next: Vec<Rect<f32>>,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack `boxes` into a container of `size`.
    ///
    /// Only the cross-axis dimension of `size` is used: width in vertical
    /// mode, height in horizontal mode.
    pub fn pack(
        &mut self,
        boxes: &[Size<f32>],
        size: Size<f32>,
        settings: &PackerSettings,
    ) -> PackedLayout {
        profile_function!();
        let mut layout = PackedLayout::empty(size, settings);
        if boxes.is_empty() {
            return layout;
        }

        self.free.clear();
        layout.slots.reserve(boxes.len());
        for size in boxes {
            self.place(*size, &mut layout, settings);
        }

        if settings.align_right {
            for slot in &mut layout.slots {
                slot.x = layout.width - slot.right();
            }
        }
        if settings.align_bottom {
            for slot in &mut layout.slots {
                slot.y = layout.height - slot.bottom();
            }
        }

        self.free.clear();
        self.next.clear();
        tracing::trace!(
            items = boxes.len(),
            width = layout.width,
            height = layout.height,
            "packed layout"
        );
        layout
    }

    fn place(&mut self, size: Size<f32>, layout: &mut PackedLayout, settings: &PackerSettings) {
        let horizontal = settings.horizontal;
        let mut item = if settings.rounding {
            Rect::new(0.0, 0.0, size.width.round(), size.height.round())
        } else {
            Rect::new(0.0, 0.0, size.width, size.height)
        };

        let found = self.free.iter().position(|slot| {
            item.width <= slot.width + FIT_LEEWAY && item.height <= slot.height + FIT_LEEWAY
        });

        self.next.clear();
        let first_kept = match found {
            Some(index) => {
                item.x = self.free[index].x;
                item.y = self.free[index].y;
                if settings.fill_gaps { 0 } else { index }
            }
            None => {
                if horizontal {
                    item.x = layout.width;
                } else {
                    item.y = layout.height;
                }
                if settings.fill_gaps { 0 } else { self.free.len() }
            }
        };

        // Extending the packed extent opens fresh unbounded slots beside the item.
        if !horizontal && item.bottom() > layout.height {
            if item.x > 0.0 {
                self.next
                    .push(Rect::new(0.0, layout.height, item.x, f32::INFINITY));
            }
            if item.right() < layout.width {
                self.next.push(Rect::new(
                    item.right(),
                    layout.height,
                    layout.width - item.right(),
                    f32::INFINITY,
                ));
            }
            layout.height = item.bottom();
        }
        if horizontal && item.right() > layout.width {
            if item.y > 0.0 {
                self.next
                    .push(Rect::new(layout.width, 0.0, f32::INFINITY, item.y));
            }
            if item.bottom() < layout.height {
                self.next.push(Rect::new(
                    layout.width,
                    item.bottom(),
                    f32::INFINITY,
                    layout.height - item.bottom(),
                ));
            }
            layout.width = item.right();
        }

        for slot in &self.free[first_kept..] {
            for piece in split_rect(slot, &item) {
                let in_bounds = if horizontal {
                    piece.x < layout.width
                } else {
                    piece.y < layout.height
                };
                if piece.width > MIN_SLOT_EXTENT && piece.height > MIN_SLOT_EXTENT && in_bounds {
                    self.next.push(piece);
                }
            }
        }

        if !self.next.is_empty() {
            purge_contained(&mut self.next);
            if horizontal {
                self.next.sort_by(|a, b| cmp_f32(a.x, b.x).then(cmp_f32(a.y, b.y)));
            } else {
                self.next.sort_by(|a, b| cmp_f32(a.y, b.y).then(cmp_f32(a.x, b.x)));
            }
        }

        layout.slots.push(item);
        std::mem::swap(&mut self.free, &mut self.next);
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Subtract `hole` from `rect`, returning up to four overlapping remainders.
fn split_rect(rect: &Rect<f32>, hole: &Rect<f32>) -> Vec<Rect<f32>> {
    if !rect.overlaps(hole) {
        return vec![*rect];
    }

    let mut pieces = Vec::with_capacity(4);
    if rect.x < hole.x {
        pieces.push(Rect::new(rect.x, rect.y, hole.x - rect.x, rect.height));
    }
    if rect.right() > hole.right() {
        pieces.push(Rect::new(
            hole.right(),
            rect.y,
            rect.right() - hole.right(),
            rect.height,
        ));
    }
    if rect.y < hole.y {
        pieces.push(Rect::new(rect.x, rect.y, rect.width, hole.y - rect.y));
    }
    if rect.bottom() > hole.bottom() {
        pieces.push(Rect::new(
            rect.x,
            hole.bottom(),
            rect.width,
            rect.bottom() - hole.bottom(),
        ));
    }
    pieces
}

/// Drop every slot that lies within another one. Of two identical slots one
/// survives.
fn purge_contained(slots: &mut Vec<Rect<f32>>) {
    let mut removed = vec![false; slots.len()];
    for i in (0..slots.len()).rev() {
        for j in (0..slots.len()).rev() {
            if i == j || removed[j] {
                continue;
            }
            if slots[i].is_within(&slots[j]) {
                removed[i] = true;
                break;
            }
        }
    }
    let mut index = 0;
    slots.retain(|_| {
        let keep = !removed[index];
        index += 1;
        keep
    });
}
