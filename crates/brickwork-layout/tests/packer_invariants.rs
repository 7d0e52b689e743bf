//! Property tests for the packer.
//!
//! These check the guarantees callers rely on: placements never overlap,
//! boxes keep their size, passes are reproducible and, without gap filling,
//! the packing frontier only moves forward.

use brickwork_core::geometry::{Rect, Size};
use brickwork_layout::{PackedLayout, Packer, PackerSettings};
use proptest::prelude::*;

fn boxes_strategy() -> impl Strategy<Value = Vec<Size<f32>>> {
    prop::collection::vec(
        (1u32..=200, 1u32..=200).prop_map(|(w, h)| Size::new(w as f32, h as f32)),
        0..40,
    )
}

fn assert_no_overlap(slots: &[Rect<f32>]) {
    for (i, a) in slots.iter().enumerate() {
        for b in &slots[i + 1..] {
            assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
        }
    }
}

fn pack(boxes: &[Size<f32>], width: f32, settings: PackerSettings) -> PackedLayout {
    Packer::new().pack(boxes, Size::new(width, width), &settings)
}

proptest! {
    #[test]
    fn vertical_placements_never_overlap(boxes in boxes_strategy(), width in 50u32..=600, fill in any::<bool>()) {
        let layout = pack(&boxes, width as f32, PackerSettings::default().fill_gaps(fill));
        prop_assert_eq!(layout.slots.len(), boxes.len());
        assert_no_overlap(&layout.slots);
    }

    #[test]
    fn horizontal_placements_never_overlap(boxes in boxes_strategy(), height in 50u32..=600, fill in any::<bool>()) {
        let layout = pack(&boxes, height as f32, PackerSettings::default().horizontal(true).fill_gaps(fill));
        assert_no_overlap(&layout.slots);
    }

    #[test]
    fn placements_keep_input_size(boxes in boxes_strategy(), width in 50u32..=600) {
        let layout = pack(&boxes, width as f32, PackerSettings::default());
        for (slot, size) in layout.slots.iter().zip(&boxes) {
            prop_assert_eq!(slot.size(), *size);
        }
    }

    #[test]
    fn packing_is_reproducible(boxes in boxes_strategy(), width in 50u32..=600, fill in any::<bool>()) {
        let settings = PackerSettings::default().fill_gaps(fill);
        let mut packer = Packer::new();
        let first = packer.pack(&boxes, Size::new(width as f32, 0.0), &settings);
        let second = packer.pack(&boxes, Size::new(width as f32, 0.0), &settings);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn frontier_never_moves_back(boxes in boxes_strategy(), width in 50u32..=600) {
        let layout = pack(&boxes, width as f32, PackerSettings::default());
        for pair in layout.slots.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                (b.y, b.x) >= (a.y, a.x),
                "{:?} placed before {:?}", b, a
            );
        }
        let extent = layout.slots.iter().map(|r| r.bottom()).fold(0.0, f32::max);
        prop_assert_eq!(layout.height, extent);
    }

    #[test]
    fn items_stay_within_width(boxes in boxes_strategy(), width in 200u32..=600) {
        let layout = pack(&boxes, width as f32, PackerSettings::default().fill_gaps(true));
        for slot in &layout.slots {
            prop_assert!(slot.right() <= width as f32 || slot.x == 0.0);
        }
    }
}
