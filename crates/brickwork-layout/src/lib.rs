//! Brickwork Layout - the grid bin-packer.
//!
//! [`Packer`] places an ordered list of boxes into a container of fixed width
//! (vertical mode) or fixed height (horizontal mode), filling free slots
//! first-fit and growing the packed extent only when nothing fits.
//!
//! ```
//! use brickwork_core::geometry::Size;
//! use brickwork_layout::{Packer, PackerSettings};
//!
//! let boxes = vec![Size::new(100.0, 100.0); 4];
//! let layout = Packer::new().pack(&boxes, Size::new(250.0, 0.0), &PackerSettings::default());
//!
//! assert_eq!(layout.height, 200.0);
//! assert_eq!((layout.slots[2].x, layout.slots[2].y), (0.0, 100.0));
//! ```

pub mod packer;

pub use packer::{PackedLayout, Packer, PackerSettings};
