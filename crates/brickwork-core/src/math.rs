//! Vector math re-exported from [`glam`].
//!
//! Translations, drag displacement and container offset diffs are all plain
//! [`Vec2`] values.
//!
//! ```
//! use brickwork_core::math::Vec2;
//!
//! let start = Vec2::new(10.0, 20.0);
//! let delta = Vec2::new(5.0, -5.0);
//! assert_eq!(start + delta, Vec2::new(15.0, 15.0));
//! ```
//!
//! [`glam`]: https://docs.rs/glam
pub use glam::Vec2;
