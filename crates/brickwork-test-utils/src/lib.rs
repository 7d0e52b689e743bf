//! Test utilities for the Brickwork grid engine.
//!
//! The main component is `MockHost` (requires the `mock` feature): an
//! in-memory element tree implementing [`brickwork_core::host::Host`] that
//! computes client rectangles from sizes, margins, borders and translates,
//! and records every mutating call as a [`HostCall`].
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use brickwork_core::geometry::{Rect, Size};
//! use brickwork_core::host::Host;
//! use brickwork_test_utils::MockHost;
//!
//! let host = MockHost::new();
//! let container = host.create_container(host.body(), Rect::new(0.0, 0.0, 400.0, 300.0));
//! let item = host.create_item(container, Size::new(100.0, 100.0));
//!
//! assert!(host.is_attached(item));
//! assert_eq!(host.size(item), Size::new(100.0, 100.0));
//! # }
//! ```

pub mod calls;
#[cfg(feature = "mock")]
pub mod mock_host;

pub use calls::HostCall;
#[cfg(feature = "mock")]
pub use mock_host::MockHost;
