//! Brickwork - animated, draggable packed grids
//!
//! Brickwork manages the children of a container element as a grid of
//! items. It packs them with a bin-packing layout, animates them into
//! place, shows, hides, filters and sorts them, and lets the user drag
//! them around, within one grid or across grids.
//!
//! The document is reached through the [`Host`] trait; the engine itself
//! never sleeps or spawns threads. The embedder calls [`GridSystem::frame`]
//! once per display frame while [`GridSystem::needs_frame`] is true.
//!
//! # Quick Start
//!
//! ```ignore
//! use brickwork::prelude::*;
//!
//! let mut system = GridSystem::new(host);
//! let grid = system.create_grid(container, GridConfig::new().drag_enabled(true))?;
//!
//! system.hide(grid, &[ItemTarget::Index(0)], VisibilityOptions::default());
//! while system.needs_frame() {
//!     system.frame(1.0 / 60.0);
//! }
//! ```
//!
//! # Frame model
//!
//! Each frame advances running animations, fires expired timers and then
//! flushes one batch of scheduled work: every read against the host runs
//! before any write, so a frame never interleaves layout reads with style
//! writes.

pub mod animation;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod grid;
pub mod item;
pub mod layout;
pub mod queue;
pub mod scheduler;
pub mod sort;
pub mod timer;

pub use animation::Easing;
pub use config::{ClassNames, DragAxis, DragSort, GridConfig, GridSettings, ItemSource};
pub use drag::{
    DefaultSortPredicate, DefaultStartPredicate, DragSortPredicate, DragStartPredicate, GestureEvent,
    GesturePhase, ItemDrag, SortContext, SortDecision, StartContext, StartDecision, StartState,
};
pub use error::{GridError, GridResult};
pub use events::{EventKind, GridEvent, ListenerId, SortAction, TransferInfo};
pub use grid::{
    AddOptions, FilterBy, FilterOptions, Grid, GridId, GridSystem, ItemTarget, LayoutOutcome,
    LayoutTrigger, MoveOptions, RemoveOptions, SendOptions, SortOptions, VisibilityOptions,
};
pub use item::{Item, ItemFlags, ItemId};
pub use layout::{LayoutStrategy, PackerLayout};
pub use sort::{SortBy, SortValue};

pub use brickwork_core::geometry::{Margins, Rect, Size};
pub use brickwork_core::host::{ElementId, Host, StyleMap, StyleProperty};
pub use brickwork_core::math::Vec2;

pub mod prelude {
    pub use crate::{
        AddOptions, Easing, ElementId, FilterBy, FilterOptions, GestureEvent, GesturePhase, GridConfig,
        GridEvent, GridId, GridSystem, Host, ItemId, ItemTarget, LayoutTrigger, MoveOptions,
        RemoveOptions, SendOptions, SortAction, SortBy, SortOptions, VisibilityOptions,
    };
}
