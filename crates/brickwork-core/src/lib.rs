//! Brickwork Core
//!
//! This crate contains the shared building blocks of the Brickwork grid
//! engine: generational arenas, geometry primitives, the host abstraction
//! that stands in for the document, logging and profiling setup.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod math;
pub mod profiling;
