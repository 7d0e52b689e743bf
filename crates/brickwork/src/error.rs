use brickwork_core::host::ElementId;
use thiserror::Error;

/// Errors returned when constructing a grid.
///
/// Every other grid operation is total: invalid ids and destroyed grids turn
/// the call into a no-op instead of an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid root {0} is not attached to the document")]
    InvalidRoot(ElementId),
    #[error("dragging is enabled but the host has no gesture support")]
    GestureUnavailable,
}

pub type GridResult<T> = Result<T, GridError>;
