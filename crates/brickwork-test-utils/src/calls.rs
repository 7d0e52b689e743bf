//! Recorded host operations.

use brickwork_core::host::{ElementId, StyleProperty};

/// A mutating host call, recorded for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    AppendChild {
        parent: ElementId,
        child: ElementId,
    },
    RemoveElement {
        element: ElementId,
    },
    SetDisplayed {
        element: ElementId,
        displayed: bool,
    },
    SetStyle {
        element: ElementId,
        property: StyleProperty,
        value: f32,
    },
    RemoveStyle {
        element: ElementId,
        property: StyleProperty,
    },
    ClearStyles {
        element: ElementId,
    },
    AddClass {
        element: ElementId,
        class: String,
    },
    RemoveClass {
        element: ElementId,
        class: String,
    },
    Navigate {
        href: String,
        target: Option<String>,
    },
}

impl HostCall {
    /// The element the call touched, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            HostCall::AppendChild { child, .. } => Some(*child),
            HostCall::RemoveElement { element }
            | HostCall::SetDisplayed { element, .. }
            | HostCall::SetStyle { element, .. }
            | HostCall::RemoveStyle { element, .. }
            | HostCall::ClearStyles { element }
            | HostCall::AddClass { element, .. }
            | HostCall::RemoveClass { element, .. } => Some(*element),
            HostCall::Navigate { .. } => None,
        }
    }
}
