//! Host abstraction.
//!
//! The grid engine never touches a document directly. Everything it needs to
//! measure, restyle or reparent goes through the [`Host`] trait, which a
//! browser binding (or the mock in `brickwork-test-utils`) implements.
//!
//! Coordinates:
//! - [`Host::bounding_rect`] is the element's border box in client space.
//! - [`Host::offset`] is the origin that the element's children are
//!   translated against (its padding box corner) in client space.
//! - Item translates are relative to their parent's [`Host::offset`].

use crate::geometry::{Margins, Rect, Size};
use crate::math::Vec2;
use indexmap::IndexMap;
use std::fmt;

/// Opaque handle to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// Numeric style properties the engine reads, writes and animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    /// Opacity (0.0 to 1.0)
    Opacity,
    /// Uniform scale
    Scale,
    /// Rotation in degrees
    Rotation,
    /// X translation in pixels
    TranslateX,
    /// Y translation in pixels
    TranslateY,
    /// Explicit width in pixels
    Width,
    /// Explicit height in pixels
    Height,
}

impl StyleProperty {
    /// Value a property has when no inline style is set.
    pub fn initial_value(&self) -> f32 {
        match self {
            StyleProperty::Opacity | StyleProperty::Scale => 1.0,
            _ => 0.0,
        }
    }
}

/// Ordered set of style values, used as animation keyframes.
pub type StyleMap = IndexMap<StyleProperty, f32>;

/// Build a [`StyleMap`] from `(property, value)` pairs.
pub fn style_map(entries: impl IntoIterator<Item = (StyleProperty, f32)>) -> StyleMap {
    entries.into_iter().collect()
}

/// The document as seen by the grid engine.
///
/// All methods take `&self`; implementations use interior mutability. Unknown
/// elements must be handled gracefully (zero sizes, `false`, no-ops).
pub trait Host {
    /// Whether the element is attached to the document.
    fn is_attached(&self, element: ElementId) -> bool;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn children(&self, element: ElementId) -> Vec<ElementId>;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&self, parent: ElementId, child: ElementId);

    /// Detach the element from the document.
    fn remove_element(&self, element: ElementId);

    fn matches(&self, element: ElementId, selector: &str) -> bool;

    fn tag_name(&self, element: ElementId) -> String;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Border-box size.
    fn size(&self, element: ElementId) -> Size<f32>;

    fn margins(&self, element: ElementId) -> Margins;

    fn borders(&self, element: ElementId) -> Margins;

    fn is_border_box(&self, element: ElementId) -> bool;

    fn bounding_rect(&self, element: ElementId) -> Rect<f32>;

    /// Origin children of this element are positioned against.
    fn offset(&self, element: ElementId) -> Vec2;

    fn is_displayed(&self, element: ElementId) -> bool;

    fn set_displayed(&self, element: ElementId, displayed: bool);

    /// Current value of a style property (the initial value when unset).
    fn style(&self, element: ElementId, property: StyleProperty) -> f32;

    fn set_style(&self, element: ElementId, property: StyleProperty, value: f32);

    fn remove_style(&self, element: ElementId, property: StyleProperty);

    /// Remove every inline style from the element.
    fn clear_styles(&self, element: ElementId);

    fn add_class(&self, element: ElementId, class: &str);

    fn remove_class(&self, element: ElementId, class: &str);

    /// Scrollable ancestors of the element, nearest first.
    fn scroll_parents(&self, element: ElementId) -> Vec<ElementId>;

    /// Follow a link, optionally in a named browsing context.
    fn navigate(&self, href: &str, target: Option<&str>);

    /// Whether a gesture recognizer is available for drag support.
    fn supports_gestures(&self) -> bool;
}

/// Current translate of an element.
pub fn translate(host: &dyn Host, element: ElementId) -> Vec2 {
    Vec2::new(
        host.style(element, StyleProperty::TranslateX),
        host.style(element, StyleProperty::TranslateY),
    )
}

pub fn set_translate(host: &dyn Host, element: ElementId, position: Vec2) {
    host.set_style(element, StyleProperty::TranslateX, position.x);
    host.set_style(element, StyleProperty::TranslateY, position.y);
}

pub fn set_styles(host: &dyn Host, element: ElementId, styles: &StyleMap) {
    for (property, value) in styles {
        host.set_style(element, *property, *value);
    }
}

/// Read the current values of every property present in `template`.
pub fn current_styles(host: &dyn Host, element: ElementId, template: &StyleMap) -> StyleMap {
    template
        .keys()
        .map(|property| (*property, host.style(element, *property)))
        .collect()
}

/// Offset of `to`'s positioning origin relative to `from`'s.
pub fn offset_diff(host: &dyn Host, from: ElementId, to: ElementId) -> Vec2 {
    if from == to {
        return Vec2::ZERO;
    }
    host.offset(to) - host.offset(from)
}
