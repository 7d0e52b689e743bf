//! Mock implementation of Host for testing.
//!
//! This module provides an in-memory element tree that behaves enough like a
//! document for the grid engine: elements have sizes, margins, borders and
//! translates, containers can be placed at fixed client positions and made
//! scrollable, and every mutation is recorded.

use crate::calls::HostCall;
use brickwork_core::geometry::{Margins, Rect, Size};
use brickwork_core::host::{ElementId, Host, StyleProperty};
use brickwork_core::math::Vec2;
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct MockElement {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    size: Size<f32>,
    margins: Margins,
    borders: Margins,
    border_box: bool,
    /// Fixed client position of the border box. Elements without one are
    /// placed by their parent's offset plus translate and margins.
    position: Option<Vec2>,
    displayed: bool,
    styles: IndexMap<StyleProperty, f32>,
    classes: IndexSet<String>,
    attributes: IndexMap<String, String>,
    scrollable: bool,
    scroll: Vec2,
}

impl MockElement {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            parent: None,
            children: Vec::new(),
            size: Size::new(0.0, 0.0),
            margins: Margins::ZERO,
            borders: Margins::ZERO,
            border_box: false,
            position: None,
            displayed: true,
            styles: IndexMap::new(),
            classes: IndexSet::new(),
            attributes: IndexMap::new(),
            scrollable: false,
            scroll: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Default)]
struct MockDocument {
    elements: IndexMap<ElementId, MockElement>,
    next_id: u64,
    body: Option<ElementId>,
}

impl MockDocument {
    fn create(&mut self, tag: &str) -> ElementId {
        self.next_id += 1;
        let id = ElementId::from_raw(self.next_id);
        self.elements.insert(id, MockElement::new(tag));
        id
    }

    fn detach(&mut self, child: ElementId) {
        let parent = self.elements.get(&child).and_then(|el| el.parent);
        if let Some(parent) = parent
            && let Some(parent_el) = self.elements.get_mut(&parent)
        {
            parent_el.children.retain(|c| *c != child);
        }
        if let Some(el) = self.elements.get_mut(&child) {
            el.parent = None;
        }
    }

    fn append(&mut self, parent: ElementId, child: ElementId) {
        if !self.elements.contains_key(&parent) || !self.elements.contains_key(&child) {
            return;
        }
        self.detach(child);
        if let Some(parent_el) = self.elements.get_mut(&parent) {
            parent_el.children.push(child);
        }
        if let Some(el) = self.elements.get_mut(&child) {
            el.parent = Some(parent);
        }
    }

    fn is_attached(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if Some(id) == self.body {
                return true;
            }
            current = self.elements.get(&id).and_then(|el| el.parent);
        }
        false
    }

    fn size(&self, element: ElementId) -> Size<f32> {
        self.elements.get(&element).map_or(Size::new(0.0, 0.0), |el| {
            Size::new(
                el.styles
                    .get(&StyleProperty::Width)
                    .map_or(el.size.width, |w| {
                        if el.border_box { *w } else { *w + el.borders.horizontal() }
                    }),
                el.styles
                    .get(&StyleProperty::Height)
                    .map_or(el.size.height, |h| {
                        if el.border_box { *h } else { *h + el.borders.vertical() }
                    }),
            )
        })
    }

    fn bounding_rect(&self, element: ElementId) -> Rect<f32> {
        let Some(el) = self.elements.get(&element) else {
            return Rect::ZERO;
        };
        let size = self.size(element);
        if let Some(position) = el.position {
            let scroll = el.parent.map_or(Vec2::ZERO, |p| self.scroll_of(p));
            return Rect::new(position.x - scroll.x, position.y - scroll.y, size.width, size.height);
        }
        let origin = el.parent.map_or(Vec2::ZERO, |p| self.offset(p));
        let translate = Vec2::new(
            el.styles.get(&StyleProperty::TranslateX).copied().unwrap_or(0.0),
            el.styles.get(&StyleProperty::TranslateY).copied().unwrap_or(0.0),
        );
        Rect::new(
            origin.x + translate.x + el.margins.left,
            origin.y + translate.y + el.margins.top,
            size.width,
            size.height,
        )
    }

    /// Accumulated scroll of the element and its ancestors.
    fn scroll_of(&self, element: ElementId) -> Vec2 {
        let mut total = Vec2::ZERO;
        let mut current = Some(element);
        while let Some(id) = current {
            if let Some(el) = self.elements.get(&id) {
                total += el.scroll;
                current = el.parent;
            } else {
                break;
            }
        }
        total
    }

    fn offset(&self, element: ElementId) -> Vec2 {
        let rect = self.bounding_rect(element);
        let Some(el) = self.elements.get(&element) else {
            return Vec2::ZERO;
        };
        Vec2::new(rect.x + el.borders.left, rect.y + el.borders.top) - el.scroll
    }

    fn matches(&self, element: ElementId, selector: &str) -> bool {
        let Some(el) = self.elements.get(&element) else {
            return false;
        };
        if let Some(class) = selector.strip_prefix('.') {
            el.classes.contains(class)
        } else if let Some(id) = selector.strip_prefix('#') {
            el.attributes.get("id").is_some_and(|v| v == id)
        } else if let Some(attr) = selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            el.attributes.contains_key(attr)
        } else {
            el.tag.eq_ignore_ascii_case(selector)
        }
    }
}

/// Mock implementation of Host for testing.
///
/// # Borrow Checking Pattern: Interior Mutability
///
/// Host methods take `&self` but need to mutate the element tree. Solution:
/// a `parking_lot::Mutex` around the document and another around the call
/// log. Internal helpers work on the locked document so no method locks
/// twice.
pub struct MockHost {
    document: Mutex<MockDocument>,
    calls: Mutex<Vec<HostCall>>,
    gestures: Mutex<bool>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create a mock document with an attached 1000x1000 body at the origin.
    pub fn new() -> Self {
        let mut document = MockDocument::default();
        let body = document.create("body");
        if let Some(el) = document.elements.get_mut(&body) {
            el.position = Some(Vec2::ZERO);
            el.size = Size::new(1000.0, 1000.0);
        }
        document.body = Some(body);
        Self {
            document: Mutex::new(document),
            calls: Mutex::new(Vec::new()),
            gestures: Mutex::new(true),
        }
    }

    pub fn body(&self) -> ElementId {
        self.document
            .lock()
            .body
            .unwrap_or(ElementId::from_raw(1))
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        self.document.lock().create(tag)
    }

    /// Create a container at a fixed client position inside `parent`.
    pub fn create_container(&self, parent: ElementId, rect: Rect<f32>) -> ElementId {
        let mut doc = self.document.lock();
        let id = doc.create("div");
        if let Some(el) = doc.elements.get_mut(&id) {
            el.position = Some(Vec2::new(rect.x, rect.y));
            el.size = rect.size();
        }
        doc.append(parent, id);
        id
    }

    /// Create an item element with a content child inside `parent`.
    pub fn create_item(&self, parent: ElementId, size: Size<f32>) -> ElementId {
        let mut doc = self.document.lock();
        let id = doc.create("div");
        let child = doc.create("div");
        if let Some(el) = doc.elements.get_mut(&id) {
            el.size = size;
        }
        if let Some(el) = doc.elements.get_mut(&child) {
            el.size = size;
        }
        doc.append(id, child);
        doc.append(parent, id);
        id
    }

    /// Create an element as the last child of `parent`.
    pub fn create_child(&self, parent: ElementId, tag: &str) -> ElementId {
        let mut doc = self.document.lock();
        let id = doc.create(tag);
        doc.append(parent, id);
        id
    }

    fn with_element(&self, element: ElementId, f: impl FnOnce(&mut MockElement)) {
        if let Some(el) = self.document.lock().elements.get_mut(&element) {
            f(el);
        }
    }

    pub fn set_size(&self, element: ElementId, size: Size<f32>) {
        self.with_element(element, |el| el.size = size);
    }

    pub fn set_margins(&self, element: ElementId, margins: Margins) {
        self.with_element(element, |el| el.margins = margins);
    }

    pub fn set_borders(&self, element: ElementId, borders: Margins) {
        self.with_element(element, |el| el.borders = borders);
    }

    pub fn set_border_box(&self, element: ElementId, border_box: bool) {
        self.with_element(element, |el| el.border_box = border_box);
    }

    pub fn set_position(&self, element: ElementId, position: Vec2) {
        self.with_element(element, |el| el.position = Some(position));
    }

    pub fn set_scrollable(&self, element: ElementId, scrollable: bool) {
        self.with_element(element, |el| el.scrollable = scrollable);
    }

    pub fn scroll_by(&self, element: ElementId, delta: Vec2) {
        self.with_element(element, |el| el.scroll += delta);
    }

    pub fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        self.with_element(element, |el| {
            el.attributes.insert(name.to_string(), value.to_string());
        });
    }

    pub fn set_gestures_supported(&self, supported: bool) {
        *self.gestures.lock() = supported;
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.document
            .lock()
            .elements
            .get(&element)
            .is_some_and(|el| el.classes.contains(class))
    }

    pub fn classes(&self, element: ElementId) -> Vec<String> {
        self.document
            .lock()
            .elements
            .get(&element)
            .map(|el| el.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Inline style value, `None` when unset.
    pub fn inline_style(&self, element: ElementId, property: StyleProperty) -> Option<f32> {
        self.document
            .lock()
            .elements
            .get(&element)
            .and_then(|el| el.styles.get(&property).copied())
    }

    pub fn first_child(&self, element: ElementId) -> Option<ElementId> {
        self.document
            .lock()
            .elements
            .get(&element)
            .and_then(|el| el.children.first().copied())
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn count_calls(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn navigations(&self) -> Vec<(String, Option<String>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Navigate { href, target } => Some((href.clone(), target.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl Host for MockHost {
    fn is_attached(&self, element: ElementId) -> bool {
        self.document.lock().is_attached(element)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.document
            .lock()
            .elements
            .get(&element)
            .and_then(|el| el.parent)
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.document
            .lock()
            .elements
            .get(&element)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        self.document.lock().append(parent, child);
        self.record(HostCall::AppendChild { parent, child });
    }

    fn remove_element(&self, element: ElementId) {
        self.document.lock().detach(element);
        self.record(HostCall::RemoveElement { element });
    }

    fn matches(&self, element: ElementId, selector: &str) -> bool {
        self.document.lock().matches(element, selector)
    }

    fn tag_name(&self, element: ElementId) -> String {
        self.document
            .lock()
            .elements
            .get(&element)
            .map(|el| el.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.document
            .lock()
            .elements
            .get(&element)
            .and_then(|el| el.attributes.get(name).cloned())
    }

    fn size(&self, element: ElementId) -> Size<f32> {
        self.document.lock().size(element)
    }

    fn margins(&self, element: ElementId) -> Margins {
        self.document
            .lock()
            .elements
            .get(&element)
            .map_or(Margins::ZERO, |el| el.margins)
    }

    fn borders(&self, element: ElementId) -> Margins {
        self.document
            .lock()
            .elements
            .get(&element)
            .map_or(Margins::ZERO, |el| el.borders)
    }

    fn is_border_box(&self, element: ElementId) -> bool {
        self.document
            .lock()
            .elements
            .get(&element)
            .is_some_and(|el| el.border_box)
    }

    fn bounding_rect(&self, element: ElementId) -> Rect<f32> {
        self.document.lock().bounding_rect(element)
    }

    fn offset(&self, element: ElementId) -> Vec2 {
        self.document.lock().offset(element)
    }

    fn is_displayed(&self, element: ElementId) -> bool {
        self.document
            .lock()
            .elements
            .get(&element)
            .is_some_and(|el| el.displayed)
    }

    fn set_displayed(&self, element: ElementId, displayed: bool) {
        self.with_element(element, |el| el.displayed = displayed);
        self.record(HostCall::SetDisplayed { element, displayed });
    }

    fn style(&self, element: ElementId, property: StyleProperty) -> f32 {
        self.inline_style(element, property)
            .unwrap_or_else(|| property.initial_value())
    }

    fn set_style(&self, element: ElementId, property: StyleProperty, value: f32) {
        self.with_element(element, |el| {
            el.styles.insert(property, value);
        });
        self.record(HostCall::SetStyle {
            element,
            property,
            value,
        });
    }

    fn remove_style(&self, element: ElementId, property: StyleProperty) {
        self.with_element(element, |el| {
            el.styles.shift_remove(&property);
        });
        self.record(HostCall::RemoveStyle { element, property });
    }

    fn clear_styles(&self, element: ElementId) {
        self.with_element(element, |el| el.styles.clear());
        self.record(HostCall::ClearStyles { element });
    }

    fn add_class(&self, element: ElementId, class: &str) {
        self.with_element(element, |el| {
            el.classes.insert(class.to_string());
        });
        self.record(HostCall::AddClass {
            element,
            class: class.to_string(),
        });
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        self.with_element(element, |el| {
            el.classes.shift_remove(class);
        });
        self.record(HostCall::RemoveClass {
            element,
            class: class.to_string(),
        });
    }

    fn scroll_parents(&self, element: ElementId) -> Vec<ElementId> {
        let doc = self.document.lock();
        let mut parents = Vec::new();
        let mut current = doc.elements.get(&element).and_then(|el| el.parent);
        while let Some(id) = current {
            let Some(el) = doc.elements.get(&id) else {
                break;
            };
            if el.scrollable {
                parents.push(id);
            }
            current = el.parent;
        }
        parents
    }

    fn navigate(&self, href: &str, target: Option<&str>) {
        self.record(HostCall::Navigate {
            href: href.to_string(),
            target: target.map(str::to_string),
        });
    }

    fn supports_gestures(&self) -> bool {
        *self.gestures.lock()
    }
}
