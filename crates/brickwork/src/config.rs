//! Per-grid configuration.

use crate::animation::Easing;
use crate::drag::{DefaultSortPredicate, DefaultStartPredicate, DragSortPredicate, DragStartPredicate};
use crate::grid::{GridId, GridSystem};
use crate::item::ItemId;
use crate::layout::{LayoutSource, LayoutStrategy};
use crate::sort::{SortDataExtractor, SortValue};
use brickwork_core::host::{ElementId, Host, StyleMap, StyleProperty, style_map};
use brickwork_layout::PackerSettings;
use indexmap::IndexMap;
use std::sync::Arc;

/// Default show/hide/layout/release duration (seconds).
pub const DEFAULT_DURATION: f32 = 0.3;
/// Default `layout_on_resize` debounce (seconds).
pub const DEFAULT_RESIZE_DELAY: f32 = 0.1;
/// Default interval between drag sort checks (seconds).
pub const DEFAULT_SORT_INTERVAL: f32 = 0.1;

/// Which container children become items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemSource {
    /// Every child of the container.
    #[default]
    Children,
    /// Children matching a selector.
    Selector(String),
    /// Explicit elements; ones outside the container are appended to it.
    Elements(Vec<ElementId>),
}

/// Axis a dragged item may move along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragAxis {
    #[default]
    Both,
    X,
    Y,
}

pub type DragSortCandidates = Arc<dyn Fn(&GridSystem, ItemId) -> Vec<GridId>>;

/// Which grids a dragged item may sort into.
#[derive(Clone, Default)]
pub enum DragSort {
    Disabled,
    /// Only the grid the drag started in.
    #[default]
    Own,
    /// Grids returned by the closure, checked in order.
    Candidates(DragSortCandidates),
}

/// Class names applied to containers and items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    pub container: String,
    pub item: String,
    pub shown: String,
    pub hidden: String,
    pub positioning: String,
    pub dragging: String,
    pub releasing: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::with_prefix("brickwork")
    }
}

impl ClassNames {
    /// `prefix`, `prefix-item`, `prefix-item-shown` and so on.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            container: prefix.to_string(),
            item: format!("{prefix}-item"),
            shown: format!("{prefix}-item-shown"),
            hidden: format!("{prefix}-item-hidden"),
            positioning: format!("{prefix}-item-positioning"),
            dragging: format!("{prefix}-item-dragging"),
            releasing: format!("{prefix}-item-releasing"),
        }
    }
}

/// Settings shared by a grid and its items for the grid's lifetime.
#[derive(Clone)]
pub struct GridSettings {
    pub show_duration: f32,
    pub show_easing: Easing,
    pub hide_duration: f32,
    pub hide_easing: Easing,
    pub visible_styles: StyleMap,
    pub hidden_styles: StyleMap,

    pub layout_duration: f32,
    pub layout_easing: Easing,
    /// Debounce for `handle_resize`; `None` ignores resizes.
    pub layout_on_resize: Option<f32>,
    pub layout_on_init: bool,

    pub sort_data: IndexMap<String, SortDataExtractor>,

    pub drag_enabled: bool,
    /// Element dragged items are reparented into; the grid element when `None`.
    pub drag_container: Option<ElementId>,
    pub drag_start_predicate: Arc<dyn DragStartPredicate>,
    pub drag_axis: DragAxis,
    pub drag_sort: DragSort,
    pub drag_sort_interval: f32,
    pub drag_sort_predicate: Arc<dyn DragSortPredicate>,
    pub drag_release_duration: f32,
    pub drag_release_easing: Easing,

    pub classes: ClassNames,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            show_duration: DEFAULT_DURATION,
            show_easing: Easing::Ease,
            hide_duration: DEFAULT_DURATION,
            hide_easing: Easing::Ease,
            visible_styles: style_map([(StyleProperty::Opacity, 1.0), (StyleProperty::Scale, 1.0)]),
            hidden_styles: style_map([(StyleProperty::Opacity, 0.0), (StyleProperty::Scale, 0.5)]),
            layout_duration: DEFAULT_DURATION,
            layout_easing: Easing::Ease,
            layout_on_resize: Some(DEFAULT_RESIZE_DELAY),
            layout_on_init: true,
            sort_data: IndexMap::new(),
            drag_enabled: false,
            drag_container: None,
            drag_start_predicate: Arc::new(DefaultStartPredicate::default()),
            drag_axis: DragAxis::Both,
            drag_sort: DragSort::Own,
            drag_sort_interval: DEFAULT_SORT_INTERVAL,
            drag_sort_predicate: Arc::new(DefaultSortPredicate::default()),
            drag_release_duration: DEFAULT_DURATION,
            drag_release_easing: Easing::Ease,
            classes: ClassNames::default(),
        }
    }
}

impl GridSettings {
    /// Target child styles for the given visibility.
    pub fn visibility_styles(&self, visible: bool) -> &StyleMap {
        if visible {
            &self.visible_styles
        } else {
            &self.hidden_styles
        }
    }
}

/// Builder for a grid.
///
/// # Example
///
/// ```
/// use brickwork::{Easing, GridConfig};
/// use brickwork_layout::PackerSettings;
///
/// let config = GridConfig::new()
///     .items_selector(".card")
///     .packer(PackerSettings::default().fill_gaps(true))
///     .layout_duration(0.4, Easing::EaseOut)
///     .drag_enabled(true);
/// assert!(config.settings().drag_enabled);
/// ```
#[derive(Default)]
pub struct GridConfig {
    pub(crate) items: ItemSource,
    pub(crate) layout: LayoutSource,
    pub(crate) settings: GridSettings,
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn items(mut self, elements: Vec<ElementId>) -> Self {
        self.items = ItemSource::Elements(elements);
        self
    }

    pub fn items_selector(mut self, selector: impl Into<String>) -> Self {
        self.items = ItemSource::Selector(selector.into());
        self
    }

    pub fn show(mut self, duration: f32, easing: Easing) -> Self {
        self.settings.show_duration = duration.max(0.0);
        self.settings.show_easing = easing;
        self
    }

    pub fn hide(mut self, duration: f32, easing: Easing) -> Self {
        self.settings.hide_duration = duration.max(0.0);
        self.settings.hide_easing = easing;
        self
    }

    pub fn visible_styles(mut self, styles: StyleMap) -> Self {
        self.settings.visible_styles = styles;
        self
    }

    pub fn hidden_styles(mut self, styles: StyleMap) -> Self {
        self.settings.hidden_styles = styles;
        self
    }

    pub fn packer(mut self, settings: PackerSettings) -> Self {
        self.layout = LayoutSource::Packer(settings);
        self
    }

    pub fn layout(mut self, strategy: impl LayoutStrategy + 'static) -> Self {
        self.layout = LayoutSource::Custom(Box::new(strategy));
        self
    }

    pub fn layout_duration(mut self, duration: f32, easing: Easing) -> Self {
        self.settings.layout_duration = duration.max(0.0);
        self.settings.layout_easing = easing;
        self
    }

    pub fn layout_on_resize(mut self, delay: Option<f32>) -> Self {
        self.settings.layout_on_resize = delay.map(|d| d.max(0.0));
        self
    }

    pub fn layout_on_init(mut self, layout_on_init: bool) -> Self {
        self.settings.layout_on_init = layout_on_init;
        self
    }

    /// Register a sort field read from each item element.
    pub fn sort_data(
        mut self,
        field: impl Into<String>,
        extractor: impl Fn(&dyn Host, ElementId) -> SortValue + 'static,
    ) -> Self {
        self.settings
            .sort_data
            .insert(field.into(), Arc::new(extractor));
        self
    }

    pub fn drag_enabled(mut self, enabled: bool) -> Self {
        self.settings.drag_enabled = enabled;
        self
    }

    pub fn drag_container(mut self, container: ElementId) -> Self {
        self.settings.drag_container = Some(container);
        self
    }

    pub fn drag_start_predicate(mut self, predicate: impl DragStartPredicate + 'static) -> Self {
        self.settings.drag_start_predicate = Arc::new(predicate);
        self
    }

    pub fn drag_axis(mut self, axis: DragAxis) -> Self {
        self.settings.drag_axis = axis;
        self
    }

    pub fn drag_sort(mut self, sort: DragSort) -> Self {
        self.settings.drag_sort = sort;
        self
    }

    pub fn drag_sort_interval(mut self, interval: f32) -> Self {
        self.settings.drag_sort_interval = interval.max(0.0);
        self
    }

    pub fn drag_sort_predicate(mut self, predicate: impl DragSortPredicate + 'static) -> Self {
        self.settings.drag_sort_predicate = Arc::new(predicate);
        self
    }

    pub fn drag_release(mut self, duration: f32, easing: Easing) -> Self {
        self.settings.drag_release_duration = duration.max(0.0);
        self.settings.drag_release_easing = easing;
        self
    }

    pub fn classes(mut self, classes: ClassNames) -> Self {
        self.settings.classes = classes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GridSettings::default();
        assert_eq!(settings.show_duration, 0.3);
        assert_eq!(settings.layout_on_resize, Some(0.1));
        assert_eq!(settings.drag_sort_interval, 0.1);
        assert!(settings.layout_on_init);
        assert!(!settings.drag_enabled);
        assert_eq!(settings.hidden_styles[&StyleProperty::Scale], 0.5);
        assert_eq!(settings.classes.item, "brickwork-item");
        assert_eq!(settings.classes.releasing, "brickwork-item-releasing");
    }

    #[test]
    fn test_builder_clamps_durations() {
        let config = GridConfig::new()
            .show(-1.0, Easing::Linear)
            .drag_sort_interval(-0.5);
        assert_eq!(config.settings().show_duration, 0.0);
        assert_eq!(config.settings().drag_sort_interval, 0.0);
    }
}
