//! Layout strategies.

use brickwork_core::geometry::Size;
use brickwork_layout::{PackedLayout, Packer, PackerSettings};

/// Computes item placements for one layout pass.
///
/// `boxes` are the effective item sizes (margins included) in grid order and
/// `container` is the grid's content size. The result must hold exactly one
/// slot per box.
pub trait LayoutStrategy {
    fn compute(&mut self, boxes: &[Size<f32>], container: Size<f32>) -> PackedLayout;
}

impl<F> LayoutStrategy for F
where
    F: FnMut(&[Size<f32>], Size<f32>) -> PackedLayout,
{
    fn compute(&mut self, boxes: &[Size<f32>], container: Size<f32>) -> PackedLayout {
        self(boxes, container)
    }
}

/// The default strategy: the first-fit packer.
#[derive(Debug, Default)]
pub struct PackerLayout {
    settings: PackerSettings,
    packer: Packer,
}

impl PackerLayout {
    pub fn new(settings: PackerSettings) -> Self {
        Self {
            settings,
            packer: Packer::new(),
        }
    }

    pub fn settings(&self) -> &PackerSettings {
        &self.settings
    }
}

impl LayoutStrategy for PackerLayout {
    fn compute(&mut self, boxes: &[Size<f32>], container: Size<f32>) -> PackedLayout {
        self.packer.pack(boxes, container, &self.settings)
    }
}

/// Where a grid's layout comes from.
pub enum LayoutSource {
    Packer(PackerSettings),
    Custom(Box<dyn LayoutStrategy>),
}

impl Default for LayoutSource {
    fn default() -> Self {
        LayoutSource::Packer(PackerSettings::default())
    }
}

impl LayoutSource {
    pub(crate) fn into_strategy(self) -> Box<dyn LayoutStrategy> {
        match self {
            LayoutSource::Packer(settings) => Box::new(PackerLayout::new(settings)),
            LayoutSource::Custom(strategy) => strategy,
        }
    }
}
