//! Policies deciding when a gesture becomes a drag and where a dragged item
//! sorts to.

use super::gesture::GestureEvent;
use crate::config::DragSort;
use crate::events::SortAction;
use crate::grid::{GridId, GridSystem};
use crate::item::ItemId;
use brickwork_core::geometry::Rect;
use brickwork_core::host::{ElementId, Host};
use brickwork_core::math::Vec2;

/// Lowest and highest accepted sort thresholds (percent).
const MIN_THRESHOLD: f32 = 1.0;
const MAX_THRESHOLD: f32 = 100.0;

/// Taps shorter than this follow anchor links (seconds).
const TAP_DURATION: f32 = 0.2;
/// Taps moving less than this on each axis follow anchor links (pixels).
const TAP_SLOP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDecision {
    /// Ask again with the next event (or frame).
    Pending,
    Start,
    /// Ignore the rest of this gesture.
    Reject,
}

/// Scratch state a start predicate keeps for one gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartState {
    pub handle: Option<ElementId>,
    pub handle_rect: Option<Rect<f32>>,
}

pub struct StartContext<'a> {
    pub host: &'a dyn Host,
    pub item: ItemId,
    pub element: ElementId,
    pub event: &'a GestureEvent,
    /// Seconds since the first event of the gesture.
    pub elapsed: f32,
}

/// Decides whether a gesture starts dragging an item.
pub trait DragStartPredicate {
    fn check(&self, ctx: &StartContext<'_>, state: &mut StartState) -> StartDecision;

    /// Called with the final event of every gesture, resolved or not.
    fn finish(&self, _ctx: &StartContext<'_>, _state: &mut StartState) {}
}

impl<F> DragStartPredicate for F
where
    F: Fn(&StartContext<'_>) -> StartDecision,
{
    fn check(&self, ctx: &StartContext<'_>, _state: &mut StartState) -> StartDecision {
        self(ctx)
    }
}

/// Starts once the pointer moved `distance` pixels, `delay` seconds passed
/// and the pointer is inside the handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultStartPredicate {
    pub distance: f32,
    pub delay: f32,
    /// Selector for the handle element; the whole item when `None`.
    pub handle: Option<String>,
}

impl DefaultStartPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance.max(0.0);
        self
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn handle(mut self, selector: impl Into<String>) -> Self {
        self.handle = Some(selector.into());
        self
    }

    /// Nearest ancestor of the event target, up to the item element, that
    /// matches the handle selector.
    fn find_handle(&self, ctx: &StartContext<'_>) -> Option<ElementId> {
        let Some(selector) = self.handle.as_deref() else {
            return Some(ctx.element);
        };
        let mut current = Some(ctx.event.target);
        while let Some(element) = current {
            if ctx.host.matches(element, selector) {
                return Some(element);
            }
            if element == ctx.element {
                break;
            }
            current = ctx.host.parent(element);
        }
        None
    }
}

impl DragStartPredicate for DefaultStartPredicate {
    fn check(&self, ctx: &StartContext<'_>, state: &mut StartState) -> StartDecision {
        let handle = match state.handle {
            Some(handle) => handle,
            None => match self.find_handle(ctx) {
                Some(handle) => {
                    state.handle = Some(handle);
                    handle
                }
                None => return StartDecision::Reject,
            },
        };

        if ctx.event.distance < self.distance || ctx.elapsed < self.delay {
            return StartDecision::Pending;
        }

        let rect = *state
            .handle_rect
            .get_or_insert_with(|| ctx.host.bounding_rect(handle));
        if contains(&rect, ctx.event.pointer) {
            StartDecision::Start
        } else {
            StartDecision::Reject
        }
    }

    fn finish(&self, ctx: &StartContext<'_>, _state: &mut StartState) {
        let event = ctx.event;
        let is_tap = event.delta.x.abs() < TAP_SLOP
            && event.delta.y.abs() < TAP_SLOP
            && event.elapsed < TAP_DURATION;
        if is_tap {
            follow_anchor(ctx.host, ctx.element);
        }
    }
}

fn contains(rect: &Rect<f32>, point: Vec2) -> bool {
    point.x >= rect.x && point.x < rect.right() && point.y >= rect.y && point.y < rect.bottom()
}

fn follow_anchor(host: &dyn Host, element: ElementId) {
    if !host.tag_name(element).eq_ignore_ascii_case("a") {
        return;
    }
    let Some(href) = host.attribute(element, "href").filter(|href| !href.is_empty()) else {
        return;
    };
    let target = host
        .attribute(element, "target")
        .filter(|target| !target.is_empty() && target != "_self");
    tracing::debug!("Following anchor {} from tap", href);
    host.navigate(&href, target.as_deref());
}

/// Where a dragged item should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDecision {
    pub grid: GridId,
    /// Target index; negative values count from the end.
    pub index: isize,
    pub action: SortAction,
}

pub struct SortContext<'a> {
    pub system: &'a GridSystem,
    pub item: ItemId,
    pub event: Option<&'a GestureEvent>,
}

/// Decides whether and where a dragged item reorders.
pub trait DragSortPredicate {
    fn check(&self, ctx: &SortContext<'_>) -> Option<SortDecision>;
}

impl<F> DragSortPredicate for F
where
    F: Fn(&SortContext<'_>) -> Option<SortDecision>,
{
    fn check(&self, ctx: &SortContext<'_>) -> Option<SortDecision> {
        self(ctx)
    }
}

/// Overlap of two rectangles as a percentage of the largest area they could
/// share. Zero when they do not overlap.
pub fn overlap_score(a: &Rect<f32>, b: &Rect<f32>) -> f32 {
    let Some(overlap) = a.intersection(b) else {
        return 0.0;
    };
    let max_width = a.width.min(b.width);
    let max_height = a.height.min(b.height);
    if max_width <= 0.0 || max_height <= 0.0 {
        return 0.0;
    }
    (overlap.width * overlap.height) / (max_width * max_height) * 100.0
}

/// Sorts by overlap score against `threshold` percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultSortPredicate {
    pub threshold: f32,
    /// Action for reorders inside one grid.
    pub action: SortAction,
    /// Action for moves into another grid.
    pub migrate_action: SortAction,
}

impl Default for DefaultSortPredicate {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            action: SortAction::Move,
            migrate_action: SortAction::Move,
        }
    }
}

impl DefaultSortPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn action(mut self, action: SortAction) -> Self {
        self.action = action;
        self
    }

    pub fn migrate_action(mut self, action: SortAction) -> Self {
        self.migrate_action = action;
        self
    }

    /// Candidate grid with the best score strictly above `threshold`.
    fn target_grid(
        &self,
        system: &GridSystem,
        item: ItemId,
        root: GridId,
        item_rect: &Rect<f32>,
        threshold: f32,
    ) -> Option<GridId> {
        let settings = system.grid(root)?.settings().clone();
        let candidates = match &settings.drag_sort {
            DragSort::Disabled => return None,
            DragSort::Own => vec![root],
            DragSort::Candidates(select) => select(system, item),
        };

        let mut best: Option<(GridId, f32)> = None;
        for grid_id in candidates {
            let Some(grid) = system.grid(grid_id) else {
                continue;
            };
            let rect = system.host().bounding_rect(grid.element());
            if rect.width <= 0.0 || rect.height <= 0.0 {
                continue;
            }
            let score = overlap_score(item_rect, &rect);
            if score > threshold && best.is_none_or(|(_, best)| score > best) {
                best = Some((grid_id, score));
            }
        }
        best.map(|(grid, _)| grid)
    }
}

impl DragSortPredicate for DefaultSortPredicate {
    fn check(&self, ctx: &SortContext<'_>) -> Option<SortDecision> {
        let system = ctx.system;
        let item = system.item(ctx.item)?;
        let drag = item.drag()?;
        let root = drag.origin_grid();
        let threshold = self.threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
        let size = item.size();
        let margins = item.margins();

        let client = drag.client_position();
        let item_rect = Rect::new(client.x, client.y, size.width, size.height);
        let grid_id = self.target_grid(system, ctx.item, root, &item_rect, threshold)?;
        let grid = system.grid(grid_id)?;
        let is_migration = item.grid() != grid_id;

        // Same-grid checks run in grid space, others in client space.
        let (item_rect, offset) = if !is_migration && grid_id == root {
            let pos = drag.grid_position();
            (
                Rect::new(pos.x + margins.left, pos.y + margins.top, size.width, size.height),
                Vec2::ZERO,
            )
        } else {
            let host = system.host();
            let rect = host.bounding_rect(grid.element());
            let borders = host.borders(grid.element());
            (item_rect, Vec2::new(rect.x + borders.left, rect.y + borders.top))
        };

        let mut match_index: isize = -1;
        let mut match_score = 0.0f32;
        let mut has_valid_targets = false;
        for (index, target_id) in grid.items().iter().enumerate() {
            if *target_id == ctx.item {
                continue;
            }
            let Some(target) = system.item(*target_id) else {
                continue;
            };
            if !target.is_active() {
                continue;
            }
            has_valid_targets = true;
            let position = target.position();
            let target_margins = target.margins();
            let target_size = target.size();
            let target_rect = Rect::new(
                position.x + target_margins.left + offset.x,
                position.y + target_margins.top + offset.y,
                target_size.width,
                target_size.height,
            );
            let score = overlap_score(&item_rect, &target_rect);
            if score > match_score {
                match_index = index as isize;
                match_score = score;
            }
        }

        if is_migration && match_score < threshold {
            match_index = if has_valid_targets { -1 } else { 0 };
            match_score = threshold;
        }

        if match_score >= threshold {
            Some(SortDecision {
                grid: grid_id,
                index: match_index,
                action: if is_migration {
                    self.migrate_action
                } else {
                    self.action
                },
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_score() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(overlap_score(&a, &Rect::new(50.0, 0.0, 100.0, 100.0)), 50.0);
        assert_eq!(overlap_score(&a, &Rect::new(100.0, 0.0, 100.0, 100.0)), 0.0);
        // Relative to the smaller rectangle.
        assert_eq!(overlap_score(&a, &Rect::new(10.0, 10.0, 20.0, 20.0)), 100.0);
    }

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(contains(&rect, Vec2::new(0.0, 0.0)));
        assert!(!contains(&rect, Vec2::new(10.0, 5.0)));
    }
}
