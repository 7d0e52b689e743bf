//! Dragging items with synthetic gestures.

use brickwork::prelude::*;
use brickwork::{
    DefaultSortPredicate, DefaultStartPredicate, DragAxis, DragSort, EventKind, Rect, Size, StyleProperty, Vec2,
};
use brickwork_layout::{PackedLayout, Packer, PackerSettings};
use brickwork_test_utils::MockHost;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn drag_config() -> GridConfig {
    GridConfig::new()
        .drag_enabled(true)
        .drag_sort_interval(0.0)
        .layout_duration(0.0, Easing::Linear)
        .drag_release(0.0, Easing::Linear)
}

fn setup(config: GridConfig) -> (Arc<MockHost>, GridSystem, GridId, Vec<ElementId>) {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let container = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let elements = (0..4)
        .map(|_| host.create_item(container, Size::new(100.0, 100.0)))
        .collect();
    let grid = system.create_grid(container, config).unwrap();
    (host, system, grid, elements)
}

fn settle(system: &mut GridSystem) {
    let mut frames = 0;
    while system.frame(0.016) {
        frames += 1;
        assert!(frames < 1000, "grid never settled");
    }
}

fn translate(host: &MockHost, element: ElementId) -> (f32, f32) {
    (
        host.inline_style(element, StyleProperty::TranslateX).unwrap_or(0.0),
        host.inline_style(element, StyleProperty::TranslateY).unwrap_or(0.0),
    )
}

fn record(system: &mut GridSystem, grid: GridId, kinds: &[EventKind]) -> Rc<RefCell<Vec<EventKind>>> {
    let log: Rc<RefCell<Vec<EventKind>>> = Rc::default();
    for kind in kinds {
        let sink = log.clone();
        system.on(grid, *kind, move |event| sink.borrow_mut().push(event.kind()));
    }
    log
}

/// Press on `element` at `pointer`, drag by `delta` and release.
fn drag_by(system: &mut GridSystem, item: ItemId, element: ElementId, pointer: Vec2, delta: Vec2) {
    system.handle_gesture(item, GestureEvent::new(GesturePhase::Start, element).with_pointer(pointer));
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Move, element)
            .with_pointer(pointer + delta)
            .with_delta(delta),
    );
    system.frame(0.016);
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::End, element)
            .with_pointer(pointer + delta)
            .with_delta(delta)
            .with_elapsed(0.5),
    );
}

#[test]
fn test_drag_sorts_at_threshold() {
    let (host, mut system, grid, elements) = setup(drag_config());
    let events = record(
        &mut system,
        grid,
        &[
            EventKind::DragStart,
            EventKind::Move,
            EventKind::DragEnd,
            EventKind::DragReleaseEnd,
        ],
    );
    let item = system.get_item(grid, 0).unwrap();

    drag_by(&mut system, item, elements[0], Vec2::new(10.0, 10.0), Vec2::new(50.0, 0.0));
    settle(&mut system);

    assert_eq!(system.get_item(grid, 1), Some(item));
    assert_eq!(translate(&host, elements[0]), (100.0, 0.0));
    assert_eq!(translate(&host, elements[1]), (0.0, 0.0));
    assert!(!host.has_class(elements[0], "brickwork-item-dragging"));
    assert!(!host.has_class(elements[0], "brickwork-item-releasing"));
    assert_eq!(
        *events.borrow(),
        vec![
            EventKind::DragStart,
            EventKind::Move,
            EventKind::DragEnd,
            EventKind::DragReleaseEnd
        ]
    );
}

#[test]
fn test_drag_below_threshold_keeps_order() {
    let (host, mut system, grid, elements) = setup(drag_config());
    let item = system.get_item(grid, 0).unwrap();

    drag_by(&mut system, item, elements[0], Vec2::new(10.0, 10.0), Vec2::new(49.0, 0.0));
    settle(&mut system);

    assert_eq!(system.get_item(grid, 0), Some(item));
    assert_eq!(translate(&host, elements[0]), (0.0, 0.0));
}

#[test]
fn test_drag_follows_pointer_on_locked_axis() {
    let (host, mut system, grid, elements) =
        setup(drag_config().drag_axis(DragAxis::X).drag_sort(DragSort::Disabled));
    let item = system.get_item(grid, 3).unwrap();
    let start = GestureEvent::new(GesturePhase::Start, elements[3]).with_pointer(Vec2::new(150.0, 150.0));
    system.handle_gesture(item, start);
    assert!(system.item(item).unwrap().is_dragging());
    assert!(host.has_class(elements[3], "brickwork-item-dragging"));

    for step in 1..=3 {
        let delta = Vec2::new(10.0 * step as f32, 5.0 * step as f32);
        system.handle_gesture(
            item,
            GestureEvent::new(GesturePhase::Move, elements[3]).with_delta(delta),
        );
        system.frame(0.016);
    }
    assert_eq!(translate(&host, elements[3]), (130.0, 100.0));
    assert_eq!(system.item(item).unwrap().drag().unwrap().grid_position(), Vec2::new(130.0, 100.0));
}

#[test]
fn test_hide_during_drag_aborts_it() {
    let (host, mut system, grid, elements) = setup(drag_config());
    let ends = record(&mut system, grid, &[EventKind::DragEnd]);
    let item = system.get_item(grid, 0).unwrap();
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Start, elements[0]).with_pointer(Vec2::new(10.0, 10.0)),
    );
    assert!(system.item(item).unwrap().is_dragging());

    system.hide(grid, &[ItemTarget::Item(item)], VisibilityOptions::default().instant(true));
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Move, elements[0]).with_delta(Vec2::new(30.0, 0.0)),
    );
    assert!(!system.item(item).unwrap().is_dragging());
    assert!(!host.has_class(elements[0], "brickwork-item-dragging"));

    system.handle_gesture(item, GestureEvent::new(GesturePhase::End, elements[0]));
    settle(&mut system);
    assert!(ends.borrow().is_empty());
    assert!(!host.is_displayed(elements[0]));
}

#[test]
fn test_tap_follows_anchor() {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let container = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let link = host.create_child(container, "a");
    host.set_size(link, Size::new(100.0, 100.0));
    host.set_attribute(link, "href", "/next");
    host.set_attribute(link, "target", "_blank");
    let grid = system
        .create_grid(
            container,
            drag_config().drag_start_predicate(DefaultStartPredicate::new().distance(5.0)),
        )
        .unwrap();
    let starts = record(&mut system, grid, &[EventKind::DragStart]);
    let item = system.get_item(grid, 0).unwrap();

    let pointer = Vec2::new(20.0, 20.0);
    system.handle_gesture(item, GestureEvent::new(GesturePhase::Start, link).with_pointer(pointer));
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::End, link)
            .with_pointer(pointer)
            .with_elapsed(0.1),
    );

    assert!(starts.borrow().is_empty());
    assert_eq!(host.navigations(), vec![("/next".to_string(), Some("_blank".to_string()))]);
}

#[test]
fn test_handle_must_contain_pointer() {
    let (host, mut system, grid, elements) =
        setup(drag_config().drag_start_predicate(DefaultStartPredicate::new().handle(".grip")));
    let item = system.get_item(grid, 0).unwrap();
    let grip = host.first_child(elements[0]).unwrap();
    host.add_class(grip, "grip");

    // Pressing the item outside the handle never starts.
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Start, elements[0]).with_pointer(Vec2::new(5.0, 5.0)),
    );
    assert!(!system.item(item).unwrap().is_dragging());
    system.handle_gesture(item, GestureEvent::new(GesturePhase::End, elements[0]));

    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Start, grip).with_pointer(Vec2::new(5.0, 5.0)),
    );
    assert!(system.item(item).unwrap().is_dragging());
}

#[test]
fn test_leaving_handle_rejects_gesture() {
    let (host, mut system, grid, elements) = setup(
        drag_config().drag_start_predicate(DefaultStartPredicate::new().distance(20.0).handle(".grip")),
    );
    let item = system.get_item(grid, 0).unwrap();
    let grip = host.first_child(elements[0]).unwrap();
    host.add_class(grip, "grip");

    system.handle_gesture(item, GestureEvent::new(GesturePhase::Start, grip).with_pointer(Vec2::new(5.0, 5.0)));
    // Far enough to start, but the pointer is off the handle.
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Move, grip)
            .with_pointer(Vec2::new(155.0, 5.0))
            .with_delta(Vec2::new(150.0, 0.0)),
    );
    assert!(!system.item(item).unwrap().is_dragging());
    assert!(!system.item(item).unwrap().drag().unwrap().is_pending());

    // Coming back onto the handle during the same press does not start.
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Move, grip)
            .with_pointer(Vec2::new(35.0, 5.0))
            .with_delta(Vec2::new(30.0, 0.0)),
    );
    system.frame(0.016);
    assert!(!system.item(item).unwrap().is_dragging());
    assert_eq!(translate(&host, elements[0]), (0.0, 0.0));
}

#[test]
fn test_start_delay_waits_for_frames() {
    let (_, mut system, grid, elements) =
        setup(drag_config().drag_start_predicate(DefaultStartPredicate::new().delay(0.1)));
    let item = system.get_item(grid, 0).unwrap();
    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Start, elements[0]).with_pointer(Vec2::new(5.0, 5.0)),
    );
    assert!(system.item(item).unwrap().drag().unwrap().is_pending());
    assert!(system.needs_frame());

    for _ in 0..10 {
        system.frame(0.016);
    }
    assert!(system.item(item).unwrap().is_dragging());
}

#[test]
fn test_scroll_keeps_item_under_pointer() {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let scroller = host.create_container(host.body(), Rect::new(0.0, 0.0, 400.0, 400.0));
    host.set_scrollable(scroller, true);
    let container = host.create_container(scroller, Rect::new(0.0, 0.0, 250.0, 500.0));
    let element = host.create_item(container, Size::new(100.0, 100.0));
    let grid = system
        .create_grid(container, drag_config().drag_sort(DragSort::Disabled))
        .unwrap();
    let scrolls = record(&mut system, grid, &[EventKind::DragScroll]);
    let item = system.get_item(grid, 0).unwrap();

    system.handle_gesture(
        item,
        GestureEvent::new(GesturePhase::Start, element).with_pointer(Vec2::new(5.0, 5.0)),
    );
    host.scroll_by(scroller, Vec2::new(0.0, 30.0));
    system.handle_scroll(scroller);
    system.frame(0.016);

    assert_eq!(translate(&host, element), (0.0, 30.0));
    assert_eq!(host.bounding_rect(element).y, 0.0);
    assert_eq!(*scrolls.borrow(), vec![EventKind::DragScroll]);
}

#[test]
fn test_drag_into_another_grid() {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let left = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let right = host.create_container(host.body(), Rect::new(300.0, 0.0, 250.0, 500.0));
    let dragged = host.create_item(left, Size::new(100.0, 100.0));
    let stay = host.create_item(left, Size::new(100.0, 100.0));
    let resident = host.create_item(right, Size::new(100.0, 100.0));
    let config = || {
        drag_config()
            .drag_sort(DragSort::Candidates(Arc::new(|system: &GridSystem, _item: ItemId| system.grids())))
            .drag_sort_predicate(DefaultSortPredicate::new())
    };
    let a = system.create_grid(left, config()).unwrap();
    let b = system.create_grid(right, config()).unwrap();
    let received = record(&mut system, b, &[EventKind::Receive, EventKind::DragReleaseEnd]);
    let item = system.get_item(a, 0).unwrap();

    drag_by(&mut system, item, dragged, Vec2::new(10.0, 10.0), Vec2::new(310.0, 0.0));
    settle(&mut system);

    assert_eq!(system.item(item).unwrap().grid(), b);
    assert_eq!(system.items(b)[0], item);
    assert_eq!(host.parent(dragged), Some(right));
    assert_eq!(translate(&host, dragged), (0.0, 0.0));
    assert_eq!(translate(&host, resident), (100.0, 0.0));
    assert_eq!(translate(&host, stay), (0.0, 0.0));
    assert_eq!(system.items(a).len(), 1);
    assert_eq!(*received.borrow(), vec![EventKind::Receive, EventKind::DragReleaseEnd]);
    // The new grid owns the drag record now.
    assert_eq!(system.item(item).unwrap().drag().unwrap().origin_grid(), b);
}

fn two_grid_config() -> GridConfig {
    drag_config()
        .drag_sort(DragSort::Candidates(Arc::new(|system: &GridSystem, _item: ItemId| system.grids())))
        .drag_sort_predicate(DefaultSortPredicate::new())
}

#[test]
fn test_drop_on_empty_space_appends() {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let left = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let right = host.create_container(host.body(), Rect::new(300.0, 0.0, 250.0, 500.0));
    let dragged = host.create_item(left, Size::new(100.0, 100.0));
    host.create_item(left, Size::new(100.0, 100.0));
    host.create_item(right, Size::new(100.0, 100.0));
    let a = system.create_grid(left, two_grid_config()).unwrap();
    let b = system.create_grid(right, two_grid_config()).unwrap();
    let resident = system.get_item(b, 0).unwrap();
    let item = system.get_item(a, 0).unwrap();

    // Lands right of the resident item without touching it.
    drag_by(&mut system, item, dragged, Vec2::new(10.0, 10.0), Vec2::new(440.0, 0.0));
    settle(&mut system);

    assert_eq!(system.item(item).unwrap().grid(), b);
    assert_eq!(system.items(b), vec![resident, item]);
    assert_eq!(translate(&host, dragged), (100.0, 0.0));
}

#[test]
fn test_drop_into_empty_grid_goes_first() {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let left = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let right = host.create_container(host.body(), Rect::new(300.0, 0.0, 250.0, 500.0));
    let dragged = host.create_item(left, Size::new(100.0, 100.0));
    host.create_item(left, Size::new(100.0, 100.0));
    let a = system.create_grid(left, two_grid_config()).unwrap();
    // Keeps the container's own height so the empty grid stays a drop target.
    let fixed_height = |boxes: &[Size<f32>], container: Size<f32>| PackedLayout {
        set_height: false,
        ..Packer::new().pack(boxes, container, &PackerSettings::default())
    };
    let b = system.create_grid(right, two_grid_config().layout(fixed_height)).unwrap();
    assert!(system.items(b).is_empty());
    let item = system.get_item(a, 0).unwrap();

    drag_by(&mut system, item, dragged, Vec2::new(10.0, 10.0), Vec2::new(310.0, 0.0));
    settle(&mut system);

    assert_eq!(system.item(item).unwrap().grid(), b);
    assert_eq!(system.items(b), vec![item]);
    assert_eq!(host.parent(dragged), Some(right));
    assert_eq!(translate(&host, dragged), (0.0, 0.0));
    assert_eq!(system.items(a).len(), 1);
}
