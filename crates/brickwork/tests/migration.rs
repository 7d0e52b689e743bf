//! Sending items between grids.

use brickwork::prelude::*;
use brickwork::{EventKind, Rect, Size, StyleProperty, TransferInfo};
use brickwork_test_utils::MockHost;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

struct Fixture {
    host: Arc<MockHost>,
    system: GridSystem,
    a: GridId,
    b: GridId,
    a_elements: Vec<ElementId>,
    b_elements: Vec<ElementId>,
}

fn fixture() -> Fixture {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let left = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let right = host.create_container(host.body(), Rect::new(300.0, 0.0, 250.0, 500.0));
    let a_elements = (0..4)
        .map(|_| host.create_item(left, Size::new(100.0, 100.0)))
        .collect();
    let b_elements = vec![host.create_item(right, Size::new(100.0, 100.0))];
    let a = system.create_grid(left, GridConfig::new()).unwrap();
    let b = system
        .create_grid(right, GridConfig::new().classes(brickwork::ClassNames {
            item: "right-item".into(),
            ..Default::default()
        }))
        .unwrap();
    Fixture {
        host,
        system,
        a,
        b,
        a_elements,
        b_elements,
    }
}

fn settle(system: &mut GridSystem) {
    let mut frames = 0;
    while system.frame(0.016) {
        frames += 1;
        assert!(frames < 1000, "grids never settled");
    }
}

fn translate(host: &MockHost, element: ElementId) -> (f32, f32) {
    (
        host.inline_style(element, StyleProperty::TranslateX).unwrap_or(0.0),
        host.inline_style(element, StyleProperty::TranslateY).unwrap_or(0.0),
    )
}

#[test]
fn test_send_and_back() {
    let Fixture {
        host,
        mut system,
        a,
        b,
        a_elements,
        b_elements,
    } = fixture();
    let right = system.grid(b).unwrap().element();
    let left = system.grid(a).unwrap().element();
    let transfers: Rc<RefCell<Vec<TransferInfo>>> = Rc::default();
    let sink = transfers.clone();
    system.on(b, EventKind::Receive, move |event| {
        if let GridEvent::Receive(info) = event {
            sink.borrow_mut().push(*info);
        }
    });
    let settled: Rc<RefCell<Option<bool>>> = Rc::default();
    let flag = settled.clone();

    let sent = system.send(
        a,
        0,
        b,
        0,
        SendOptions::default().on_finish(move |interrupted, _| *flag.borrow_mut() = Some(interrupted)),
    );
    assert!(sent);
    let item = system.get_item(b, 0).unwrap();
    assert_eq!(system.item(item).unwrap().grid(), b);
    assert!(system.item(item).unwrap().is_migrating());
    assert_eq!(host.parent(a_elements[0]), Some(right));
    // The element keeps its on-screen spot until the layout moves it.
    assert_eq!(translate(&host, a_elements[0]), (-300.0, 0.0));
    assert!(host.has_class(a_elements[0], "right-item"));
    assert!(!host.has_class(a_elements[0], "brickwork-item"));
    assert_eq!(transfers.borrow().len(), 1);
    assert_eq!(transfers.borrow()[0].from_index, 0);
    assert_eq!(transfers.borrow()[0].to_index, 0);

    settle(&mut system);
    assert_eq!(*settled.borrow(), Some(false));
    assert!(!system.item(item).unwrap().is_migrating());
    assert_eq!(translate(&host, a_elements[0]), (0.0, 0.0));
    assert_eq!(translate(&host, b_elements[0]), (100.0, 0.0));
    assert_eq!(translate(&host, a_elements[1]), (0.0, 0.0));
    assert_eq!(system.items(a).len(), 3);

    assert!(system.send(b, item, a, -1, SendOptions::default()));
    settle(&mut system);
    assert_eq!(system.items(a).last(), Some(&item));
    assert_eq!(host.parent(a_elements[0]), Some(left));
    assert_eq!(translate(&host, a_elements[0]), (100.0, 100.0));
    assert!(host.has_class(a_elements[0], "brickwork-item"));
}

#[test]
fn test_send_hidden_item_settles_at_once() {
    let Fixture {
        host,
        mut system,
        a,
        b,
        a_elements,
        ..
    } = fixture();
    let right = system.grid(b).unwrap().element();
    system.hide(
        a,
        &[ItemTarget::Index(1)],
        VisibilityOptions::default().instant(true).layout(LayoutTrigger::Instant),
    );
    let settled: Rc<RefCell<Option<bool>>> = Rc::default();
    let flag = settled.clone();

    assert!(system.send(
        a,
        a_elements[1],
        b,
        -1,
        SendOptions::default().on_finish(move |interrupted, _| *flag.borrow_mut() = Some(interrupted)),
    ));
    assert_eq!(*settled.borrow(), Some(false));
    assert_eq!(host.parent(a_elements[1]), Some(right));
    assert!(host.has_class(a_elements[1], "brickwork-item-hidden"));
    assert!(!system.needs_frame());
}

#[test]
fn test_send_rejects_same_grid_and_unknown_items() {
    let Fixture {
        mut system, a, b, ..
    } = fixture();
    assert!(!system.send(a, 0, a, 1, SendOptions::default()));
    assert!(!system.send(a, 9, b, 0, SendOptions::default()));
    system.destroy_grid(b, false);
    assert!(!system.send(a, 0, b, 0, SendOptions::default()));
    assert_eq!(system.items(a).len(), 4);
}

#[test]
fn test_interrupted_migration_reports_abort() {
    let Fixture {
        host,
        mut system,
        a,
        b,
        a_elements,
        ..
    } = fixture();
    let left = system.grid(a).unwrap().element();
    let results: Rc<RefCell<Vec<bool>>> = Rc::default();
    let sink = results.clone();
    system.send(
        a,
        0,
        b,
        0,
        SendOptions::default().on_finish(move |interrupted, _| sink.borrow_mut().push(interrupted)),
    );
    system.frame(0.016);

    // Sent back before the first move settled.
    let item = system.item_for_element(a_elements[0]).unwrap();
    system.send(b, item, a, 0, SendOptions::default());
    assert_eq!(*results.borrow(), vec![true]);
    settle(&mut system);
    assert_eq!(host.parent(a_elements[0]), Some(left));
    assert_eq!(translate(&host, a_elements[0]), (0.0, 0.0));
}

#[test]
fn test_round_trip_restores_layout() {
    let Fixture {
        host,
        mut system,
        a,
        b,
        a_elements,
        b_elements,
    } = fixture();
    let original = system.items(a);

    assert!(system.send(a, 0, b, 0, SendOptions::default()));
    settle(&mut system);
    assert_eq!(translate(&host, b_elements[0]), (100.0, 0.0));

    assert!(system.send(b, 0, a, 0, SendOptions::default()));
    settle(&mut system);

    assert_eq!(system.items(a), original);
    assert_eq!(translate(&host, a_elements[0]), (0.0, 0.0));
    assert_eq!(translate(&host, a_elements[1]), (100.0, 0.0));
    assert_eq!(translate(&host, b_elements[0]), (0.0, 0.0));
}
