//! Sorting and moving keep every item exactly once in the grid order.

use brickwork::prelude::*;
use brickwork::{EventKind, Rect, Size, SortValue, StyleProperty};
use brickwork_test_utils::MockHost;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn setup(count: usize, config: GridConfig) -> (Arc<MockHost>, GridSystem, GridId, Vec<ElementId>) {
    let host = Arc::new(MockHost::new());
    let mut system = GridSystem::new(host.clone());
    let container = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let elements = (0..count)
        .map(|_| host.create_item(container, Size::new(100.0, 100.0)))
        .collect();
    let grid = system.create_grid(container, config).unwrap();
    (host, system, grid, elements)
}

fn element_order(system: &GridSystem, grid: GridId) -> Vec<ElementId> {
    system
        .items(grid)
        .iter()
        .map(|id| system.item(*id).unwrap().element())
        .collect()
}

fn rank_config() -> GridConfig {
    GridConfig::new()
        .sort_data("rank", |host: &dyn Host, element| {
            host.attribute(element, "data-rank")
                .and_then(|rank| rank.parse::<f64>().ok())
                .map_or(SortValue::Number(0.0), SortValue::Number)
        })
        .sort_data("name", |host: &dyn Host, element| {
            SortValue::from(host.attribute(element, "data-name").unwrap_or_default())
        })
}

#[test]
fn test_sort_by_criteria() {
    let host = Arc::new(MockHost::new());
    let container = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let ranks = [("c", "2"), ("a", "1"), ("b", "2")];
    let elements: Vec<_> = ranks
        .iter()
        .map(|(name, rank)| {
            let el = host.create_item(container, Size::new(100.0, 100.0));
            host.set_attribute(el, "data-name", name);
            host.set_attribute(el, "data-rank", rank);
            el
        })
        .collect();
    let mut system = GridSystem::new(host.clone());
    let grid = system.create_grid(container, rank_config()).unwrap();

    system.sort(grid, SortBy::Criteria("rank name".into()), SortOptions::default());
    assert_eq!(element_order(&system, grid), vec![elements[1], elements[2], elements[0]]);

    system.sort(grid, SortBy::Criteria("rank:desc name".into()), SortOptions::default());
    assert_eq!(element_order(&system, grid), vec![elements[2], elements[0], elements[1]]);
}

#[test]
fn test_sort_uses_refreshed_data() {
    let host = Arc::new(MockHost::new());
    let container = host.create_container(host.body(), Rect::new(0.0, 0.0, 250.0, 500.0));
    let elements: Vec<_> = (0..2)
        .map(|rank| {
            let el = host.create_item(container, Size::new(100.0, 100.0));
            host.set_attribute(el, "data-rank", &rank.to_string());
            el
        })
        .collect();
    let mut system = GridSystem::new(host.clone());
    let grid = system.create_grid(container, rank_config()).unwrap();

    host.set_attribute(elements[0], "data-rank", "5");
    system.sort(grid, SortBy::Criteria("rank".into()), SortOptions::default());
    // Stale data still ranks the first element lowest.
    assert_eq!(element_order(&system, grid), elements);

    system.refresh_sort_data(grid, &[]);
    system.sort(grid, SortBy::Criteria("rank".into()), SortOptions::default());
    assert_eq!(element_order(&system, grid), vec![elements[1], elements[0]]);
}

#[test]
fn test_sort_by_reference() {
    let (_, mut system, grid, elements) = setup(4, GridConfig::new());
    let sorted = Rc::new(RefCell::new(0));
    let counter = sorted.clone();
    system.on(grid, EventKind::Sort, move |_| *counter.borrow_mut() += 1);

    system.sort(
        grid,
        SortBy::Reference(vec![ItemTarget::Element(elements[3]), ItemTarget::Element(elements[1])]),
        SortOptions::default(),
    );
    assert_eq!(
        element_order(&system, grid),
        vec![elements[3], elements[1], elements[0], elements[2]]
    );
    assert_eq!(*sorted.borrow(), 1);
}

#[test]
fn test_sort_by_comparator_descending() {
    let (_, mut system, grid, elements) = setup(3, GridConfig::new());
    system.sort(
        grid,
        SortBy::Comparator(Box::new(|a, b| a.element().cmp(&b.element()))),
        SortOptions::default().descending(true).layout(LayoutTrigger::Instant),
    );
    let mut expected = elements.clone();
    expected.reverse();
    assert_eq!(element_order(&system, grid), expected);
}

#[test]
fn test_move_and_swap() {
    let (host, mut system, grid, elements) = setup(4, GridConfig::new());
    let moves: Rc<RefCell<Vec<(usize, usize, SortAction)>>> = Rc::default();
    let sink = moves.clone();
    system.on(grid, EventKind::Move, move |event| {
        if let GridEvent::Move {
            from_index,
            to_index,
            action,
            ..
        } = event
        {
            sink.borrow_mut().push((*from_index, *to_index, *action));
        }
    });

    system.move_item(grid, 0, -1, MoveOptions::default().layout(LayoutTrigger::Instant));
    assert_eq!(
        element_order(&system, grid),
        vec![elements[1], elements[2], elements[3], elements[0]]
    );
    assert_eq!(host.inline_style(elements[0], StyleProperty::TranslateY), Some(100.0));

    system.move_item(
        grid,
        elements[1],
        elements[0],
        MoveOptions::default().action(SortAction::Swap).layout(LayoutTrigger::Instant),
    );
    assert_eq!(
        element_order(&system, grid),
        vec![elements[0], elements[2], elements[3], elements[1]]
    );
    assert_eq!(
        *moves.borrow(),
        vec![(0, 3, SortAction::Move), (0, 3, SortAction::Swap)]
    );

    // Moving onto itself does nothing.
    system.move_item(grid, 2, 2, MoveOptions::default());
    assert_eq!(moves.borrow().len(), 2);
}

#[derive(Debug, Clone)]
enum Op {
    Move(isize, isize, bool),
    Hide(isize),
    Show(isize),
    Reference(Vec<isize>),
    StableSort,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-6isize..6, -6isize..6, any::<bool>()).prop_map(|(a, b, swap)| Op::Move(a, b, swap)),
        (-6isize..6).prop_map(Op::Hide),
        (-6isize..6).prop_map(Op::Show),
        prop::collection::vec(-6isize..6, 0..4).prop_map(Op::Reference),
        Just(Op::StableSort),
    ]
}

proptest! {
    #[test]
    fn prop_order_is_a_permutation(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let (_, mut system, grid, elements) = setup(5, GridConfig::new());
        for op in ops {
            match op {
                Op::Move(from, to, swap) => {
                    let action = if swap { SortAction::Swap } else { SortAction::Move };
                    system.move_item(grid, from, to, MoveOptions::default().action(action));
                }
                Op::Hide(index) => system.hide(grid, &[ItemTarget::Index(index)], VisibilityOptions::default()),
                Op::Show(index) => system.show(grid, &[ItemTarget::Index(index)], VisibilityOptions::default()),
                Op::Reference(indices) => {
                    let targets = indices.into_iter().map(ItemTarget::Index).collect();
                    system.sort(grid, SortBy::Reference(targets), SortOptions::default());
                }
                Op::StableSort => system.sort(
                    grid,
                    SortBy::Comparator(Box::new(|_, _| std::cmp::Ordering::Equal)),
                    SortOptions::default().descending(true),
                ),
            }
            system.frame(0.05);
        }

        let mut order = element_order(&system, grid);
        order.sort();
        let mut expected = elements.clone();
        expected.sort();
        prop_assert_eq!(order, expected);
    }
}
