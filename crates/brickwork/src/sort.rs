//! Sort data and ordering helpers.

use crate::grid::ItemTarget;
use crate::item::{Item, ItemId};
use brickwork_core::host::{ElementId, Host};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::Arc;

/// A value extracted from an item for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    /// Numbers order before text; numbers use a total order.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        SortValue::Number(value)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Number(value as f64)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::Text(value)
    }
}

/// Named sort values of one item.
pub type SortData = IndexMap<String, SortValue>;

/// Reads one sort field from an item element.
pub type SortDataExtractor = Arc<dyn Fn(&dyn Host, ElementId) -> SortValue>;

/// How [`GridSystem::sort`](crate::GridSystem::sort) orders a grid.
pub enum SortBy {
    /// Compare two items directly. Sort data is fresh when this runs.
    Comparator(Box<dyn Fn(&Item, &Item) -> Ordering>),
    /// Space separated `field[:asc|:desc]` criteria over registered sort data.
    Criteria(String),
    /// Listed items first in the given order, the rest after them.
    Reference(Vec<ItemTarget>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    pub field: String,
    /// `None` follows the `descending` option.
    pub direction: Option<SortDirection>,
}

/// Parse `"field:asc other:desc third"`.
pub fn parse_criteria(criteria: &str) -> Vec<SortCriterion> {
    criteria
        .split_whitespace()
        .map(|token| {
            let (field, direction) = match token.split_once(':') {
                Some((field, "desc")) => (field, Some(SortDirection::Descending)),
                Some((field, "asc")) => (field, Some(SortDirection::Ascending)),
                Some((field, _)) => (field, None),
                None => (token, None),
            };
            SortCriterion {
                field: field.to_string(),
                direction,
            }
        })
        .collect()
}

/// Compare two items' sort data criterion by criterion.
///
/// Missing fields compare equal so the next criterion decides.
pub fn compare_sort_data(
    a: &SortData,
    b: &SortData,
    criteria: &[SortCriterion],
    descending: bool,
) -> Ordering {
    for criterion in criteria {
        let (Some(va), Some(vb)) = (a.get(&criterion.field), b.get(&criterion.field)) else {
            continue;
        };
        let desc = match criterion.direction {
            Some(direction) => direction == SortDirection::Descending,
            None => descending,
        };
        let ordering = if desc { vb.compare(va) } else { va.compare(vb) };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable sort of `order`; ties keep their original relative order.
pub fn sorted_order(order: &[ItemId], mut compare: impl FnMut(ItemId, ItemId) -> Ordering) -> Vec<ItemId> {
    let mut sorted = order.to_vec();
    sorted.sort_by(|a, b| compare(*a, *b));
    sorted
}

/// Listed items first in reference order, then unlisted items in their
/// original relative order. `descending` reverses the reference list.
pub fn reference_order(order: &[ItemId], reference: &[ItemId], descending: bool) -> Vec<ItemId> {
    let mut listed: Vec<ItemId> = Vec::with_capacity(order.len());
    for id in reference {
        if order.contains(id) && !listed.contains(id) {
            listed.push(*id);
        }
    }
    if descending {
        listed.reverse();
    }
    let rest: Vec<ItemId> = order.iter().copied().filter(|id| !listed.contains(id)).collect();
    listed.extend(rest);
    listed
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickwork_core::alloc::IndexSlot;

    fn ids(n: u32) -> Vec<ItemId> {
        (0..n).map(|i| ItemId::from_slot(IndexSlot::new(0, i))).collect()
    }

    #[test]
    fn test_parse_criteria() {
        let criteria = parse_criteria("  title:desc year  rank:asc ");
        assert_eq!(criteria.len(), 3);
        assert_eq!(criteria[0].field, "title");
        assert_eq!(criteria[0].direction, Some(SortDirection::Descending));
        assert_eq!(criteria[1].direction, None);
        assert_eq!(criteria[2].direction, Some(SortDirection::Ascending));
    }

    #[test]
    fn test_compare_sort_data() {
        let a: SortData = [("n".to_string(), SortValue::from(1.0)), ("s".to_string(), "b".into())]
            .into_iter()
            .collect();
        let b: SortData = [("n".to_string(), SortValue::from(1.0)), ("s".to_string(), "a".into())]
            .into_iter()
            .collect();
        let criteria = parse_criteria("n s");
        assert_eq!(compare_sort_data(&a, &b, &criteria, false), Ordering::Greater);
        assert_eq!(compare_sort_data(&a, &b, &criteria, true), Ordering::Less);
        let criteria = parse_criteria("n s:asc");
        assert_eq!(compare_sort_data(&a, &b, &criteria, true), Ordering::Greater);
    }

    #[test]
    fn test_sorted_order_is_stable() {
        let items = ids(4);
        let keys = [2, 1, 2, 1];
        let sorted = sorted_order(&items, |a, b| {
            let ka = keys[items.iter().position(|i| *i == a).unwrap()];
            let kb = keys[items.iter().position(|i| *i == b).unwrap()];
            ka.cmp(&kb)
        });
        assert_eq!(sorted, vec![items[1], items[3], items[0], items[2]]);
    }

    #[test]
    fn test_reference_order_appends_unlisted() {
        let items = ids(5);
        let reference = vec![items[3], items[1], items[3]];
        assert_eq!(
            reference_order(&items, &reference, false),
            vec![items[3], items[1], items[0], items[2], items[4]]
        );
        assert_eq!(
            reference_order(&items, &reference, true),
            vec![items[1], items[3], items[0], items[2], items[4]]
        );
    }
}
