#![allow(clippy::unwrap_used)]

use kolasu::{Point, Range};
use rstest::rstest;

use crate::helpers::*;

// ============================================================================
// ORDERS
// ============================================================================

#[test]
fn test_walk_is_pre_order() {
    let fixture = fixture();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk(fixture.root)),
        vec!["root", "first", "1", "2", "big", "small", "3", "4", "5", "6"]
    );
}

#[test]
fn test_walk_leaves_first_is_post_order() {
    let fixture = fixture();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk_leaves_first(fixture.root)),
        vec!["1", "first", "2", "3", "4", "5", "small", "big", "6", "root"]
    );
}

#[test]
fn test_walk_of_a_leaf_yields_only_the_leaf() {
    let fixture = fixture();
    let four = fixture.leaves[3];
    assert_eq!(fixture.ast.walk(four).collect::<Vec<_>>(), vec![four]);
    assert_eq!(fixture.ast.walk_leaves_first(four).collect::<Vec<_>>(), vec![four]);
}

#[test]
fn test_walks_restart_from_scratch() {
    let fixture = fixture();
    let first: Vec<_> = fixture.ast.walk(fixture.big).collect();
    let second: Vec<_> = fixture.ast.walk(fixture.big).collect();
    assert_eq!(first, second);
}

#[test]
fn test_walk_descendants_skips_root() {
    let fixture = fixture();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk_descendants(fixture.big)),
        vec!["small", "3", "4", "5"]
    );
}

// ============================================================================
// WITHIN A RANGE
// ============================================================================

#[test]
fn test_walk_within_small() {
    let fixture = fixture();
    let range = fixture.ast.range(fixture.small).unwrap();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk_within(fixture.root, range)),
        vec!["small", "3", "4", "5"]
    );
}

#[rstest]
#[case::whole_tree(Range::from_coords(1, 0, 10, 1), 10)]
#[case::second_line(Range::from_coords(2, 0, 2, 20), 2)]
#[case::leaves_three_and_four(Range::from_coords(5, 10, 6, 10), 2)]
#[case::outside(Range::from_coords(11, 0, 12, 0), 0)]
#[case::empty_line(Range::from_coords(8, 5, 8, 9), 0)]
fn test_walk_within_counts(#[case] range: Range, #[case] expected: usize) {
    let fixture = fixture();
    assert_eq!(fixture.ast.walk_within(fixture.root, range).count(), expected);
}

#[test]
fn test_walk_within_descends_into_partially_covered_groups() {
    let fixture = fixture();
    let range = Range::from_coords(5, 10, 8, 3);
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk_within(fixture.root, range)),
        vec!["3", "4", "5"]
    );
}

#[test]
fn test_walk_within_skips_nodes_without_range() {
    let mut fixture = fixture();
    fixture.ast.set_range(fixture.first, None);
    let range = Range::from_coords(1, 0, 3, 5);
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk_within(fixture.root, range)),
        vec!["2"]
    );
}

// ============================================================================
// ANCESTORS AND SIBLINGS
// ============================================================================

#[test]
fn test_walk_ancestors_nearest_first() {
    let fixture = fixture();
    let four = fixture.leaves[3];
    assert_eq!(
        labels(&fixture.ast, fixture.ast.walk_ancestors(four)),
        vec!["small", "big", "root"]
    );
    assert_eq!(fixture.ast.walk_ancestors(fixture.root).count(), 0);
}

#[test]
fn test_siblings_by_position() {
    let fixture = fixture();
    let two = fixture.leaves[1];
    assert_eq!(fixture.ast.next_sibling(two, None), Some(fixture.big));
    assert_eq!(fixture.ast.previous_sibling(two, None), Some(fixture.first));
    assert_eq!(fixture.ast.next_sibling(two, Some("fixture.Leaf")), Some(fixture.leaves[5]));
    assert_eq!(fixture.ast.previous_sibling(fixture.first, None), None);
}

#[test]
fn test_index_in_containing_feature() {
    let fixture = fixture();
    assert_eq!(fixture.ast.index_in_containing_feature(fixture.leaves[4]).unwrap(), Some(2));
    assert_eq!(
        fixture
            .ast
            .containing_containment(fixture.big)
            .unwrap()
            .map(|c| c.name),
        Some("children")
    );
    assert_eq!(fixture.ast.index_in_containing_feature(fixture.root).unwrap(), None);
}

// ============================================================================
// BY POSITION
// ============================================================================

#[rstest]
#[case::inside_leaf(Point::new(6, 6), vec!["root", "big", "small", "4"])]
#[case::between_leaves(Point::new(6, 2), vec!["root", "big", "small"])]
#[case::first_line(Point::new(1, 0), vec!["root"])]
fn test_search_by_position_follows_the_covering_path(
    #[case] point: Point,
    #[case] expected: Vec<&str>,
) {
    let fixture = fixture();
    assert_eq!(
        labels(&fixture.ast, fixture.ast.search_by_position(fixture.root, point, true)),
        expected
    );
}

#[test]
fn test_find_by_position_returns_innermost_node() {
    let fixture = fixture();
    let found = fixture.ast.find_by_position(fixture.root, Point::new(6, 6), false);
    assert_eq!(found, Some(fixture.leaves[3]));
    assert_eq!(fixture.ast.find_by_position(fixture.root, Point::new(11, 0), false), None);
}

#[test]
fn test_search_by_position_self_contained_prunes_unranged_roots() {
    let mut fixture = fixture();
    fixture.ast.set_range(fixture.root, None);
    let point = Point::new(6, 6);
    assert!(fixture.ast.search_by_position(fixture.root, point, true).is_empty());
    assert_eq!(
        labels(&fixture.ast, fixture.ast.search_by_position(fixture.root, point, false)),
        vec!["root", "big", "small", "4"]
    );
}

#[test]
fn test_find_by_range() {
    let fixture = fixture();
    let range = Range::from_coords(5, 12, 6, 7);
    assert_eq!(
        labels(&fixture.ast, fixture.ast.search_by_range(fixture.root, &range, true)),
        vec!["root", "big", "small"]
    );
    assert_eq!(fixture.ast.find_by_range(fixture.root, &range, true), Some(fixture.small));
    let leaf_range = fixture.ast.range(fixture.leaves[5]).unwrap();
    assert_eq!(
        fixture.ast.find_by_range(fixture.root, &leaf_range, true),
        Some(fixture.leaves[5])
    );
}
