//! Positions and ranges against the sample tree.

#![allow(clippy::unwrap_used)]

use kolasu::{Point, Range};
use rstest::rstest;

use crate::helpers::*;

#[rstest]
#[case::start(Point::new(4, 2), true)]
#[case::end(Point::new(8, 3), true)]
#[case::inside(Point::new(6, 0), true)]
#[case::before_start(Point::new(4, 1), false)]
#[case::after_end(Point::new(8, 4), false)]
#[case::other_line(Point::new(9, 0), false)]
fn test_contains_point_includes_both_ends(#[case] point: Point, #[case] expected: bool) {
    let fixture = fixture();
    let big = fixture.ast.range(fixture.big).unwrap();
    assert_eq!(big.contains_point(point), expected);
}

#[test]
fn test_child_ranges_nest() {
    let fixture = fixture();
    let root = fixture.ast.range(fixture.root).unwrap();
    for node in fixture.ast.walk_descendants(fixture.root) {
        assert!(root.contains(&fixture.ast.range(node).unwrap()), "{}", label(&fixture.ast, node));
    }
    assert_eq!(fixture.ast.find_invalid_range(fixture.root), None);
}

#[test]
fn test_leaking_range_is_reported() {
    let mut fixture = fixture();
    let four = fixture.leaves[3];
    fixture.ast.set_range(four, Some(Range::from_coords(9, 0, 9, 1)));
    assert_eq!(fixture.ast.find_invalid_range(fixture.root), Some(four));
}

#[test]
fn test_range_text_counts_columns_in_chars() {
    let code = "let é = 1;\nprint(é)";
    let range = Range::from_coords(1, 4, 1, 5);
    assert_eq!(range.text(code), Some("é"));
    assert_eq!(range.length(code), Some(2));
    assert_eq!(Range::from_coords(2, 6, 2, 7).text(code), Some("é"));
}

#[test]
fn test_point_advance_over_lines() {
    let end = Point::new(1, 0).advance("ab\r\ncd\nx");
    assert_eq!(end, Point::new(3, 1));
}
