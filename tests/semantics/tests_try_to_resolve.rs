#![allow(clippy::unwrap_used)]

use kolasu::ReferenceByName;

use crate::helpers::*;

#[test]
fn test_true_iff_a_candidate_matches() {
    let fixture = fixture();
    let groups = fixture.ast.collect_by_type(fixture.root, "fixture.Group");

    let mut reference = ReferenceByName::new("big");
    assert!(reference.try_to_resolve(&fixture.ast, groups.clone(), false));
    assert_eq!(reference.referred, Some(fixture.big));

    let mut missing = ReferenceByName::new("huge");
    assert!(!missing.try_to_resolve(&fixture.ast, groups, false));
    assert_eq!(missing.referred, None);
}

#[test]
fn test_first_match_wins() {
    let mut fixture = fixture();
    let range = fixture.ast.range(fixture.small).unwrap();
    let twin = group(&mut fixture.ast, "small", vec![], range);
    let mut reference = ReferenceByName::new("small");
    assert!(reference.try_to_resolve(&fixture.ast, [twin, fixture.small], false));
    assert_eq!(reference.referred, Some(twin));
}

#[test]
fn test_miss_clears_previous_binding() {
    let fixture = fixture();
    let mut reference = ReferenceByName::resolved("gone", fixture.first);
    assert!(!reference.try_to_resolve(&fixture.ast, [fixture.first, fixture.big], false));
    assert!(!reference.is_resolved());
}

#[test]
fn test_case_insensitive_match() {
    let fixture = fixture();
    let mut reference = ReferenceByName::new("FIRST");
    assert!(!reference.try_to_resolve(&fixture.ast, [fixture.first], false));
    assert!(reference.try_to_resolve(&fixture.ast, [fixture.first], true));
}

#[test]
fn test_unnamed_candidates_never_match() {
    let fixture = fixture();
    let mut reference = ReferenceByName::new("1");
    assert!(!reference.try_to_resolve(&fixture.ast, fixture.leaves.clone(), false));
}
