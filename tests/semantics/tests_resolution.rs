#![allow(clippy::unwrap_used)]

use kolasu::semantics::{
    DeclarativeScopeProvider, ResolutionOptions, Scope, ScopeProvider, SemanticsError, resolve_references,
};
use kolasu::{Ast, NodeId, Range, ReferenceByName};

use crate::helpers::*;

/// ```text
/// program {
///   a {}
///   b { -> a, -> b, -> zzz }
///   -> B
/// }
/// ```
struct Program {
    ast: Ast,
    program: NodeId,
    a: NodeId,
    b: NodeId,
    refs: Vec<NodeId>,
}

fn reference(ast: &mut Ast, name: &str) -> NodeId {
    ast.add(Ref {
        target: Some(ReferenceByName::new(name)),
    })
    .unwrap()
}

fn program() -> Program {
    let mut ast = Ast::new(metamodel());
    let span = Range::from_coords(1, 0, 1, 1);
    let a = group(&mut ast, "a", vec![], span.clone());
    let to_a = reference(&mut ast, "a");
    let to_b = reference(&mut ast, "b");
    let to_nothing = reference(&mut ast, "zzz");
    let b = group(&mut ast, "b", vec![to_a, to_b, to_nothing], span.clone());
    let shouted = reference(&mut ast, "B");
    let program = group(&mut ast, "program", vec![a, b, shouted], span);
    Program {
        ast,
        program,
        a,
        b,
        refs: vec![to_a, to_b, to_nothing, shouted],
    }
}

/// Named children of the nearest group that has any.
fn provider() -> DeclarativeScopeProvider {
    let mut provider = DeclarativeScopeProvider::new(metamodel());
    provider
        .scope_for_feature("fixture.Ref", "target", "fixture.Group", |ast, group| {
            let scope = Scope::of_named(ast, ast.children(group));
            (!scope.is_empty()).then_some(scope)
        })
        .unwrap();
    provider
}

fn referred(ast: &Ast, node: NodeId) -> Option<NodeId> {
    ast.get_reference(node, "target").unwrap().and_then(|r| r.referred)
}

#[test]
fn test_scope_comes_from_nearest_defining_ancestor() {
    let p = program();
    let scope = provider().scope_for(&p.ast, p.refs[0], "target").unwrap();
    let names: Vec<&str> = scope.symbols().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_resolve_references_binds_what_it_finds() {
    let mut p = program();
    let summary = resolve_references(&mut p.ast, p.program, &provider(), ResolutionOptions::default()).unwrap();

    assert_eq!(summary.resolved, vec![(p.refs[0], "target"), (p.refs[1], "target")]);
    assert_eq!(summary.unresolved, vec![(p.refs[2], "target"), (p.refs[3], "target")]);
    assert!(!summary.is_complete());
    assert_eq!(referred(&p.ast, p.refs[0]), Some(p.a));
    assert_eq!(referred(&p.ast, p.refs[1]), Some(p.b));
    assert_eq!(referred(&p.ast, p.refs[2]), None);
}

#[test]
fn test_case_insensitive_resolution() {
    let mut p = program();
    let options = ResolutionOptions::default().with_case_insensitive(true);
    let summary = resolve_references(&mut p.ast, p.program, &provider(), options).unwrap();
    assert_eq!(summary.resolved.len(), 3);
    assert_eq!(referred(&p.ast, p.refs[3]), Some(p.b));
}

#[test]
fn test_resolution_overwrites_stale_bindings() {
    let mut p = program();
    p.ast.set_reference_referred(p.refs[2], "target", Some(p.a)).unwrap();
    resolve_references(&mut p.ast, p.program, &provider(), ResolutionOptions::default()).unwrap();
    assert_eq!(referred(&p.ast, p.refs[2]), None);
}

#[test]
fn test_feature_definition_wins_over_target_definition() {
    let mut p = program();
    let mut provider = DeclarativeScopeProvider::new(metamodel());
    provider
        .scope_for_target("fixture.Group", "fixture.Group", |ast, group| {
            Some(Scope::of_named(ast, ast.walk_descendants(group)))
        })
        .unwrap()
        .scope_for_feature("fixture.Ref", "target", "fixture.Group", |ast, group| {
            let mut scope = Scope::new();
            scope.define("b", ast.children(group)[0]);
            Some(scope)
        })
        .unwrap();
    resolve_references(&mut p.ast, p.program, &provider, ResolutionOptions::default()).unwrap();
    assert_eq!(referred(&p.ast, p.refs[0]), None);
    assert_eq!(referred(&p.ast, p.refs[1]), None);
}

#[test]
fn test_target_definition_alone() {
    let mut p = program();
    let mut provider = DeclarativeScopeProvider::new(metamodel());
    provider
        .scope_for_target("fixture.Group", "fixture.Group", |ast, group| {
            Some(Scope::of_named(ast, ast.walk(group)))
        })
        .unwrap();
    resolve_references(&mut p.ast, p.program, &provider, ResolutionOptions::default()).unwrap();
    assert_eq!(referred(&p.ast, p.refs[0]), None);
    assert_eq!(referred(&p.ast, p.refs[1]), Some(p.b));
}

#[test]
fn test_duplicate_definition_is_rejected() {
    let mut provider = provider();
    let result = provider.scope_for_feature("fixture.Ref", "target", "fixture.Group", |_, _| None);
    assert!(matches!(result, Err(SemanticsError::DuplicateDefinition { .. })));
}

#[test]
fn test_definition_on_attribute_is_rejected() {
    let mut provider = DeclarativeScopeProvider::new(metamodel());
    let result = provider.scope_for_feature("fixture.Group", "name", "fixture.Group", |_, _| None);
    assert!(matches!(result, Err(SemanticsError::NotAReference { .. })));
}

#[test]
fn test_parent_scopes_are_searched_after_local_ones() {
    let p = program();
    let mut outer = Scope::new();
    outer.define("x", p.a);
    let mut inner = Scope::new().with_parent(outer);
    inner.define("y", p.b);
    assert_eq!(inner.resolve(&p.ast, "x", None), Some(p.a));
    assert_eq!(inner.resolve(&p.ast, "y", Some("fixture.Group")), Some(p.b));
    assert_eq!(inner.resolve(&p.ast, "y", Some("fixture.Leaf")), None);
    assert_eq!(inner.resolve(&p.ast, "X", None), None);
    assert_eq!(inner.resolve_ignoring_case(&p.ast, "X", None), Some(p.a));
}
