//! Semantics pass over the shared rule set.

use formulac::{
    run_semantics, DefaultManagerFactory, ErrorCode, Format, LegalScope, ManagerFactory, NodeId,
    Operator, SemanticsError, Span, TreeBuilder,
};
use pretty_assertions::assert_eq;

use crate::common::{rules, Rules};

fn check(
    rules: &Rules,
    scope: &LegalScope,
    asserted: Option<Format>,
    build: impl FnOnce(&mut TreeBuilder<'_>) -> NodeId,
) -> Result<Format, Vec<SemanticsError>> {
    let tree = rules.tree(build);
    let manager = DefaultManagerFactory.make_semantics_manager(&rules.fm, scope, asserted);
    run_semantics(&manager, &tree)
}

#[test]
fn test_arithmetic_is_number() {
    let r = rules();
    let format = check(&r, &r.global, None, |b| {
        let three = b.number(3.0);
        let four = b.number(4.0);
        let two = b.number(2.0);
        let product = b.binary(Operator::Mul, four, two);
        b.binary(Operator::Add, three, product)
    });
    assert_eq!(format, Ok(Format::Number));
}

#[test]
fn test_variable_plus_literal_is_number() {
    let r = rules();
    let format = check(&r, &r.global, Some(Format::Number), |b| {
        let strength = b.variable("STR");
        let two = b.number(2.0);
        b.binary(Operator::Add, strength, two)
    });
    assert_eq!(format, Ok(Format::Number));
}

#[test]
fn test_asserted_string_on_number_formula() {
    let r = rules();
    let errors = check(&r, &r.global, Some(Format::String), |b| {
        let strength = b.variable("STR");
        let two = b.number(2.0);
        b.binary(Operator::Add, strength, two)
    })
    .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_diagnostic().code, ErrorCode::E1007);
}

#[test]
fn test_undeclared_variable() {
    let r = rules();
    let errors = check(&r, &r.global, None, |b| b.variable("FOO")).unwrap_err();
    assert_eq!(
        errors,
        vec![SemanticsError::UnresolvedVariable {
            name: "FOO".to_owned(),
            scope: "Global".to_owned(),
            span: Span::DUMMY,
        }]
    );
}

#[test]
fn test_child_scope_sees_parent_variables() {
    let r = rules();
    let format = check(&r, &r.equipment, None, |b| {
        let bonus = b.variable("BONUS");
        let strength = b.variable("STR");
        b.binary(Operator::Add, bonus, strength)
    });
    assert_eq!(format, Ok(Format::Number));

    let errors = check(&r, &r.global, None, |b| b.variable("BONUS")).unwrap_err();
    assert!(matches!(errors[0], SemanticsError::UnresolvedVariable { .. }));
}

#[test]
fn test_custom_format_variable() {
    let r = rules();
    let format = check(&r, &r.global, Some(r.size), |b| b.variable("SIZE"));
    assert_eq!(format, Ok(r.size));

    // The standard library has no overloads over host formats.
    let errors = check(&r, &r.global, None, |b| {
        let size = b.variable("SIZE");
        let other = b.variable("SIZE");
        b.binary(Operator::Eq, size, other)
    })
    .unwrap_err();
    assert_eq!(
        errors,
        vec![SemanticsError::NoMatchingOverload {
            callee: "==".to_owned(),
            found: vec![r.size, r.size],
            span: Span::DUMMY,
        }]
    );
}

#[test]
fn test_errors_are_accumulated() {
    let r = rules();
    let errors = check(&r, &r.global, None, |b| {
        let foo = b.variable("FOO");
        let bar = b.variable("BAR");
        let name = b.variable("NAME");
        let one = b.number(1.0);
        let left = b.binary(Operator::Add, foo, bar);
        let right = b.binary(Operator::Mul, name, one);
        b.binary(Operator::Sub, left, right)
    })
    .unwrap_err();

    let codes: Vec<_> = errors.iter().map(|e| e.to_diagnostic().code).collect();
    assert_eq!(codes, vec![ErrorCode::E1001, ErrorCode::E1001, ErrorCode::E1005]);
}
