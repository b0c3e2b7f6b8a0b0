//! Dependency pass over the shared rule set.

use formulac::{
    run_dependency, DefaultManagerFactory, DependencyError, DependencySet, ManagerFactory,
    NodeId, Operator, ScopeInstance, TreeBuilder, VariableId,
};
use pretty_assertions::assert_eq;

use crate::common::{rules, Rules};

fn deps(
    rules: &Rules,
    instance: &ScopeInstance,
    build: impl FnOnce(&mut TreeBuilder<'_>) -> NodeId,
) -> Result<DependencySet, DependencyError> {
    let tree = rules.tree(build);
    let manager = DefaultManagerFactory.make_dependency_manager(&rules.fm, instance, None);
    run_dependency(&manager, &tree)
}

#[test]
fn test_literals_have_no_dependencies() {
    let r = rules();
    let set = deps(&r, &r.pc, |b| {
        let three = b.number(3.0);
        let four = b.number(4.0);
        let two = b.number(2.0);
        let product = b.binary(Operator::Mul, four, two);
        b.binary(Operator::Add, three, product)
    })
    .unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_single_variable() {
    let r = rules();
    let set = deps(&r, &r.pc, |b| {
        let strength = b.variable("STR");
        let two = b.number(2.0);
        b.binary(Operator::Add, strength, two)
    })
    .unwrap();
    assert_eq!(set.to_sorted_vec(), vec![r.id(&r.pc, "STR")]);
}

#[test]
fn test_reaches_parent_instance() {
    let r = rules();
    let set = deps(&r, &r.sword, |b| {
        let weight = b.variable("WEIGHT");
        let bonus = b.variable("BONUS");
        let strength = b.variable("STR");
        let dex = b.variable("DEX");
        let stat = b.call("max", &[strength, dex]);
        let gear = b.binary(Operator::Add, weight, bonus);
        b.binary(Operator::Sub, stat, gear)
    })
    .unwrap();

    let mut expected: Vec<VariableId> = vec![
        r.id(&r.pc, "STR"),
        r.id(&r.pc, "DEX"),
        r.id(&r.sword, "WEIGHT"),
        r.id(&r.sword, "BONUS"),
    ];
    expected.sort_by_key(ToString::to_string);
    assert_eq!(set.to_sorted_vec(), expected);

    // The sword's WEIGHT shadows the character's.
    assert!(!set.contains(&r.id(&r.pc, "WEIGHT")));
}

#[test]
fn test_undeclared_variable_fails() {
    let r = rules();
    let result = deps(&r, &r.pc, |b| {
        let strength = b.variable("STR");
        let foo = b.variable("FOO");
        b.binary(Operator::Add, strength, foo)
    });
    assert!(matches!(
        result,
        Err(DependencyError::UnresolvedVariable { ref name, .. }) if name == "FOO"
    ));
}

#[test]
fn test_untaken_branches_still_count() {
    let r = rules();
    let set = deps(&r, &r.pc, |b| {
        let alive = b.variable("ALIVE");
        let strength = b.variable("STR");
        let dex = b.variable("DEX");
        b.call("if", &[alive, strength, dex])
    })
    .unwrap();
    assert_eq!(set.len(), 3);
}
