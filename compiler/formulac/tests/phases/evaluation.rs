//! Evaluation pass over the shared rule set.

use formulac::{
    run_evaluation, DefaultManagerFactory, EvalError, LibraryError, ManagerFactory, NodeId,
    ObjectRef, Operator, ScopeInstance, Span, TreeBuilder, Value,
};
use pretty_assertions::assert_eq;

use crate::common::{rules, Rules};

fn eval(
    rules: &Rules,
    instance: &ScopeInstance,
    build: impl FnOnce(&mut TreeBuilder<'_>) -> NodeId,
) -> Result<Value, EvalError> {
    let tree = rules.tree(build);
    let manager = DefaultManagerFactory.make_evaluation_manager(&rules.fm, instance, None);
    run_evaluation(&manager, &tree)
}

#[test]
fn test_arithmetic() {
    let r = rules();
    let value = eval(&r, &r.pc, |b| {
        let three = b.number(3.0);
        let four = b.number(4.0);
        let two = b.number(2.0);
        let product = b.binary(Operator::Mul, four, two);
        b.binary(Operator::Add, three, product)
    });
    assert_eq!(value, Ok(Value::Number(11.0)));
}

#[test]
fn test_reads_live_store() {
    let r = rules();
    let formula = |b: &mut TreeBuilder<'_>| {
        let strength = b.variable("STR");
        let two = b.number(2.0);
        b.binary(Operator::Add, strength, two)
    };

    r.set(&r.pc, "STR", Value::Number(15.0));
    assert_eq!(eval(&r, &r.pc, formula), Ok(Value::Number(17.0)));

    // A later store write is seen by the next evaluation.
    r.set(&r.pc, "STR", Value::Number(18.0));
    assert_eq!(eval(&r, &r.pc, formula), Ok(Value::Number(20.0)));
}

#[test]
fn test_equipment_formula() {
    let r = rules();
    r.set(&r.pc, "STR", Value::Number(16.0));
    r.set(&r.pc, "WEIGHT", Value::Number(180.0));
    r.set(&r.sword, "WEIGHT", Value::Number(6.0));
    r.set(&r.sword, "BONUS", Value::Number(2.0));

    // floor(STR / 2) + BONUS - WEIGHT, on the sword.
    let value = eval(&r, &r.sword, |b| {
        let strength = b.variable("STR");
        let two = b.number(2.0);
        let half = b.binary(Operator::Div, strength, two);
        let floor = b.call("floor", &[half]);
        let bonus = b.variable("BONUS");
        let weight = b.variable("WEIGHT");
        let sum = b.binary(Operator::Add, floor, bonus);
        b.binary(Operator::Sub, sum, weight)
    });
    assert_eq!(value, Ok(Value::Number(4.0)));
}

#[test]
fn test_unset_custom_format_uses_default_object() {
    let r = rules();
    assert_eq!(
        eval(&r, &r.pc, |b| b.variable("SIZE")),
        Ok(Value::Object(ObjectRef::new(r.size, "Medium")))
    );

    r.set(&r.pc, "SIZE", Value::Object(ObjectRef::new(r.size, "Large")));
    assert_eq!(
        eval(&r, &r.pc, |b| b.variable("SIZE")).unwrap().to_string(),
        "Size(Large)"
    );
}

#[test]
fn test_division_by_zero_reported_at_node() {
    let r = rules();
    let span = Span::new(0, 7);
    let tree = r.tree(|b| {
        let strength = b.variable("STR");
        let zero = b.number(0.0);
        let div = b.binary(Operator::Div, strength, zero);
        b.set_span(div, span);
        div
    });
    let manager = DefaultManagerFactory.make_evaluation_manager(&r.fm, &r.pc, None);
    let error = run_evaluation(&manager, &tree).unwrap_err();
    assert_eq!(
        error,
        EvalError::Library {
            error: LibraryError::DivisionByZero,
            span,
        }
    );
    assert_eq!(error.to_diagnostic().primary_span(), Some(span));
}

#[test]
fn test_conditional_and_logic_are_lazy() {
    let r = rules();
    r.set(&r.pc, "ALIVE", Value::Bool(false));
    let value = eval(&r, &r.pc, |b| {
        let alive = b.variable("ALIVE");
        let strength = b.variable("STR");
        let zero = b.number(0.0);
        let bad = b.binary(Operator::Div, strength, zero);
        let positive = b.binary(Operator::Gt, bad, zero);
        let both = b.binary(Operator::And, alive, positive);
        let name = b.variable("NAME");
        let dead = b.string("dead");
        b.call("if", &[both, name, dead])
    });
    assert_eq!(value, Ok(Value::string("dead")));
}
