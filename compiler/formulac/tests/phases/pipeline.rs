//! The `Formula` facade across all three passes.

use formulac::keys::TOLERANCE;
use formulac::{
    init_tracing, ConfigError, DefaultManagerFactory, EvalError, EvaluationManager, Format,
    Formula, ManagerFactory, NodeId, Operator, ScopeInstance, SemanticsError,
    SharedFormulaManager, TreeBuilder, Value,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rayon::prelude::*;

use crate::common::{rules, Rules};

fn formula(rules: &Rules, build: impl FnOnce(&mut TreeBuilder<'_>) -> NodeId) -> Formula {
    Formula::new(rules.tree(build))
}

fn strength_plus_two(b: &mut TreeBuilder<'_>) -> NodeId {
    let strength = b.variable("STR");
    let two = b.number(2.0);
    b.binary(Operator::Add, strength, two)
}

#[test]
fn test_literal_formula_end_to_end() {
    init_tracing();
    let r = rules();
    let checked = formula(&r, |b| {
        let three = b.number(3.0);
        let four = b.number(4.0);
        let two = b.number(2.0);
        let product = b.binary(Operator::Mul, four, two);
        b.binary(Operator::Add, three, product)
    })
    .check(&DefaultManagerFactory, &r.fm, &r.global, None)
    .unwrap();

    assert_eq!(checked.format(), Format::Number);
    assert!(checked
        .dependencies(&DefaultManagerFactory, &r.fm, &r.pc)
        .unwrap()
        .is_empty());
    assert_eq!(
        checked.evaluate(&DefaultManagerFactory, &r.fm, &r.pc),
        Ok(Value::Number(11.0))
    );
}

#[test]
fn test_variable_formula_end_to_end() {
    let r = rules();
    r.set(&r.pc, "STR", Value::Number(15.0));
    let checked = formula(&r, strength_plus_two)
        .check(&DefaultManagerFactory, &r.fm, &r.global, Some(Format::Number))
        .unwrap();

    let deps = checked
        .dependencies(&DefaultManagerFactory, &r.fm, &r.pc)
        .unwrap();
    assert_eq!(deps.to_sorted_vec(), vec![r.id(&r.pc, "STR")]);
    assert_eq!(
        checked.evaluate(&DefaultManagerFactory, &r.fm, &r.pc),
        Ok(Value::Number(17.0))
    );
}

#[test]
fn test_wrong_assertion_stops_pipeline() {
    let r = rules();
    let errors = formula(&r, strength_plus_two)
        .check(&DefaultManagerFactory, &r.fm, &r.global, Some(Format::String))
        .unwrap_err();
    assert!(matches!(
        errors.as_slice(),
        [SemanticsError::RootFormatMismatch {
            expected: Format::String,
            found: Format::Number,
            ..
        }]
    ));
}

#[test]
fn test_evaluation_manager_for_variable_matches_direct_form() {
    let r = rules();
    r.set(&r.pc, "STR", Value::Number(9.0));
    let id = r.id(&r.sword, "STR");
    let tree = r.tree(strength_plus_two);

    let via_id = DefaultManagerFactory.make_evaluation_manager_for(&r.fm, &id);
    let direct =
        DefaultManagerFactory.make_evaluation_manager(&r.fm, id.instance(), Some(id.format()));
    assert_eq!(
        formulac::run_evaluation(&via_id, &tree),
        formulac::run_evaluation(&direct, &tree)
    );
    assert_eq!(
        formulac::run_evaluation(&via_id, &tree),
        Ok(Value::Number(11.0))
    );
}

#[test]
fn test_facade_accepts_dyn_factory() {
    let r = rules();
    let factory: &dyn ManagerFactory = &DefaultManagerFactory;
    let checked = formula(&r, |b| b.variable("WEIGHT"))
        .check(factory, &r.fm, &r.equipment, None)
        .unwrap();
    r.set(&r.sword, "WEIGHT", Value::Number(6.0));
    assert_eq!(
        checked.evaluate(factory, &r.fm, &r.sword),
        Ok(Value::Number(6.0))
    );
}

/// Wraps another factory and loosens numeric equality.
struct Loose<F>(F, f64);

impl<F: ManagerFactory> ManagerFactory for Loose<F> {
    fn make_evaluation_manager(
        &self,
        fm: &SharedFormulaManager,
        instance: &ScopeInstance,
        asserted: Option<Format>,
    ) -> EvaluationManager {
        let mut manager = self.0.make_evaluation_manager(fm, instance, asserted);
        manager.set(TOLERANCE, self.1);
        manager
    }
}

#[test]
fn test_decorated_factory_tolerance_used_by_evaluation() {
    let r = rules();
    r.set(&r.pc, "STR", Value::Number(0.1));
    // STR + 0.2 == 0.3
    let checked = formula(&r, |b| {
        let strength = b.variable("STR");
        let fifth = b.number(0.2);
        let sum = b.binary(Operator::Add, strength, fifth);
        let target = b.number(0.3);
        b.binary(Operator::Eq, sum, target)
    })
    .check(&DefaultManagerFactory, &r.fm, &r.global, Some(Format::Boolean))
    .unwrap();

    assert_eq!(
        checked.evaluate(&DefaultManagerFactory, &r.fm, &r.pc),
        Ok(Value::Bool(false))
    );
    assert_eq!(
        checked.evaluate(&Loose(DefaultManagerFactory, 1e-9), &r.fm, &r.pc),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        checked.evaluate(&Loose(DefaultManagerFactory, -1.0), &r.fm, &r.pc),
        Err(EvalError::Config(ConfigError::NegativeTolerance {
            tolerance: -1.0
        }))
    );
}

#[test]
fn test_released_instances_leave_the_cache() {
    let r = rules();
    let checked = formula(&r, strength_plus_two)
        .check(&DefaultManagerFactory, &r.fm, &r.global, None)
        .unwrap();
    let before = r.fm.instance_count();

    for i in 0..20 {
        let npc = r.fm.instance(&r.global, &format!("npc{i}"), None).unwrap();
        r.set(&npc, "STR", Value::Number(1.0));
        assert_eq!(
            checked.evaluate(&DefaultManagerFactory, &r.fm, &npc),
            Ok(Value::Number(3.0))
        );
        assert_eq!(r.fm.release_instance(&npc), 1);
    }
    assert_eq!(r.fm.instance_count(), before);
}

#[test]
fn test_parallel_evaluation_shares_one_manager() {
    let r = rules();
    let checked = formula(&r, strength_plus_two)
        .check(&DefaultManagerFactory, &r.fm, &r.global, None)
        .unwrap();

    let characters: Vec<_> = (0..64u32)
        .map(|i| {
            let pc = r.fm.instance(&r.global, &format!("pc{i}"), None).unwrap();
            r.set(&pc, "STR", Value::Number(f64::from(i)));
            pc
        })
        .collect();

    let values: Vec<Result<Value, EvalError>> = characters
        .par_iter()
        .map(|pc| checked.evaluate(&DefaultManagerFactory, &r.fm, pc))
        .collect();

    for (i, value) in (0..64u32).zip(values) {
        assert_eq!(value, Ok(Value::Number(f64::from(i) + 2.0)));
    }
}

/// Random formula over the shared rule set, not necessarily well formed.
#[derive(Clone, Debug)]
enum Expr {
    Number(f64),
    Bool(bool),
    Str(String),
    Var(&'static str),
    Unary(Operator, Box<Expr>),
    Binary(Operator, Box<Expr>, Box<Expr>),
    Call(&'static str, Vec<Expr>),
}

impl Expr {
    fn build(&self, b: &mut TreeBuilder<'_>) -> NodeId {
        match self {
            Expr::Number(n) => b.number(*n),
            Expr::Bool(v) => b.boolean(*v),
            Expr::Str(s) => b.string(s),
            Expr::Var(name) => b.variable(name),
            Expr::Unary(op, operand) => {
                let operand = operand.build(b);
                b.unary(*op, operand)
            }
            Expr::Binary(op, left, right) => {
                let left = left.build(b);
                let right = right.build(b);
                b.binary(*op, left, right)
            }
            Expr::Call(name, args) => {
                let args: Vec<NodeId> = args.iter().map(|arg| arg.build(b)).collect();
                b.call(name, &args)
            }
        }
    }
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (-100.0..100.0f64).prop_map(Expr::Number),
        any::<bool>().prop_map(Expr::Bool),
        "[a-z]{0,4}".prop_map(Expr::Str),
        prop::sample::select(vec!["STR", "DEX", "NAME", "ALIVE", "WEIGHT"]).prop_map(Expr::Var),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (
                prop::sample::select(vec![Operator::Neg, Operator::Not]),
                inner.clone()
            )
                .prop_map(|(op, e)| Expr::Unary(op, Box::new(e))),
            (
                prop::sample::select(vec![
                    Operator::Add,
                    Operator::Sub,
                    Operator::Mul,
                    Operator::Div,
                    Operator::And,
                    Operator::Or,
                    Operator::Eq,
                    Operator::Lt,
                ]),
                inner.clone(),
                inner.clone()
            )
                .prop_map(|(op, l, r)| Expr::Binary(op, Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, e)| Expr::Call("if", vec![c, t, e])),
            prop::collection::vec(inner, 1..3).prop_map(|args| Expr::Call("max", args)),
        ]
    })
}

proptest! {
    #[test]
    fn test_checked_format_matches_evaluated_value(e in expr(), strength in -50.0..50.0f64) {
        let r = rules();
        r.set(&r.pc, "STR", Value::Number(strength));
        r.set(&r.pc, "NAME", Value::string("Ragnar"));

        let formula = Formula::new(r.tree(|b| e.build(b)));
        if let Ok(checked) = formula.check(&DefaultManagerFactory, &r.fm, &r.global, None) {
            prop_assert!(checked.dependencies(&DefaultManagerFactory, &r.fm, &r.pc).is_ok());
            // Library failures such as division by zero are legitimate.
            if let Ok(value) = checked.evaluate(&DefaultManagerFactory, &r.fm, &r.pc) {
                prop_assert_eq!(value.format(), checked.format());
            }
        }
    }
}
