//! Evaluation pass.
//!
//! Computes the value of a formula against a scope instance. Variables are
//! read from the formula manager's live store; a declared variable that
//! was never assigned evaluates to its format's default value.
//!
//! Formats are not re-checked here beyond overload dispatch: evaluation
//! assumes the formula passed the semantics pass for the instance's scope.
//!
//! Calls follow the library's `CallStrategy`, so `if` only evaluates the
//! branch it selects and `&&`/`||` stop once the result is known.
//!
//! Every node is evaluated under its own manager: arguments get a copy
//! asserting the format their position expects, and each call reads the
//! manager's `TOLERANCE` to compare numbers.

mod error;

pub use error::EvalError;

use std::fmt::Debug;
use std::hash::Hash;

use formula_context::keys::ASSERTED;
use formula_context::{EvaluationManager, FormulaManager};
use formula_ir::{FormulaTree, Literal, Name, NodeId, NodeKind, Span};
use formula_library::{CallContext, CallError, CallStrategy, Library};
use formula_scope::{ResolveError, ScopeInstance};
use formula_stack::{ensure_sufficient_stack, DepthGuard};
use formula_types::{ConfigError, Format, Value};
use smallvec::SmallVec;

/// Evaluate `tree` against the manager's instance.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
pub fn run_evaluation(manager: &EvaluationManager, tree: &FormulaTree) -> Result<Value, EvalError> {
    let fm = manager.formula_manager()?;
    let instance = manager.instance()?;

    let mut evaluator = Evaluator {
        fm: &fm,
        instance: &instance,
        tree,
        guard: DepthGuard::new(fm.config().max_tree_depth),
    };
    let value = evaluator.eval(manager, tree.root())?;
    tracing::debug!(%value, "formula evaluated");
    Ok(value)
}

struct Evaluator<'a> {
    fm: &'a FormulaManager,
    instance: &'a ScopeInstance,
    tree: &'a FormulaTree,
    guard: DepthGuard,
}

/// Call site of one function or operator node.
struct Callee<'a, K> {
    library: &'a Library<K>,
    key: K,
    name: &'a str,
    parent: NodeId,
    span: Span,
}

impl Evaluator<'_> {
    #[tracing::instrument(level = "trace", skip(self, manager))]
    fn eval(&mut self, manager: &EvaluationManager, id: NodeId) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| self.eval_inner(manager, id))
    }

    fn eval_inner(&mut self, manager: &EvaluationManager, id: NodeId) -> Result<Value, EvalError> {
        let (fm, tree) = (self.fm, self.tree);
        let &node = tree
            .node(id)
            .ok_or(ConfigError::MalformedTree { node: id })?;

        self.guard
            .enter()
            .map_err(|exceeded| EvalError::NestingTooDeep {
                limit: exceeded.limit,
                span: node.span,
            })?;
        let result = match node.kind {
            NodeKind::Literal(literal) => Ok(self.literal(literal)),
            NodeKind::Variable(name) => self.variable(name, node.span),
            NodeKind::Call { function, args } => {
                let callee = Callee {
                    library: fm.functions(),
                    key: function,
                    name: fm.interner().lookup(function),
                    parent: id,
                    span: node.span,
                };
                self.call(manager, &callee, tree.args(args))
            }
            NodeKind::Operator { op, args } => {
                let callee = Callee {
                    library: fm.operators(),
                    key: op,
                    name: op.as_symbol(),
                    parent: id,
                    span: node.span,
                };
                self.call(manager, &callee, tree.args(args))
            }
        };
        self.guard.exit();
        result
    }

    fn literal(&self, literal: Literal) -> Value {
        match literal {
            Literal::Number(_) => Value::Number(literal.as_number().unwrap_or_default()),
            Literal::Str(name) => Value::string(self.fm.interner().lookup(name)),
            Literal::Bool(b) => Value::Bool(b),
        }
    }

    fn variable(&self, name: Name, span: Span) -> Result<Value, EvalError> {
        let id = self
            .fm
            .resolve_name(self.instance, name)
            .map_err(|error| match error {
                ResolveError::Undeclared { name, scope } => {
                    EvalError::UnresolvedVariable { name, scope, span }
                }
                ResolveError::Config(error) => EvalError::Config(error),
            })?;

        if let Some(value) = self.fm.store().get(&id) {
            return Ok(value);
        }
        tracing::debug!(variable = %id, "no stored value, using format default");
        self.fm
            .formats()
            .default_value(id.format())
            .ok_or_else(|| EvalError::UnsetVariable {
                name: id.label().to_owned(),
                span,
            })
    }

    fn call<K: Copy + Eq + Hash + Debug>(
        &mut self,
        manager: &EvaluationManager,
        callee: &Callee<'_, K>,
        args: Option<&[NodeId]>,
    ) -> Result<Value, EvalError> {
        let &Callee {
            library,
            key,
            name,
            parent,
            span,
        } = callee;
        let args = args.ok_or(ConfigError::MalformedTree { node: parent })?;
        if !library.contains(key) {
            return Err(EvalError::UnknownFunction {
                name: name.to_owned(),
                span,
            });
        }

        // Each argument runs under a manager asserting the format its
        // position expects.
        let expected = library.expected_formats(key, args.len());
        let arg_manager = |i: usize| {
            let assertion = expected
                .as_deref()
                .and_then(|e| e.get(i).copied().flatten());
            manager.derive(ASSERTED, assertion)
        };

        let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
        match (library.strategy(key), args) {
            (CallStrategy::Select, &[condition, if_true, if_false]) => {
                let condition = self.eval(&arg_manager(0), condition)?;
                let (taken, position) = match condition.as_bool() {
                    Some(true) => (if_true, 1),
                    Some(false) => (if_false, 2),
                    None => {
                        return Err(EvalError::NoMatchingOverload {
                            callee: name.to_owned(),
                            found: vec![condition.format()],
                            span,
                        })
                    }
                };
                let branch = self.eval(&arg_manager(position), taken)?;
                // The untaken branch shares the selected one's format.
                values.push(condition);
                values.push(branch.clone());
                values.push(branch);
            }
            (CallStrategy::ShortCircuit(stop), &[first, ref rest @ ..]) => {
                let first = self.eval(&arg_manager(0), first)?;
                if first.as_bool() == Some(stop) {
                    return Ok(first);
                }
                values.push(first);
                for (i, &arg) in rest.iter().enumerate() {
                    values.push(self.eval(&arg_manager(i + 1), arg)?);
                }
            }
            _ => {
                for (i, &arg) in args.iter().enumerate() {
                    values.push(self.eval(&arg_manager(i), arg)?);
                }
            }
        }

        let context = CallContext::with_tolerance(manager.tolerance()?)?;
        library
            .evaluate(key, &context, &values)
            .map_err(|error| match error {
                CallError::Failed(error) => EvalError::Library { error, span },
                CallError::Unknown => EvalError::UnknownFunction {
                    name: name.to_owned(),
                    span,
                },
                CallError::WrongArgCount { .. } | CallError::NoMatchingOverload { .. } => {
                    EvalError::NoMatchingOverload {
                        callee: name.to_owned(),
                        found: values.iter().map(Value::format).collect::<Vec<Format>>(),
                        span,
                    }
                }
            })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
