//! Standard operators and functions.
//!
//! Implementations receive arguments already matched against their
//! signature, so the argument accessors only fail if a host registers one
//! of these functions under a different signature.

use formula_ir::{Operator, StringInterner};
use formula_types::{Format, LibraryError, Value};

use crate::{CallContext, CallStrategy, FunctionLibrary, OperatorLibrary, Signature};

use formula_types::Format::{Boolean, Number, String as Str};

/// Register the standard operators and functions.
pub fn install(
    functions: &mut FunctionLibrary,
    operators: &mut OperatorLibrary,
    interner: &StringInterner,
) {
    install_operators(operators);
    install_functions(functions, interner);
    tracing::debug!(
        operators = operators.len(),
        functions = functions.len(),
        "standard library installed"
    );
}

fn install_operators(ops: &mut OperatorLibrary) {
    let num2 = Signature::new(&[Number, Number], Number);
    ops.register(Operator::Add, num2.clone(), add)
        .register(Operator::Add, Signature::new(&[Str, Str], Str), concat)
        .register(Operator::Sub, num2.clone(), sub)
        .register(Operator::Mul, num2.clone(), mul)
        .register(Operator::Div, num2.clone(), div)
        .register(Operator::Rem, num2.clone(), rem)
        .register(Operator::Pow, num2, pow)
        .register(Operator::Neg, Signature::new(&[Number], Number), neg)
        .register(Operator::Not, Signature::new(&[Boolean], Boolean), not);

    let bool2 = Signature::new(&[Boolean, Boolean], Boolean);
    ops.register(Operator::And, bool2.clone(), and)
        .set_strategy(Operator::And, CallStrategy::ShortCircuit(false))
        .register(Operator::Or, bool2, or)
        .set_strategy(Operator::Or, CallStrategy::ShortCircuit(true));

    for format in [Number, Str, Boolean] {
        let sig = Signature::new(&[format, format], Boolean);
        ops.register(Operator::Eq, sig.clone(), eq)
            .register(Operator::NotEq, sig, not_eq);
    }

    let cmp = Signature::new(&[Number, Number], Boolean);
    ops.register(Operator::Lt, cmp.clone(), lt)
        .register(Operator::LtEq, cmp.clone(), lt_eq)
        .register(Operator::Gt, cmp.clone(), gt)
        .register(Operator::GtEq, cmp, gt_eq);
}

fn install_functions(functions: &mut FunctionLibrary, interner: &StringInterner) {
    let unary = Signature::new(&[Number], Number);
    functions
        .register(interner.intern("abs"), unary.clone(), abs)
        .register(interner.intern("ceil"), unary.clone(), ceil)
        .register(interner.intern("floor"), unary.clone(), floor)
        .register(interner.intern("round"), unary, round);

    let binary = Signature::new(&[Number, Number], Number);
    functions
        .register(interner.intern("min"), binary.clone(), min)
        .register(interner.intern("max"), binary, max);

    let if_name = interner.intern("if");
    for format in [Number, Str, Boolean] {
        functions.register(
            if_name,
            Signature::new(&[Boolean, format, format], format),
            select,
        );
    }
    functions.set_strategy(if_name, CallStrategy::Select);
}

fn number(args: &[Value], index: usize, function: &str) -> Result<f64, LibraryError> {
    args.get(index)
        .and_then(Value::as_number)
        .ok_or_else(|| mismatch(function, index, Number))
}

fn boolean(args: &[Value], index: usize, function: &str) -> Result<bool, LibraryError> {
    args.get(index)
        .and_then(Value::as_bool)
        .ok_or_else(|| mismatch(function, index, Boolean))
}

fn string<'a>(args: &'a [Value], index: usize, function: &str) -> Result<&'a str, LibraryError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| mismatch(function, index, Str))
}

fn mismatch(function: &str, index: usize, expected: Format) -> LibraryError {
    LibraryError::domain(function, format!("argument {index} is not a {expected}"))
}

fn pair(args: &[Value], function: &str) -> Result<(f64, f64), LibraryError> {
    Ok((number(args, 0, function)?, number(args, 1, function)?))
}

fn add(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "+")?;
    Ok(Value::Number(a + b))
}

fn concat(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = (string(args, 0, "+")?, string(args, 1, "+")?);
    Ok(Value::string(format!("{a}{b}")))
}

fn sub(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "-")?;
    Ok(Value::Number(a - b))
}

fn mul(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "*")?;
    Ok(Value::Number(a * b))
}

fn div(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "/")?;
    if b == 0.0 {
        return Err(LibraryError::DivisionByZero);
    }
    Ok(Value::Number(a / b))
}

fn rem(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "%")?;
    if b == 0.0 {
        return Err(LibraryError::DivisionByZero);
    }
    Ok(Value::Number(a % b))
}

fn pow(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "^")?;
    let result = a.powf(b);
    if !result.is_finite() {
        return Err(LibraryError::domain(
            "^",
            format!("{a} ^ {b} has no finite result"),
        ));
    }
    Ok(Value::Number(result))
}

fn neg(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Number(-number(args, 0, "-")?))
}

fn not(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Bool(!boolean(args, 0, "!")?))
}

fn and(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Bool(boolean(args, 0, "&&")? && boolean(args, 1, "&&")?))
}

fn or(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Bool(boolean(args, 0, "||")? || boolean(args, 1, "||")?))
}

fn equal(context: &CallContext, args: &[Value]) -> bool {
    match (args.first(), args.get(1)) {
        (Some(a), Some(b)) => a.approx_eq(b, context.tolerance()) == Ok(true),
        _ => false,
    }
}

fn eq(context: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Bool(equal(context, args)))
}

fn not_eq(context: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Bool(!equal(context, args)))
}

fn lt(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "<")?;
    Ok(Value::Bool(a < b))
}

fn lt_eq(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "<=")?;
    Ok(Value::Bool(a <= b))
}

fn gt(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, ">")?;
    Ok(Value::Bool(a > b))
}

fn gt_eq(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, ">=")?;
    Ok(Value::Bool(a >= b))
}

fn abs(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Number(number(args, 0, "abs")?.abs()))
}

fn ceil(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Number(number(args, 0, "ceil")?.ceil()))
}

fn floor(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Number(number(args, 0, "floor")?.floor()))
}

fn round(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    Ok(Value::Number(number(args, 0, "round")?.round()))
}

fn min(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "min")?;
    Ok(Value::Number(a.min(b)))
}

fn max(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let (a, b) = pair(args, "max")?;
    Ok(Value::Number(a.max(b)))
}

/// `if(cond, then, else)` when all three arguments were evaluated.
fn select(_: &CallContext, args: &[Value]) -> Result<Value, LibraryError> {
    let branch = if boolean(args, 0, "if")? { 1 } else { 2 };
    args.get(branch)
        .cloned()
        .ok_or_else(|| LibraryError::domain("if", "missing branch"))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
