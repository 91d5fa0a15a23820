//! condition evaluator
//!
//! walks a parsed condition with a [`FunctionRegistry`]. `&&`, `||` and
//! `if(...)` only evaluate the operands they need.

use tracing::trace;

use super::convert;
use super::error::{ConditionError, ConditionResult};
use super::functions::{Builtin, FunctionRegistry};
use super::types::{BinaryOp, Expr, UnaryOp, Value};

/// tolerance for numeric `==` / `!=`
const EPSILON: f64 = 1e-9;

/// evaluate a condition with the given functions
pub fn evaluate(expr: &Expr, functions: &FunctionRegistry<'_>) -> ConditionResult<Value> {
    match expr {
        Expr::Literal(Value::String(s)) if s.contains("${") => {
            Ok(Value::String(functions.interpolate(s)?))
        }
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Property(name) => {
            let value = functions.property(name)?;
            trace!(property = %name, value = %value, "resolved property alias");
            Ok(value)
        }
        Expr::Group(inner) => evaluate(inner, functions),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => {
            let value = evaluate(operand, functions)?;
            match value {
                Value::Null => Err(ConditionError::type_error("cannot negate null")),
                other => Ok(Value::Number(-convert::to_double(&other)?)),
            }
        }
        Expr::Call { name, args } => evaluate_call(name, args, functions),
        Expr::Binary { op, left, right } => evaluate_binary(*op, left, right, functions),
    }
}

fn evaluate_call(
    name: &str,
    args: &[Expr],
    functions: &FunctionRegistry<'_>,
) -> ConditionResult<Value> {
    // the built-in if only evaluates the branch it picks
    if name == Builtin::If.name() && !functions.has_override(name) {
        if args.len() != 3 {
            return Err(ConditionError::Arity {
                name: name.to_string(),
                expected: "3",
                actual: args.len(),
            });
        }
        let condition = evaluate(&args[0], functions)?;
        let branch = if convert::to_boolean(&condition) {
            &args[1]
        } else {
            &args[2]
        };
        return evaluate(branch, functions);
    }

    let values = args
        .iter()
        .map(|arg| evaluate(arg, functions))
        .collect::<ConditionResult<Vec<_>>>()?;
    functions.call(name, &values)
}

fn evaluate_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    functions: &FunctionRegistry<'_>,
) -> ConditionResult<Value> {
    match op {
        BinaryOp::And => {
            if !convert::to_boolean(&evaluate(left, functions)?) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(convert::to_boolean(&evaluate(right, functions)?)))
        }
        BinaryOp::Or => {
            if convert::to_boolean(&evaluate(left, functions)?) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(convert::to_boolean(&evaluate(right, functions)?)))
        }
        _ => {
            let l = evaluate(left, functions)?;
            let r = evaluate(right, functions)?;
            apply(op, &l, &r)
        }
    }
}

/// apply a non-logical binary operator to evaluated operands
pub(crate) fn apply(op: BinaryOp, l: &Value, r: &Value) -> ConditionResult<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(equals(l, r))),
        BinaryOp::Ne => Ok(Value::Bool(!equals(l, r))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (a, b) = numeric_operands(op, l, r)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => a < b,
                BinaryOp::Le => a <= b,
                BinaryOp::Gt => a > b,
                _ => a >= b,
            }))
        }
        BinaryOp::Add => {
            if matches!(l, Value::String(_)) || matches!(r, Value::String(_)) {
                let mut out = convert::to_string(l);
                out.push_str(&convert::to_string(r));
                return Ok(Value::String(out));
            }
            let (a, b) = numeric_operands(op, l, r)?;
            Ok(Value::Number(a + b))
        }
        BinaryOp::Sub => {
            let (a, b) = numeric_operands(op, l, r)?;
            Ok(Value::Number(a - b))
        }
        BinaryOp::Mul => {
            let (a, b) = numeric_operands(op, l, r)?;
            Ok(Value::Number(a * b))
        }
        BinaryOp::Div => {
            let (a, b) = numeric_operands(op, l, r)?;
            if b == 0.0 {
                return Err(ConditionError::Arithmetic("division by zero".to_string()));
            }
            Ok(Value::Number(a / b))
        }
        BinaryOp::And | BinaryOp::Or => Ok(Value::Bool(match op {
            BinaryOp::And => convert::to_boolean(l) && convert::to_boolean(r),
            _ => convert::to_boolean(l) || convert::to_boolean(r),
        })),
    }
}

fn numeric_operands(op: BinaryOp, l: &Value, r: &Value) -> ConditionResult<(f64, f64)> {
    if l.is_null() || r.is_null() {
        return Err(ConditionError::type_error(format!(
            "cannot apply '{}' to {} and {}",
            op,
            l.type_name(),
            r.type_name()
        )));
    }
    Ok((convert::to_double(l)?, convert::to_double(r)?))
}

fn equals(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => (a - b).abs() < EPSILON,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => convert::to_string(l) == convert::to_string(r),
    }
}
