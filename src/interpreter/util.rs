use crate::parser::astnode::{InfixOp, PrefixOp};
use crate::value::{type_of, Value};

use super::Signal;

fn error(message: String) -> Signal {
    Signal::Error(message)
}

pub fn eval_prefix(op: PrefixOp, right: Value) -> Result<Value, Signal> {
    match (op, right) {
        (PrefixOp::Bang, right) => Ok(Value::Boolean(!right.is_truthy())),
        (PrefixOp::Minus, Value::Integer(v)) => Ok(Value::Integer(v.wrapping_neg())),
        (PrefixOp::Minus, right) => Err(error(format!("unknown operator: -{}", type_of(&right)))),
    }
}

pub fn eval_infix(op: InfixOp, left: Value, right: Value) -> Result<Value, Signal> {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(op, *l, *r),
        (Value::String(l), Value::String(r)) => match op {
            InfixOp::Plus => Ok(Value::string(format!("{}{}", l, r))),
            InfixOp::Eq => Ok(Value::Boolean(l == r)),
            InfixOp::NotEq => Ok(Value::Boolean(l != r)),
            _ => Err(unknown_operator(op, &left, &right)),
        },
        _ if op == InfixOp::Eq => Ok(Value::Boolean(left == right)),
        _ if op == InfixOp::NotEq => Ok(Value::Boolean(left != right)),
        _ if type_of(&left) != type_of(&right) => Err(error(format!(
            "type mismatch: {} {} {}",
            type_of(&left),
            op,
            type_of(&right)
        ))),
        _ => Err(unknown_operator(op, &left, &right)),
    }
}

fn unknown_operator(op: InfixOp, left: &Value, right: &Value) -> Signal {
    error(format!(
        "unknown operator: {} {} {}",
        type_of(left),
        op,
        type_of(right)
    ))
}

fn eval_integer_infix(op: InfixOp, l: i64, r: i64) -> Result<Value, Signal> {
    let value = match op {
        InfixOp::Plus => Value::Integer(l.wrapping_add(r)),
        InfixOp::Minus => Value::Integer(l.wrapping_sub(r)),
        InfixOp::Asterisk => Value::Integer(l.wrapping_mul(r)),
        InfixOp::Slash if r == 0 => {
            return Err(error(format!("division by zero: {} / {}", l, r)))
        }
        InfixOp::Slash => Value::Integer(l.wrapping_div(r)),
        InfixOp::Lt => Value::Boolean(l < r),
        InfixOp::Gt => Value::Boolean(l > r),
        InfixOp::Eq => Value::Boolean(l == r),
        InfixOp::NotEq => Value::Boolean(l != r),
    };
    Ok(value)
}

pub fn eval_index(left: &Value, index: &Value) -> Result<Value, Signal> {
    match (left, index) {
        (Value::Array(elements), Value::Integer(idx)) => {
            let elements = elements.borrow();
            let element = usize::try_from(*idx).ok().and_then(|idx| elements.get(idx));
            Ok(element.cloned().unwrap_or(Value::Null))
        }
        (Value::Hash(hash), key) => hash
            .borrow()
            .get(key)
            .map(|value| value.cloned().unwrap_or(Value::Null))
            .map_err(|err| error(err.to_string())),
        _ => Err(error(format!(
            "index operator not supported: {}",
            type_of(left)
        ))),
    }
}
