use crate::interpreter::treewalk_interpreter::Interpreter;
use crate::value::{type_of, NativeFunction, Value};

/*
Builtins check their own arity and argument types and report misuse by
returning an Error value; they never panic.
*/

type Builtin = fn(&mut Interpreter, &[Value]) -> Value;

const BUILTINS: &[(&str, Builtin)] = &[
    ("len", len),
    ("first", first),
    ("last", last),
    ("rest", rest),
    ("push", push),
    ("puts", puts),
];

pub fn lookup(name: &str) -> Option<NativeFunction> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|&(name, callable)| NativeFunction { name, callable })
}

fn check_arity(args: &[Value], want: usize) -> Result<(), Value> {
    if args.len() == want {
        Ok(())
    } else {
        Err(Value::error(format!(
            "wrong number of arguments. got={}, want={}",
            args.len(),
            want
        )))
    }
}

fn array_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, Value> {
    match &args[0] {
        array @ Value::Array(_) => Ok(array),
        other => Err(Value::error(format!(
            "argument to `{}` must be ARRAY, got {}",
            name,
            type_of(other)
        ))),
    }
}

fn elements(array: &Value) -> Vec<Value> {
    match array {
        Value::Array(elements) => elements.borrow().clone(),
        _ => Vec::new(),
    }
}

pub fn len(_interp: &mut Interpreter, args: &[Value]) -> Value {
    if let Err(err) = check_arity(args, 1) {
        return err;
    }
    match &args[0] {
        Value::String(s) => Value::Integer(s.len() as i64),
        Value::Array(elements) => Value::Integer(elements.borrow().len() as i64),
        other => Value::error(format!(
            "argument to `len` not supported, got {}",
            type_of(other)
        )),
    }
}

pub fn first(_interp: &mut Interpreter, args: &[Value]) -> Value {
    let array = match check_arity(args, 1).and_then(|_| array_arg("first", args)) {
        Ok(array) => array,
        Err(err) => return err,
    };
    elements(array).into_iter().next().unwrap_or(Value::Null)
}

pub fn last(_interp: &mut Interpreter, args: &[Value]) -> Value {
    let array = match check_arity(args, 1).and_then(|_| array_arg("last", args)) {
        Ok(array) => array,
        Err(err) => return err,
    };
    elements(array).pop().unwrap_or(Value::Null)
}

pub fn rest(_interp: &mut Interpreter, args: &[Value]) -> Value {
    let array = match check_arity(args, 1).and_then(|_| array_arg("rest", args)) {
        Ok(array) => array,
        Err(err) => return err,
    };
    match elements(array).split_first() {
        Some((_, tail)) => Value::array(tail.to_vec()),
        None => Value::Null,
    }
}

pub fn push(_interp: &mut Interpreter, args: &[Value]) -> Value {
    let array = match check_arity(args, 2).and_then(|_| array_arg("push", args)) {
        Ok(array) => array,
        Err(err) => return err,
    };
    let mut copied = elements(array);
    copied.push(args[1].clone());
    Value::array(copied)
}

pub fn puts(interp: &mut Interpreter, args: &[Value]) -> Value {
    for arg in args {
        interp.write_line(arg.inspect());
    }
    Value::Null
}
