use crate::interpreter::treewalk_interpreter::Interpreter;
use super::values::Value;
use std::fmt;

/// A host-provided function. Misuse is reported by returning `Value::Error`.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub callable: fn(&mut Interpreter, &[Value]) -> Value,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> Value {
        (self.callable)(interpreter, args)
    }
}

pub trait Callable {
    fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> Value;
}
