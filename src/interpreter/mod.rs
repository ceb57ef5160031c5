pub mod interrupt;
pub mod treewalk_interpreter;
mod util;

use crate::value::Value;

pub use treewalk_interpreter::Interpreter;

/// Non-local exits out of the evaluator. `Ok` carries ordinary values; these
/// unwind with `?` until a call boundary (`Return`) or the top level.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Return(Value),
    Error(String),
}

impl From<Signal> for Value {
    fn from(signal: Signal) -> Value {
        match signal {
            Signal::Return(value) => Value::ReturnValue(Box::new(value)),
            Signal::Error(message) => Value::Error(message),
        }
    }
}

pub type EvalResult = Result<Value, Signal>;

/// How a whole program ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Ran off the end; carries the last statement's value.
    Finished(Value),
    /// Stopped at a top-level `return`.
    Returned(Value),
    /// Stopped by an error; always a `Value::Error`.
    Failed(Value),
}

impl Completion {
    pub fn into_value(self) -> Value {
        match self {
            Completion::Finished(value) | Completion::Returned(value) | Completion::Failed(value) => {
                value
            }
        }
    }
}
