use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use super::{functions::{Function, HashObject}, native_function::NativeFunction};

/// A runtime value.
///
/// `Array` and `Hash` are reference-semantics containers: cloning the value
/// clones the handle, so an in-place update is visible to every holder.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Null,
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Hash(Rc<RefCell<HashObject>>),
    Function(Rc<Function>),
    Builtin(NativeFunction),
    ReturnValue(Box<Value>),
    Error(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Type {
    Integer,
    Boolean,
    Null,
    String,
    Array,
    Hash,
    Function,
    Builtin,
    ReturnValue,
    Error,
}

impl Type {
    pub fn as_str(self) -> &'static str {
        match self {
            Type::Integer => "INTEGER",
            Type::Boolean => "BOOLEAN",
            Type::Null => "NULL",
            Type::String => "STRING",
            Type::Array => "ARRAY",
            Type::Hash => "HASH",
            Type::Function => "FUNCTION",
            Type::Builtin => "BUILTIN",
            Type::ReturnValue => "RETURN_VALUE",
            Type::Error => "ERROR",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn type_of(value: &Value) -> Type {
    match value {
        Value::Integer(_) => Type::Integer,
        Value::Boolean(_) => Type::Boolean,
        Value::Null => Type::Null,
        Value::String(_) => Type::String,
        Value::Array(_) => Type::Array,
        Value::Hash(_) => Type::Hash,
        Value::Function(_) => Type::Function,
        Value::Builtin(_) => Type::Builtin,
        Value::ReturnValue(_) => Type::ReturnValue,
        Value::Error(_) => Type::Error,
    }
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn hash(hash: HashObject) -> Value {
        Value::Hash(Rc::new(RefCell::new(hash)))
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into())
    }

    pub fn type_of(&self) -> Type {
        type_of(self)
    }

    /// Debug/source-like rendering, identical to the `Display` output.
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// `false` and `null` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    /// Strips a return wrapper, leaving any other value untouched.
    pub fn unwrap_return(self) -> Value {
        match self {
            Value::ReturnValue(inner) => *inner,
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Null => f.write_str("null"),
            Value::String(s) => f.write_str(s),
            Value::Array(elements) => {
                write!(f, "[{}]", elements.borrow().iter().join(", "))
            }
            Value::Hash(hash) => {
                let pairs = hash
                    .borrow()
                    .iter()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Value::Function(function) => write!(f, "{}", function),
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::ReturnValue(inner) => write!(f, "{}", inner),
            Value::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

/// Structural equality for scalars, identity for containers and functions.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::ReturnValue(a), Value::ReturnValue(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::string(v)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_inspect_scalars() {
        assert_eq!(Value::Integer(-42).inspect(), "-42");
        assert_eq!(Value::Boolean(true).inspect(), "true");
        assert_eq!(Value::Boolean(false).inspect(), "false");
        assert_eq!(Value::Null.inspect(), "null");
        assert_eq!(Value::string("hello world").inspect(), "hello world");
        assert_eq!(Value::error("identifier not found: x").inspect(), "ERROR: identifier not found: x");
    }

    #[test]
    fn test_inspect_array() {
        let array = Value::array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(array.inspect(), "[1, 2, 3]");
        assert_eq!(Value::array(vec![]).inspect(), "[]");

        let nested = Value::array(vec![Value::array(vec![true.into()]), "a".into(), Value::Null]);
        assert_eq!(nested.inspect(), "[[true], a, null]");
    }

    #[test]
    fn test_inspect_hash() {
        let mut hash = HashObject::default();
        hash.insert("a".into(), Value::Integer(1)).unwrap();
        assert_eq!(Value::hash(hash).inspect(), "{a: 1}");
        assert_eq!(Value::hash(HashObject::default()).inspect(), "{}");
    }

    #[test]
    fn test_inspect_hash_several_pairs_nested() {
        let mut hash = HashObject::default();
        hash.insert("one".into(), Value::Integer(1)).unwrap();
        hash.insert(true.into(), Value::array(vec![Value::Null])).unwrap();
        let outer = Value::array(vec![Value::hash(hash)]);
        assert_eq!(outer.inspect(), "[{one: 1, true: [null]}]");
    }

    #[test]
    fn test_inspect_return_value_shows_inner() {
        let wrapped = Value::ReturnValue(Box::new(Value::Integer(10)));
        assert_eq!(wrapped.inspect(), "10");
        assert_eq!(wrapped.type_of(), Type::ReturnValue);
        assert_eq!(wrapped.unwrap_return(), Value::Integer(10));
    }

    #[test]
    fn test_type_tags_are_distinct() {
        let tags = [
            Type::Integer,
            Type::Boolean,
            Type::Null,
            Type::String,
            Type::Array,
            Type::Hash,
            Type::Function,
            Type::Builtin,
            Type::ReturnValue,
            Type::Error,
        ];
        let names: Vec<_> = tags.iter().map(|t| t.as_str()).unique().collect();
        assert_eq!(names.len(), tags.len());
        assert_eq!(type_of(&Value::string("x")).to_string(), "STRING");
    }

    #[test]
    fn test_arrays_alias_on_clone() {
        let array = Value::array(vec![Value::Integer(1)]);
        let alias = array.clone();
        if let Value::Array(elements) = &alias {
            elements.borrow_mut()[0] = Value::Integer(99);
        }
        assert_eq!(array.inspect(), "[99]");
        assert_eq!(array, alias);
        assert!(array != Value::array(vec![Value::Integer(99)]));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Null.is_truthy());
    }
}
