use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use super::values::Value;

struct Frame {
    store: HashMap<String, Value>,
    outer: Option<Environment>,
}

/// A shared handle to one scope frame.
///
/// Cloning the handle does not copy the bindings: a closure holding a clone
/// sees every later `set` made through any other handle to the same frame.
/// The enclosing frame is fixed at construction, so chains never cycle.
///
/// A function bound in the frame it captured forms an `Rc` cycle; that frame
/// lives until the process exits.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    pub fn new() -> Environment {
        Environment(Rc::new(RefCell::new(Frame {
            store: HashMap::new(),
            outer: None,
        })))
    }

    pub fn new_enclosed(outer: &Environment) -> Environment {
        Environment(Rc::new(RefCell::new(Frame {
            store: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    /// Resolves `name` in this frame, then outward through enclosing frames.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut env = self.clone();
        loop {
            let outer = {
                let frame = env.0.borrow();
                if let Some(val) = frame.store.get(name) {
                    return Some(val.clone());
                }
                frame.outer.clone()?
            };
            env = outer;
        }
    }

    /// Binds `name` in this frame only, shadowing any outer binding.
    pub fn set(&self, name: impl Into<String>, val: Value) -> Value {
        self.0.borrow_mut().store.insert(name.into(), val.clone());
        val
    }

    pub fn outer(&self) -> Option<Environment> {
        self.0.borrow().outer.clone()
    }

    /// Number of frames from this one to the root, counting both.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut env = self.outer();
        while let Some(outer) = env {
            depth += 1;
            env = outer.outer();
        }
        depth
    }

    #[cfg(test)]
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new()
    }
}

// Frames can reach themselves through captured closures, so only names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0.borrow();
        write!(
            f,
            "Environment {{ names: [{}], depth: {} }}",
            frame.store.keys().sorted().join(", "),
            self.depth()
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_get_unbound_name() {
        let env = Environment::new();
        assert_eq!(env.get("x"), None);
        let inner = Environment::new_enclosed(&env);
        assert_eq!(inner.get("x"), None);
    }

    #[test]
    fn test_enclosed_sees_outer_binding() {
        let env = Environment::new();
        env.set("x", Value::Integer(5));
        let inner = Environment::new_enclosed(&env);
        assert_eq!(inner.get("x"), Some(Value::Integer(5)));
    }

    #[test]
    fn test_set_shadows_instead_of_mutating() {
        let outer = Environment::new();
        outer.set("x", Value::Integer(1));
        let inner = Environment::new_enclosed(&outer);
        inner.set("x", Value::Integer(2));

        assert_eq!(outer.get("x"), Some(Value::Integer(1)));
        assert_eq!(inner.get("x"), Some(Value::Integer(2)));
    }

    #[test]
    fn test_lookup_falls_through_to_outer() {
        let outer = Environment::new();
        outer.set("y", Value::string("outer"));
        let inner = Environment::new_enclosed(&outer);
        inner.set("x", Value::Integer(2));
        assert_eq!(inner.get("y"), Some(Value::string("outer")));
    }

    #[test]
    fn test_set_returns_stored_value() {
        let env = Environment::new();
        assert_eq!(env.set("answer", Value::Integer(42)), Value::Integer(42));
    }

    #[test]
    fn test_deep_chain_lookup() {
        let root = Environment::new();
        root.set("base", Value::Boolean(true));
        let mut env = root.clone();
        for _ in 0..1_000 {
            env = Environment::new_enclosed(&env);
        }
        assert_eq!(env.depth(), 1_001);
        assert_eq!(env.get("base"), Some(Value::Boolean(true)));
    }

    #[test]
    fn test_clones_share_frame() {
        let env = Environment::new();
        let captured = env.clone();
        env.set("late", Value::Integer(7));
        assert!(captured.ptr_eq(&env));
        assert_eq!(captured.get("late"), Some(Value::Integer(7)));
    }

    #[test]
    fn test_outer_is_fixed_at_construction() {
        let outer = Environment::new();
        let inner = Environment::new_enclosed(&outer);
        assert!(inner.outer().is_some_and(|env| env.ptr_eq(&outer)));
        assert!(outer.outer().is_none());
    }
}
