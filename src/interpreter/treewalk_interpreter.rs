use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::builtins;
use crate::parser::astnode::{BlockStatement, Expr, Program, Stmt};
use crate::stack::ensure_sufficient_stack;
use crate::value::native_function::Callable;
use crate::value::{type_of, Environment, Function, HashObject, Value};

use super::interrupt::Interrupt;
use super::util::{eval_index, eval_infix, eval_prefix};
use super::{Completion, EvalResult, Signal};

pub const DEFAULT_MAX_DEPTH: usize = 10_000;

fn error(message: impl Into<String>) -> Signal {
    Signal::Error(message.into())
}

pub struct Interpreter {
    /// Lines written by `puts`, in order. Left empty when echoing.
    pub output: Vec<String>,
    echo: bool,
    depth: usize,
    max_depth: usize,
    interrupt: Interrupt,
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter {
            output: Vec::new(),
            echo: false,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            interrupt: Interrupt::default(),
        }
    }
}

impl Interpreter {
    pub fn new(max_depth: usize, timeout: Option<Duration>) -> Interpreter {
        Interpreter {
            max_depth,
            interrupt: Interrupt::new(timeout),
            ..Interpreter::default()
        }
    }

    /// Print `puts` output to stdout as it is produced instead of keeping it.
    pub fn with_echo(mut self, echo: bool) -> Interpreter {
        self.echo = echo;
        self
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn write_line(&mut self, line: String) {
        if self.echo {
            println!("{}", line);
        } else {
            self.output.push(line);
        }
    }

    /// Evaluates a whole program in `env`. A top-level `return` ends the
    /// program with its value; a failure becomes an Error value.
    pub fn eval_program(&mut self, program: &Program, env: &Environment) -> Value {
        self.run_program(program, env).into_value()
    }

    /// Like `eval_program`, but also tells how the program ended.
    pub fn run_program(&mut self, program: &Program, env: &Environment) -> Completion {
        self.interrupt.arm();
        self.depth = 0;
        match self.eval_statements(&program.statements, env) {
            Ok(value) => Completion::Finished(value),
            Err(signal) => match Value::from(signal) {
                Value::Error(message) => {
                    debug!(%message, "evaluation failed");
                    Completion::Failed(Value::Error(message))
                }
                returned => Completion::Returned(returned.unwrap_return()),
            },
        }
    }

    fn eval_statements(&mut self, statements: &[Stmt], env: &Environment) -> EvalResult {
        let mut result = Value::Null;
        for stmt in statements {
            result = self.eval_statement(stmt, env)?;
        }
        Ok(result)
    }

    fn eval_block(&mut self, block: &BlockStatement, env: &Environment) -> EvalResult {
        self.check_interrupt()?;
        self.eval_statements(&block.statements, env)
    }

    fn eval_statement(&mut self, stmt: &Stmt, env: &Environment) -> EvalResult {
        match stmt {
            Stmt::Let { name, value } => {
                let value = self.eval_expr(value, env)?;
                env.set(name.as_str(), value);
                Ok(Value::Null)
            }
            Stmt::Return(expr) => {
                let value = self.eval_expr(expr, env)?;
                Err(Signal::Return(value))
            }
            Stmt::Expression(expr) => self.eval_expr(expr, env),
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, env))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, env: &Environment) -> EvalResult {
        match expr {
            Expr::Identifier(name) => self.eval_identifier(name, env),
            Expr::Integer(v) => Ok(Value::Integer(*v)),
            Expr::Boolean(v) => Ok(Value::Boolean(*v)),
            Expr::Str(s) => Ok(Value::string(s.as_str())),
            Expr::Prefix { op, right } => {
                let right = self.eval_expr(right, env)?;
                eval_prefix(*op, right)
            }
            Expr::Infix { left, op, right } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                eval_infix(*op, left, right)
            }
            Expr::If { condition, consequence, alternative } => {
                let condition = self.eval_expr(condition, env)?;
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(Value::Null)
                }
            }
            Expr::Function(literal) => Ok(Value::Function(Rc::new(Function {
                parameters: literal.parameters.clone(),
                body: Rc::clone(&literal.body),
                env: env.clone(),
            }))),
            Expr::Call { function, arguments } => {
                let function = self.eval_expr(function, env)?;
                let args = self.eval_expressions(arguments, env)?;
                self.apply_function(function, args)
            }
            Expr::Array(elements) => Ok(Value::array(self.eval_expressions(elements, env)?)),
            Expr::Index { left, index } => {
                let left = self.eval_expr(left, env)?;
                let index = self.eval_expr(index, env)?;
                eval_index(&left, &index)
            }
            Expr::Hash(pairs) => {
                let mut hash = HashObject::default();
                for (key, value) in pairs {
                    let key = self.eval_expr(key, env)?;
                    if !key.is_hashable() {
                        return Err(error(format!("unusable as hash key: {}", type_of(&key))));
                    }
                    let value = self.eval_expr(value, env)?;
                    hash.insert(key, value).map_err(|err| error(err.to_string()))?;
                }
                Ok(Value::hash(hash))
            }
        }
    }

    fn eval_identifier(&mut self, name: &str, env: &Environment) -> EvalResult {
        env.get(name)
            .or_else(|| builtins::lookup(name).map(Value::Builtin))
            .ok_or_else(|| error(format!("identifier not found: {}", name)))
    }

    /// Evaluates left to right, stopping at the first failure.
    fn eval_expressions(&mut self, exprs: &[Expr], env: &Environment) -> Result<Vec<Value>, Signal> {
        exprs.iter().map(|expr| self.eval_expr(expr, env)).collect()
    }

    fn apply_function(&mut self, function: Value, args: Vec<Value>) -> EvalResult {
        self.check_interrupt()?;
        match function {
            Value::Function(function) => {
                if args.len() != function.arity() {
                    return Err(error(format!(
                        "wrong number of arguments: want={}, got={}",
                        function.arity(),
                        args.len()
                    )));
                }
                if self.depth >= self.max_depth {
                    return Err(error(format!("maximum call depth exceeded ({})", self.max_depth)));
                }

                let env = Environment::new_enclosed(&function.env);
                for (param, arg) in function.parameters.iter().zip(args) {
                    env.set(param.as_str(), arg);
                }

                self.depth += 1;
                trace!(depth = self.depth, scopes = env.depth(), arity = function.arity(), "call");
                let result = self.eval_block(&function.body, &env);
                self.depth -= 1;

                match result {
                    Err(Signal::Return(value)) => Ok(value),
                    other => other,
                }
            }
            Value::Builtin(builtin) => match builtin.call(self, &args) {
                Value::Error(message) => Err(Signal::Error(message)),
                value => Ok(value),
            },
            other => Err(error(format!("not a function: {}", type_of(&other)))),
        }
    }

    fn check_interrupt(&self) -> Result<(), Signal> {
        self.interrupt.check().map_err(|tripped| {
            debug!(?tripped, depth = self.depth, "evaluation stopped");
            Signal::Error(tripped.message())
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::parse;

    fn run(interp: &mut Interpreter, env: &Environment, code: &str) -> Value {
        match parse(code) {
            Ok(program) => interp.eval_program(&program, env),
            Err(errors) => panic!("parse errors in {:?}: {:?}", code, errors),
        }
    }

    fn evaluate(code: &str) -> Value {
        run(&mut Interpreter::default(), &Environment::new(), code)
    }

    fn check_output(code: &str, expected: &str) {
        assert_eq!(evaluate(code).inspect(), expected, "code: {}", code);
    }

    fn check_error(code: &str, expected: &str) {
        match evaluate(code) {
            Value::Error(message) => assert_eq!(message, expected, "code: {}", code),
            other => panic!("expected error for {:?}, got {}", code, other),
        }
    }

    #[test]
    fn test_integer_expressions() {
        let cases = [
            ("5", "5"),
            ("-10", "-10"),
            ("5 + 5 + 5 + 5 - 10", "10"),
            ("2 * (5 + 10)", "30"),
            ("-50 + 100 + -50", "0"),
            ("50 / 2 * 2 + 10", "60"),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", "50"),
            ("7 / 2", "3"),
        ];
        for (code, expected) in cases {
            check_output(code, expected);
        }
    }

    #[test]
    fn test_boolean_expressions() {
        let cases = [
            ("1 < 2", "true"),
            ("1 > 2", "false"),
            ("1 == 1", "true"),
            ("1 != 1", "false"),
            ("true == true", "true"),
            ("true != false", "true"),
            ("(1 < 2) == true", "true"),
            ("!true", "false"),
            ("!5", "false"),
            ("!!5", "true"),
            ("\"a\" == \"a\"", "true"),
        ];
        for (code, expected) in cases {
            check_output(code, expected);
        }
    }

    #[test]
    fn test_if_else() {
        check_output("if (true) { 10 }", "10");
        check_output("if (false) { 10 }", "null");
        check_output("if (1) { 10 }", "10");
        check_output("if (1 > 2) { 10 } else { 20 }", "20");
    }

    #[test]
    fn test_return_statements() {
        check_output("return 10; 9;", "10");
        check_output("9; return 2 * 5; 9;", "10");
        check_output(
            "if (10 > 1) {\n\
               if (10 > 1) {\n\
                 return 10;\n\
               }\n\
               return 1;\n\
             }",
            "10",
        );
        check_output("let f = fn(x) { return x; x + 10; }; f(10);", "10");
        check_output("let f = fn() { if (true) { return 1; } 2 }; f() + f()", "2");
    }

    #[test]
    fn test_error_handling() {
        check_error("5 + true;", "type mismatch: INTEGER + BOOLEAN");
        check_error("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN");
        check_error("-true", "unknown operator: -BOOLEAN");
        check_error("true + false; 5", "unknown operator: BOOLEAN + BOOLEAN");
        check_error("if (10 > 1) { true + false; }", "unknown operator: BOOLEAN + BOOLEAN");
        check_error("foobar", "identifier not found: foobar");
        check_error("\"Hello\" - \"World\"", "unknown operator: STRING - STRING");
        check_error("{\"name\": \"Monkey\"}[fn(x) { x }];", "unusable as hash key: FUNCTION");
        check_error("{[1]: 2}", "unusable as hash key: ARRAY");
        check_error("5()", "not a function: INTEGER");
        check_error("1[0]", "index operator not supported: INTEGER");
        check_error("fn(x) { x }()", "wrong number of arguments: want=1, got=0");
        check_error("len(1, 2)", "wrong number of arguments. got=2, want=1");
        check_error("[1, 2 + true, 3]", "type mismatch: INTEGER + BOOLEAN");
    }

    #[test]
    fn test_error_short_circuits_sequence() {
        let mut interp = Interpreter::default();
        let result = run(&mut interp, &Environment::new(), "puts(1); 1 + true; puts(3);");
        assert_eq!(result, Value::error("type mismatch: INTEGER + BOOLEAN"));
        assert_eq!(interp.output, vec!["1"]);

        let mut interp = Interpreter::default();
        let result = run(&mut interp, &Environment::new(), "[puts(1), -true, puts(3)]");
        assert!(result.is_error());
        assert_eq!(interp.output, vec!["1"]);
    }

    #[test]
    fn test_let_statements() {
        check_output("let a = 5; a;", "5");
        check_output("let a = 5 * 5; a;", "25");
        check_output("let a = 5; let b = a; let c = a + b + 5; c;", "15");
        check_output("let a = 5;", "null");
    }

    #[test]
    fn test_function_value_inspect() {
        check_output("fn(x) { x + 2; };", "fn(x) { (x + 2) }");
        check_output("fn(a, b) { };", "fn(a, b) { }");
        check_output("len", "builtin function");
    }

    #[test]
    fn test_function_application() {
        check_output("let identity = fn(x) { x; }; identity(5);", "5");
        check_output("let double = fn(x) { x * 2; }; double(5);", "10");
        check_output("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", "20");
        check_output("fn(x) { x; }(5)", "5");
    }

    #[test]
    fn test_closures() {
        check_output(
            "let newAdder = fn(x) { fn(y) { x + y }; };\n\
             let addTwo = newAdder(2);\n\
             addTwo(3);",
            "5",
        );
    }

    #[test]
    fn test_closure_sees_later_bindings() {
        check_output("let f = fn() { late }; let late = 10; f()", "10");

        let env = Environment::new();
        let mut interp = Interpreter::default();
        run(&mut interp, &env, "let f = fn() { x };");
        env.set("x", Value::Integer(1));
        assert_eq!(run(&mut interp, &env, "f()"), Value::Integer(1));
        env.set("x", Value::Integer(2));
        assert_eq!(run(&mut interp, &env, "f()"), Value::Integer(2));
    }

    #[test]
    fn test_let_inside_function_shadows() {
        check_output("let x = 1; let f = fn() { let x = 2; x }; f(); x", "1");
        check_output("let x = 1; let f = fn(x) { x }; f(5) + x", "6");
    }

    #[test]
    fn test_call_uses_defining_scope() {
        check_output(
            "let x = \"global\";\n\
             let show = fn() { x };\n\
             let wrapper = fn(x) { show() };\n\
             wrapper(\"local\")",
            "global",
        );
    }

    #[test]
    fn test_recursive_closure() {
        check_output(
            "let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } };\n\
             fib(15)",
            "610",
        );
        check_output(
            "let outer = fn() {\n\
               let countdown = fn(n) { if (n == 0) { 0 } else { countdown(n - 1) } };\n\
               countdown(20)\n\
             };\n\
             outer()",
            "0",
        );
    }

    #[test]
    fn test_deep_recursion() {
        check_output(
            "let count = fn(n) { if (n == 0) { 0 } else { 1 + count(n - 1) } }; count(2000)",
            "2000",
        );
    }

    #[test]
    fn test_max_depth() {
        let mut interp = Interpreter::new(20, None);
        let result = run(&mut interp, &Environment::new(), "let f = fn() { f() }; f()");
        assert_eq!(result, Value::error("maximum call depth exceeded (20)"));
        assert_eq!(run(&mut interp, &Environment::new(), "let g = fn(n) { n }; g(1)"), Value::Integer(1));
    }

    #[test]
    fn test_interrupt_stops_evaluation() {
        let mut interp = Interpreter::new(DEFAULT_MAX_DEPTH, Some(Duration::ZERO));
        let result = run(&mut interp, &Environment::new(), "let f = fn(n) { n }; f(1)");
        assert_eq!(result, Value::error("evaluation timed out after 0ms"));
        assert_eq!(run(&mut interp, &Environment::new(), "1 + 1"), Value::Integer(2));
    }

    #[test]
    fn test_strings() {
        check_output("\"Hello World!\"", "Hello World!");
        check_output("\"Hello\" + \" \" + \"World!\"", "Hello World!");
        check_output("len(\"hello\" + \"!\")", "6");
    }

    #[test]
    fn test_arrays() {
        check_output("[1, 2 * 2, 3 + 3]", "[1, 4, 6]");
        check_output("[1, 2, 3][0]", "1");
        check_output("let i = 0; [1][i];", "1");
        check_output("[1, 2, 3][1 + 1];", "3");
        check_output("let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];", "6");
        check_output("[1, 2, 3][3]", "null");
        check_output("[1, 2, 3][-1]", "null");
    }

    #[test]
    fn test_array_builtins() {
        check_output("let a = [1, 2, 3]; push(a, 4); a", "[1, 2, 3]");
        check_output("push([], 1)", "[1]");
        check_output("rest(rest([1, 2, 3]))", "[3]");
        check_output("first([\"a\", 1])", "a");
        check_output("last([])", "null");
        check_output(
            "let map = fn(arr, f) {\n\
               let iter = fn(arr, acc) {\n\
                 if (len(arr) == 0) { acc } else { iter(rest(arr), push(acc, f(first(arr)))) }\n\
               };\n\
               iter(arr, [])\n\
             };\n\
             map([1, 2, 3], fn(x) { x * 2 })",
            "[2, 4, 6]",
        );
    }

    #[test]
    fn test_hash_literals() {
        check_output("{\"a\": 1}", "{a: 1}");
        check_output(
            "let two = \"two\";\n\
             {\"one\": 10 - 9, two: 1 + 1, \"thr\" + \"ee\": 6 / 2, 4: 4, true: 5, false: 6}",
            "{one: 1, two: 2, three: 3, 4: 4, true: 5, false: 6}",
        );
    }

    #[test]
    fn test_hash_index() {
        check_output("{\"foo\": 5}[\"foo\"]", "5");
        check_output("{\"foo\": 5}[\"bar\"]", "null");
        check_output("let key = \"foo\"; {\"foo\": 5}[key]", "5");
        check_output("{}[\"foo\"]", "null");
        check_output("{5: 5}[5]", "5");
        check_output("{true: 5}[true]", "5");
        check_output("let k = \"f\" + \"oo\"; {\"foo\": 1}[k]", "1");
    }

    #[test]
    fn test_puts_output() {
        let mut interp = Interpreter::default();
        let result = run(&mut interp, &Environment::new(), "puts(\"hi\", [1], {1: true})");
        assert_eq!(result, Value::Null);
        assert_eq!(interp.output, vec!["hi", "[1]", "{1: true}"]);
    }

    #[test]
    fn test_unhashable_key_skips_value() {
        let mut interp = Interpreter::default();
        let result = run(&mut interp, &Environment::new(), "{[1]: puts(\"value\")}");
        assert_eq!(result, Value::error("unusable as hash key: ARRAY"));
        assert!(interp.output.is_empty());
    }

    #[test]
    fn test_echo_does_not_retain_output() {
        let mut interp = Interpreter::default().with_echo(true);
        let env = Environment::new();
        run(&mut interp, &env, "let f = fn(n) { if (n > 0) { puts(n); f(n - 1) } }; f(50);");
        run(&mut interp, &env, "f(50)");
        assert!(interp.output.is_empty());
    }

    #[test]
    fn test_run_program_reports_completion() {
        let mut interp = Interpreter::default();
        let env = Environment::new();
        let program = parse("return 5; let x = 1;").unwrap();
        assert_eq!(interp.run_program(&program, &env), Completion::Returned(Value::Integer(5)));
        assert_eq!(env.get("x"), None);

        let program = parse("let y = 2; y * 3").unwrap();
        assert_eq!(interp.run_program(&program, &env), Completion::Finished(Value::Integer(6)));

        let program = parse("-true; 1").unwrap();
        assert_eq!(
            interp.run_program(&program, &env),
            Completion::Failed(Value::error("unknown operator: -BOOLEAN"))
        );
    }

    #[test]
    fn test_builtin_can_be_shadowed() {
        check_output("let len = fn(x) { 42 }; len(\"abc\")", "42");
    }
}
