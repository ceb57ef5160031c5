use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BlockStatement {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Serialize)]
pub enum Stmt {
    Let { name: String, value: Expr },
    Return(Expr),
    Expression(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixOp {
    Bang,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfixOp {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,
}

/// Parameter names plus a shared body; function values hold the same `Rc`.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionLiteral {
    pub parameters: Vec<String>,
    pub body: Rc<BlockStatement>,
}

#[derive(Debug, Clone, Serialize)]
pub enum Expr {
    Identifier(String),
    Integer(i64),
    Boolean(bool),
    Str(String),
    Prefix {
        op: PrefixOp,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function(FunctionLiteral),
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    Hash(Vec<(Expr, Expr)>),
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Bang => f.write_str("!"),
            PrefixOp::Minus => f.write_str("-"),
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfixOp::Plus => "+",
            InfixOp::Minus => "-",
            InfixOp::Asterisk => "*",
            InfixOp::Slash => "/",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.iter().join(" "))
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{ }");
        }
        write!(f, "{{ {} }}", self.statements.iter().join(" "))
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name, value),
            Stmt::Return(value) => write!(f, "return {};", value),
            Stmt::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {}", self.parameters.iter().join(", "), self.body)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(name) => f.write_str(name),
            Expr::Integer(v) => write!(f, "{}", v),
            Expr::Boolean(v) => write!(f, "{}", v),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Prefix { op, right } => write!(f, "({}{})", op, right),
            Expr::Infix { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::If { condition, consequence, alternative } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Expr::Function(literal) => write!(f, "{}", literal),
            Expr::Call { function, arguments } => {
                write!(f, "{}({})", function, arguments.iter().join(", "))
            }
            Expr::Array(elements) => write!(f, "[{}]", elements.iter().join(", ")),
            Expr::Index { left, index } => write!(f, "({}[{}])", left, index),
            Expr::Hash(pairs) => {
                let pairs = pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ");
                write!(f, "{{{}}}", pairs)
            }
        }
    }
}
