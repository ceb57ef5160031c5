use std::rc::Rc;

use tracing::trace;

use super::astnode::{BlockStatement, Expr, FunctionLiteral, InfixOp, PrefixOp, Program, Stmt};
use super::scanner::{Scanner, Token, TokenType};
use crate::error::parser_error::ParseError;
use crate::stack::ensure_sufficient_stack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(ty: TokenType) -> Precedence {
    match ty {
        TokenType::Eq | TokenType::NotEq => Precedence::Equals,
        TokenType::Lt | TokenType::Gt => Precedence::LessGreater,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Asterisk | TokenType::Slash => Precedence::Product,
        TokenType::LParen => Precedence::Call,
        TokenType::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn infix_op(ty: TokenType) -> Option<InfixOp> {
    match ty {
        TokenType::Plus => Some(InfixOp::Plus),
        TokenType::Minus => Some(InfixOp::Minus),
        TokenType::Asterisk => Some(InfixOp::Asterisk),
        TokenType::Slash => Some(InfixOp::Slash),
        TokenType::Lt => Some(InfixOp::Lt),
        TokenType::Gt => Some(InfixOp::Gt),
        TokenType::Eq => Some(InfixOp::Eq),
        TokenType::NotEq => Some(InfixOp::NotEq),
        _ => None,
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Pratt parser. Keeps going after an error so that every problem in the
/// input is reported at once.
pub struct Parser {
    scanner: Scanner,
    cur: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(mut scanner: Scanner) -> Parser {
        let cur = scanner.next_token();
        let peek = scanner.next_token();
        Parser {
            scanner,
            cur,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    fn next_token(&mut self) {
        let next = self.scanner.next_token();
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    fn cur_is(&self, ty: TokenType) -> bool {
        self.cur.ty == ty
    }

    fn peek_is(&self, ty: TokenType) -> bool {
        self.peek.ty == ty
    }

    fn expect_peek(&mut self, expected: TokenType) -> ParseResult<()> {
        if self.peek_is(expected) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::TokenMismatch {
                expected,
                found: self.peek.clone(),
            })
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur_is(TokenType::Eof) {
            match self.parse_statement() {
                Ok(stmt) => program.statements.push(stmt),
                Err(err) => {
                    trace!(%err, "parse error");
                    self.errors.push(err);
                    self.synchronize();
                }
            }
            self.next_token();
        }
        program
    }

    /// Skips ahead to the end of the current statement.
    fn synchronize(&mut self) {
        while !self.cur_is(TokenType::Semicolon) && !self.cur_is(TokenType::Eof) {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.cur.ty {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek_is(TokenType::Semicolon) {
            self.next_token();
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Stmt> {
        self.expect_peek(TokenType::Ident)?;
        let name = self.cur.literal.clone();
        self.expect_peek(TokenType::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(Stmt::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(Stmt::Return(value))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(Stmt::Expression(expr))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| self.parse_expression_inner(precedence))
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenType::Semicolon) && precedence < precedence_of(self.peek.ty) {
            self.next_token();
            left = match self.cur.ty {
                TokenType::LParen => self.parse_call(left)?,
                TokenType::LBracket => self.parse_index(left)?,
                _ => self.parse_infix(left)?,
            };
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        match self.cur.ty {
            TokenType::Ident => Ok(Expr::Identifier(self.cur.literal.clone())),
            TokenType::Int => self
                .cur
                .literal
                .parse()
                .map(Expr::Integer)
                .map_err(|_| ParseError::InvalidInteger { found: self.cur.clone() }),
            TokenType::String => Ok(Expr::Str(self.cur.literal.clone())),
            TokenType::True => Ok(Expr::Boolean(true)),
            TokenType::False => Ok(Expr::Boolean(false)),
            TokenType::Bang => self.parse_prefix_op(PrefixOp::Bang),
            TokenType::Minus => self.parse_prefix_op(PrefixOp::Minus),
            TokenType::LParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenType::RParen)?;
                Ok(expr)
            }
            TokenType::If => self.parse_if(),
            TokenType::Function => self.parse_function_literal(),
            TokenType::LBracket => {
                let elements = self.parse_expression_list(TokenType::RBracket)?;
                Ok(Expr::Array(elements))
            }
            TokenType::LBrace => self.parse_hash_literal(),
            TokenType::Illegal => Err(ParseError::IllegalToken { found: self.cur.clone() }),
            _ => Err(ParseError::NoPrefixParse { found: self.cur.clone() }),
        }
    }

    fn parse_prefix_op(&mut self, op: PrefixOp) -> ParseResult<Expr> {
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::Prefix { op, right: Box::new(right) })
    }

    fn parse_infix(&mut self, left: Expr) -> ParseResult<Expr> {
        let op = match infix_op(self.cur.ty) {
            Some(op) => op,
            None => return Err(ParseError::NoPrefixParse { found: self.cur.clone() }),
        };
        let precedence = precedence_of(self.cur.ty);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Ok(Expr::Infix {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_call(&mut self, function: Expr) -> ParseResult<Expr> {
        let arguments = self.parse_expression_list(TokenType::RParen)?;
        Ok(Expr::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index(&mut self, left: Expr) -> ParseResult<Expr> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RBracket)?;
        Ok(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_expression_list(&mut self, end: TokenType) -> ParseResult<Vec<Expr>> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Ok(list)
    }

    fn parse_hash_literal(&mut self) -> ParseResult<Expr> {
        let mut pairs = Vec::new();
        while !self.peek_is(TokenType::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenType::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(TokenType::RBrace) {
                self.expect_peek(TokenType::Comma)?;
            }
        }
        self.expect_peek(TokenType::RBrace)?;
        Ok(Expr::Hash(pairs))
    }

    fn parse_if(&mut self) -> ParseResult<Expr> {
        self.expect_peek(TokenType::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RParen)?;
        self.expect_peek(TokenType::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_is(TokenType::Else) {
            self.next_token();
            self.expect_peek(TokenType::LBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parses statements up to the closing brace; `cur` must be the opening brace.
    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        let mut block = BlockStatement::default();
        self.next_token();
        while !self.cur_is(TokenType::RBrace) {
            if self.cur_is(TokenType::Eof) {
                return Err(ParseError::TokenMismatch {
                    expected: TokenType::RBrace,
                    found: self.cur.clone(),
                });
            }
            block.statements.push(self.parse_statement()?);
            self.next_token();
        }
        Ok(block)
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expr> {
        self.expect_peek(TokenType::LParen)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block_statement()?;
        Ok(Expr::Function(FunctionLiteral {
            parameters,
            body: Rc::new(body),
        }))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenType::RParen) {
            self.next_token();
            return Ok(parameters);
        }

        self.expect_peek(TokenType::Ident)?;
        parameters.push(self.cur.literal.clone());
        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.expect_peek(TokenType::Ident)?;
            parameters.push(self.cur.literal.clone());
        }
        self.expect_peek(TokenType::RParen)?;
        Ok(parameters)
    }
}

/// Parses `input`, returning either the whole program or every error found.
pub fn parse(input: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(Scanner::new(input));
    let program = parser.parse_program();
    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.into_errors())
    }
}
