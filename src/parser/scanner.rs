use std::fmt;

use serde::Serialize;

#[derive(Eq, PartialEq, Debug, Copy, Clone, Serialize)]
pub enum TokenType {
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,

    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
            TokenType::Ident => "IDENT",
            TokenType::Int => "INT",
            TokenType::String => "STRING",
            TokenType::Assign => "=",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Bang => "!",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",
            TokenType::Lt => "<",
            TokenType::Gt => ">",
            TokenType::Eq => "==",
            TokenType::NotEq => "!=",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::Colon => ":",
            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::LBrace => "{",
            TokenType::RBrace => "}",
            TokenType::LBracket => "[",
            TokenType::RBracket => "]",
            TokenType::Function => "FUNCTION",
            TokenType::Let => "LET",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::Return => "RETURN",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub ty: TokenType,
    pub literal: String,
    pub line: usize,
    pub col: usize,
}

fn keyword(ident: &str) -> Option<TokenType> {
    match ident {
        "fn" => Some(TokenType::Function),
        "let" => Some(TokenType::Let),
        "true" => Some(TokenType::True),
        "false" => Some(TokenType::False),
        "if" => Some(TokenType::If),
        "else" => Some(TokenType::Else),
        "return" => Some(TokenType::Return),
        _ => None,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Turns source text into tokens. Never fails: unknown characters become
/// `Illegal` tokens for the parser to report.
pub struct Scanner {
    source: Vec<char>,
    current: usize,
    line: usize,
    col: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Scanner {
        Scanner {
            source: input.chars().collect(),
            current: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            text.push(c);
            self.advance();
        }
        text
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let (line, col) = (self.line, self.col);
        let token = |ty: TokenType, literal: String| Token { ty, literal, line, col };

        let c = match self.peek() {
            Some(c) => c,
            None => return token(TokenType::Eof, String::new()),
        };

        if is_ident_char(c) {
            let ident = self.take_while(is_ident_char);
            let ty = keyword(&ident).unwrap_or(TokenType::Ident);
            return token(ty, ident);
        }
        if c.is_ascii_digit() {
            return token(TokenType::Int, self.take_while(|c| c.is_ascii_digit()));
        }
        if c == '"' {
            self.advance();
            let text = self.take_while(|c| c != '"');
            self.advance();
            return token(TokenType::String, text);
        }

        let two_char = match (c, self.peek_next()) {
            ('=', Some('=')) => Some(TokenType::Eq),
            ('!', Some('=')) => Some(TokenType::NotEq),
            _ => None,
        };
        if let Some(ty) = two_char {
            let mut literal = String::new();
            literal.extend(self.advance());
            literal.extend(self.advance());
            return token(ty, literal);
        }

        self.advance();
        let ty = match c {
            '=' => TokenType::Assign,
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '!' => TokenType::Bang,
            '*' => TokenType::Asterisk,
            '/' => TokenType::Slash,
            '<' => TokenType::Lt,
            '>' => TokenType::Gt,
            ',' => TokenType::Comma,
            ';' => TokenType::Semicolon,
            ':' => TokenType::Colon,
            '(' => TokenType::LParen,
            ')' => TokenType::RParen,
            '{' => TokenType::LBrace,
            '}' => TokenType::RBrace,
            '[' => TokenType::LBracket,
            ']' => TokenType::RBracket,
            _ => TokenType::Illegal,
        };
        token(ty, c.to_string())
    }
}

impl Iterator for Scanner {
    type Item = Token;

    /// Yields every token up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        Some(self.next_token()).filter(|tok| tok.ty != TokenType::Eof)
    }
}
