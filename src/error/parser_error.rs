use thiserror::Error;

use crate::parser::scanner::{Token, TokenType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {} instead", found.ty)]
    TokenMismatch { expected: TokenType, found: Token },
    #[error("no prefix parse function for {} found", found.ty)]
    NoPrefixParse { found: Token },
    #[error("illegal token '{}'", found.literal)]
    IllegalToken { found: Token },
    #[error("could not parse {} as integer", found.literal)]
    InvalidInteger { found: Token },
}

impl ParseError {
    pub fn token(&self) -> &Token {
        match self {
            ParseError::TokenMismatch { found, .. }
            | ParseError::NoPrefixParse { found }
            | ParseError::IllegalToken { found }
            | ParseError::InvalidInteger { found } => found,
        }
    }

    pub fn line(&self) -> usize {
        self.token().line
    }

    pub fn col(&self) -> usize {
        self.token().col
    }
}
