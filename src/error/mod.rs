pub mod error_formatting;
pub mod parser_error;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use parser_error::ParseError;

/// Failures of the host driver. Language-level failures are `Value::Error`
/// and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),
    #[error("program failed: {0}")]
    Runtime(String),
    #[error("could not install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("could not serialize syntax tree: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line editor failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
