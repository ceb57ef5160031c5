use tracing::{debug, info};

use crate::config::Config;
use crate::error::error_formatting::{format_parse_errors, format_value, Source};
use crate::error::parser_error::ParseError;
use crate::interpreter::{Completion, Interpreter};
use crate::line_reader::{LineReadStatus, LineReader};
use crate::parser::{astnode::Stmt, parse};
use crate::value::{Environment, Value};

/// One interpreter and one root environment, shared by every line evaluated.
pub struct Session {
    pub interpreter: Interpreter,
    pub env: Environment,
}

impl Session {
    pub fn new(interpreter: Interpreter) -> Session {
        Session {
            interpreter,
            env: Environment::new(),
        }
    }

    /// Parses and evaluates `source`. Yields `None` when there is nothing to
    /// show: the input was empty, or ran to completion ending in a `let`.
    pub fn eval_source(&mut self, source: &str) -> Result<Option<Value>, Vec<ParseError>> {
        let program = parse(source)?;
        match self.interpreter.run_program(&program, &self.env) {
            Completion::Finished(_)
                if matches!(program.statements.last(), None | Some(Stmt::Let { .. })) =>
            {
                Ok(None)
            }
            completion => Ok(Some(completion.into_value())),
        }
    }
}

pub fn start(config: &Config, session: &mut Session) -> rustyline::Result<()> {
    let mut reader = LineReader::new(&config.history, &config.prompt)?;
    info!(history = %config.history.display(), "session started");

    loop {
        let line = match reader.readline()? {
            LineReadStatus::Line(line) => line,
            LineReadStatus::Done => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        match session.eval_source(&line) {
            Ok(Some(value)) => println!("{}", format_value(&value)),
            Ok(None) => {}
            Err(errors) => {
                debug!(count = errors.len(), "skipping line with parse errors");
                eprint!("{}", format_parse_errors(&errors, &line, &Source::Repl));
            }
        }
    }
    Ok(())
}
