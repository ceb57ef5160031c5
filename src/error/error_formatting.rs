use colored::*;

use super::parser_error::ParseError;
use crate::value::{Type, Value};

/// Where the text being reported on came from.
pub enum Source<'a> {
    Repl,
    Literal,
    File(&'a str),
}

impl Source<'_> {
    fn describe(&self) -> &str {
        match self {
            Source::Repl => "<repl>",
            Source::Literal => "<command-line input>",
            Source::File(filename) => filename,
        }
    }
}

fn format_input(content: &str, source: &Source, line: usize, col: usize) -> String {
    let mut out = format!("in {}, at line {}, column {}:\n", source.describe(), line, col);
    if let Some(text) = content.lines().nth(line.saturating_sub(1)) {
        out.push_str(text);
        out.push('\n');
        out.push_str(&format!("{:~<1$}", "", col.saturating_sub(1)).blue().bold().to_string());
        out.push_str(&"^".blue().bold().to_string());
        out.push('\n');
    }
    out
}

pub fn format_parse_error(err: &ParseError, content: &str, source: &Source) -> String {
    format!(
        "{}: {}\n{}",
        "parse error".red().bold(),
        err.to_string().white().bold(),
        format_input(content, source, err.line(), err.col())
    )
}

pub fn format_parse_errors(errors: &[ParseError], content: &str, source: &Source) -> String {
    errors
        .iter()
        .map(|err| format_parse_error(err, content, source))
        .collect()
}

/// Renders an evaluation result; only the type tag decides the styling.
pub fn format_value(value: &Value) -> String {
    match value.type_of() {
        Type::Error => value.inspect().red().bold().to_string(),
        _ => value.inspect(),
    }
}
