mod builtins;
mod config;
mod error;
mod interpreter;
mod line_reader;
mod parser;
mod repl;
mod stack;
mod value;

use std::fs;
use std::process::ExitCode;

use clap::Parser as _;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::error_formatting::{format_parse_errors, format_value, Source};
use error::Error;
use interpreter::Interpreter;
use repl::Session;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::builder()
        .with_default_directive(config.log_level().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parses and runs one whole program, printing diagnostics for failures.
fn run_source(
    session: &mut Session,
    config: &Config,
    content: &str,
    source: &Source,
    show_result: bool,
) -> Result<(), Error> {
    if config.dump_ast {
        let program = parser::parse(content).map_err(|errors| {
            eprint!("{}", format_parse_errors(&errors, content, source));
            Error::Parse(errors)
        })?;
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    match session.eval_source(content) {
        Err(errors) => {
            eprint!("{}", format_parse_errors(&errors, content, source));
            Err(Error::Parse(errors))
        }
        Ok(Some(value)) if value.is_error() => {
            eprintln!("{}", format_value(&value));
            Err(Error::Runtime(value.inspect()))
        }
        Ok(Some(value)) if show_result => {
            println!("{}", format_value(&value));
            Ok(())
        }
        Ok(_) => Ok(()),
    }
}

fn run(config: Config) -> Result<(), Error> {
    let interpreter = Interpreter::new(config.max_depth, config.timeout()).with_echo(true);
    let interrupt = interpreter.interrupt().clone();
    ctrlc::set_handler(move || interrupt.raise())?;
    let mut session = Session::new(interpreter);

    if let Some(code) = &config.eval {
        return run_source(&mut session, &config, code, &Source::Literal, true);
    }

    if let Some(path) = &config.file {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "running script");
        let name = path.to_string_lossy();
        return run_source(&mut session, &config, &content, &Source::File(&name), false);
    }

    repl::start(&config, &mut session)?;
    Ok(())
}

fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(&config);
    if config.no_color {
        colored::control::set_override(false);
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported to the user with source context.
        Err(Error::Parse(_) | Error::Runtime(_)) => ExitCode::FAILURE,
        Err(err) => {
            debug!(?err, "aborting");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
