use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::interpreter::treewalk_interpreter::DEFAULT_MAX_DEPTH;

/// The Monkey programming language.
#[derive(Parser, Debug)]
#[command(name = "monkey", version, about)]
pub struct Config {
    /// Script to run. Starts the interactive shell when omitted.
    pub file: Option<PathBuf>,

    /// Evaluate CODE and print the result.
    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    pub eval: Option<String>,

    /// Print the parsed program as JSON instead of running it.
    #[arg(long)]
    pub dump_ast: bool,

    /// Shell history file.
    #[arg(long, env = "MONKEY_HISTORY", default_value = ".monkey_history")]
    pub history: PathBuf,

    #[arg(long, default_value = ">> ")]
    pub prompt: String,

    /// Abort any single evaluation that runs longer than this.
    #[arg(long, env = "MONKEY_TIMEOUT_MS", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum nesting of function calls.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    #[arg(long)]
    pub no_color: bool,

    /// More logging; repeat for more detail. `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
