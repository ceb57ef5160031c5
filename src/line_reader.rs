use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use tracing::{debug, warn};

pub struct LineReader {
    rl: Editor<(), FileHistory>,
    history_file: PathBuf,
    prompt: String,
}

impl Drop for LineReader {
    fn drop(&mut self) {
        if let Err(err) = self.rl.save_history(&self.history_file) {
            warn!(%err, path = %self.history_file.display(), "could not save history");
        }
    }
}

pub enum LineReadStatus {
    Line(String),
    Done,
}

impl LineReader {
    pub fn new(history_file: &Path, prompt: &str) -> rustyline::Result<LineReader> {
        let mut rl = Editor::<(), FileHistory>::new()?;
        if let Err(err) = rl.load_history(history_file) {
            debug!(%err, path = %history_file.display(), "no history loaded");
        }
        Ok(LineReader {
            rl,
            history_file: history_file.into(),
            prompt: prompt.into(),
        })
    }

    /// Reads one line. End of input and Ctrl-C at the prompt end the session;
    /// any other editor failure is returned.
    pub fn readline(&mut self) -> rustyline::Result<LineReadStatus> {
        let status = classify(self.rl.readline(&self.prompt))?;
        if let LineReadStatus::Line(line) = &status {
            if let Err(err) = self.rl.add_history_entry(line.as_str()) {
                debug!(%err, "line not added to history");
            }
        }
        Ok(status)
    }
}

fn classify(read: rustyline::Result<String>) -> rustyline::Result<LineReadStatus> {
    match read {
        Ok(line) => Ok(LineReadStatus::Line(line)),
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(LineReadStatus::Done),
        Err(err) => {
            warn!(%err, "could not read line");
            Err(err)
        }
    }
}
