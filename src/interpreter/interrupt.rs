//! Cancellation for a running evaluation.
//!
//! A Ctrl-C handler raises the shared flag; a deadline, if one is armed,
//! bounds the wall-clock time of a single evaluation. The evaluator polls
//! both at every block and call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tripped {
    Interrupted,
    TimedOut(Duration),
}

impl Tripped {
    pub fn message(self) -> String {
        match self {
            Tripped::Interrupted => "evaluation interrupted".to_string(),
            Tripped::TimedOut(limit) => {
                format!("evaluation timed out after {}ms", limit.as_millis())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl Interrupt {
    pub fn new(timeout: Option<Duration>) -> Interrupt {
        Interrupt {
            timeout,
            ..Interrupt::default()
        }
    }

    /// Trips this interrupt and every clone of it. Safe to call from a signal handler.
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clears a pending interrupt and starts a fresh deadline.
    pub fn arm(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.deadline = self.timeout.map(|timeout| Instant::now() + timeout);
    }

    pub fn check(&self) -> Result<(), Tripped> {
        if self.flag.load(Ordering::SeqCst) {
            return Err(Tripped::Interrupted);
        }
        match (self.deadline, self.timeout) {
            (Some(deadline), Some(timeout)) if Instant::now() >= deadline => {
                Err(Tripped::TimedOut(timeout))
            }
            _ => Ok(()),
        }
    }
}
