//! Failure presentation
//!
//! The core only produces classified [`HandoffError`]s. How a person gets to
//! see them is up to a [`FailureReporter`]; the binary ships one that writes
//! to stderr.

use crate::error::{FailureClass, HandoffError};
use std::io::Write;
use std::sync::Mutex;

/// Short, user-facing headline for a failure class
pub fn headline(class: FailureClass, port: u16) -> String {
    match class {
        FailureClass::Bind => format!("Can't listen on port {} (TCP)", port),
        FailureClass::Connection => "Can't connect to server".to_string(),
        FailureClass::Call
        | FailureClass::Copy
        | FailureClass::Removal
        | FailureClass::Protocol
        | FailureClass::Io => "Error sending the path".to_string(),
        FailureClass::Usage => "Must be called with one argument".to_string(),
    }
}

/// Something that can put a failure in front of a person
pub trait FailureReporter: Send + Sync {
    fn report(&self, title: &str, error: &HandoffError);
}

/// Writes `program: title (detail)` lines to stderr
pub struct StderrReporter {
    program: String,
}

impl StderrReporter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl FailureReporter for StderrReporter {
    fn report(&self, title: &str, error: &HandoffError) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}: {} ({})", self.program, title, error);
    }
}

/// Keeps reports in memory; handy when embedding the core
#[derive(Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(String, FailureClass)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports seen so far, as (title, class)
    pub fn reports(&self) -> Vec<(String, FailureClass)> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, title: &str, error: &HandoffError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((title.to_string(), error.class()));
        }
    }
}
