use std::fmt;
use std::sync::{Arc, Mutex};

use watchrun::logging::Logger;

/// Logger that keeps every line in memory. Debug lines are prefixed with
/// `debug: `.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push(args.to_string());
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push(format!("debug: {args}"));
    }
}
