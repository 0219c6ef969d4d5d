// src/exec/print.rs

use std::future;

use crate::errors::WatchError;
use crate::exec::backend::{ExecFuture, Executor};
use crate::exec::output::OutputSink;
use crate::watch::NotificationEvent;

/// Prints the triggering path instead of running a command.
///
/// Writing is synchronous, so this executor is never busy.
#[derive(Debug, Clone)]
pub struct PrintExecutor {
    output: OutputSink,
}

impl PrintExecutor {
    pub fn new(output: OutputSink) -> Self {
        Self { output }
    }
}

impl Executor for PrintExecutor {
    fn running(&self) -> bool {
        false
    }

    fn exec(&self, _event: &NotificationEvent, path: &str) -> ExecFuture {
        let result = self.output.write_line(path).map_err(WatchError::from);
        Box::pin(future::ready(result))
    }
}
