use std::sync::{Arc, Mutex};
use std::time::Duration;

use watchrun::errors::WatchError;
use watchrun::exec::{ExecFuture, Executor, RunningFlag, RunningGuard};
use watchrun::watch::{Notification, NotificationEvent};

/// One recorded call to [`Executor::exec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub path: String,
    pub notification: Notification,
}

/// A fake executor that:
/// - records every event it was asked to run, at the moment `exec` is called
/// - stays "running" for a configurable (tokio) duration
/// - optionally fails every execution.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    executed: Arc<Mutex<Vec<Execution>>>,
    running: RunningFlag,
    busy_for: Duration,
    fail: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each execution keeps the executor busy for `busy_for`.
    pub fn with_busy(mut self, busy_for: Duration) -> Self {
        self.busy_for = busy_for;
        self
    }

    /// Every execution resolves to an error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Mark the executor busy until the guard is dropped.
    pub fn hold_running(&self) -> RunningGuard {
        self.running.start()
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.executed.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.executions().into_iter().map(|e| e.path).collect()
    }

    pub fn count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }
}

impl Executor for RecordingExecutor {
    fn running(&self) -> bool {
        self.running.is_running()
    }

    fn exec(&self, event: &NotificationEvent, path: &str) -> ExecFuture {
        self.executed.lock().unwrap().push(Execution {
            path: path.to_string(),
            notification: event.notification,
        });

        let guard = self.running.start();
        let busy_for = self.busy_for;
        let fail = self.fail;

        Box::pin(async move {
            let _guard = guard;
            if !busy_for.is_zero() {
                tokio::time::sleep(busy_for).await;
            }
            if fail {
                return Err(WatchError::Other(anyhow::anyhow!("scripted failure")));
            }
            Ok(())
        })
    }
}
