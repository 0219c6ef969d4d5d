// src/runner.rs

//! Runs every configured watcher concurrently.

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::engine::Watcher;
use crate::errors::WatchError;

/// How each watcher ended.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Watchers that stopped without an error.
    pub stopped: Vec<String>,
    /// Watchers that failed, with their error.
    pub failed: Vec<(String, WatchError)>,
    /// Watcher tasks that panicked or were cancelled.
    pub aborted: usize,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.stopped.len() + self.failed.len() + self.aborted
    }

    /// True when there was at least one watcher and none ended cleanly.
    pub fn all_failed(&self) -> bool {
        self.total() > 0 && self.stopped.is_empty()
    }
}

/// Owns a set of watchers until [`Runner::run`] consumes it.
#[derive(Debug, Default)]
pub struct Runner {
    watchers: Vec<Watcher>,
}

impl Runner {
    pub fn new(watchers: Vec<Watcher>) -> Self {
        Self { watchers }
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Start every watcher in its own task and wait for all of them.
    ///
    /// One watcher failing does not stop the others; failures are logged and
    /// collected in the report.
    pub async fn run(self) -> RunReport {
        let mut set = JoinSet::new();

        for mut watcher in self.watchers {
            set.spawn(async move {
                let result = watcher.work().await;
                (watcher.name().to_string(), result)
            });
        }

        info!(watchers = set.len(), "runner started");

        let mut report = RunReport::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    info!(watcher = %name, "watcher stopped");
                    report.stopped.push(name);
                }
                Ok((name, Err(err))) => {
                    error!(watcher = %name, error = %err, "watcher failed");
                    report.failed.push((name, err));
                }
                Err(err) => {
                    error!(error = %err, "watcher task aborted");
                    report.aborted += 1;
                }
            }
        }

        info!(
            stopped = report.stopped.len(),
            failed = report.failed.len(),
            "runner finished"
        );
        report
    }
}
