use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use watchrun::engine::{Watcher, WatcherBuilder, WatcherState};
use watchrun::errors::Result;
use watchrun::watch::{NotificationEvent, filter_from_pattern};

use crate::fake_executor::RecordingExecutor;
use crate::fake_finder::StaticFinder;
use crate::fake_notifier::{NotifierHandle, ScriptedNotifier};
use crate::recording_logger::RecordingLogger;

/// A watcher wired to fakes, plus handles to drive and inspect them.
pub struct WatcherHarness {
    pub watcher: Watcher,
    pub notifier: NotifierHandle,
    pub executor: RecordingExecutor,
    pub logger: RecordingLogger,
    shutdown: watch::Sender<bool>,
}

impl WatcherHarness {
    /// Watch `locations`, accept everything, 250ms window.
    pub fn new(locations: &[&str]) -> Self {
        Self::with(locations, None, RecordingExecutor::new(), Duration::from_millis(250))
    }

    pub fn with(
        locations: &[&str],
        filter: Option<&str>,
        executor: RecordingExecutor,
        window: Duration,
    ) -> Self {
        let (notifier, handle) = ScriptedNotifier::new();
        Self::with_notifier(locations, filter, executor, window, notifier, handle)
    }

    pub fn with_notifier(
        locations: &[&str],
        filter: Option<&str>,
        executor: RecordingExecutor,
        window: Duration,
        notifier: ScriptedNotifier,
        handle: NotifierHandle,
    ) -> Self {
        let logger = RecordingLogger::new();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let locations: Vec<PathBuf> = locations.iter().map(PathBuf::from).collect();

        let watcher = WatcherBuilder::new("test")
            .finder(StaticFinder::new(locations))
            .filter(filter_from_pattern(filter).expect("valid filter"))
            .notifier(notifier)
            .executor(Arc::new(executor.clone()))
            .logger(Arc::new(logger.clone()))
            .coalesce_window(window)
            .shutdown(shutdown_rx)
            .build()
            .expect("complete watcher");

        Self {
            watcher,
            notifier: handle,
            executor,
            logger,
            shutdown,
        }
    }

    /// Spawn `work()` on the current runtime.
    pub fn start(self) -> StartedWatcher {
        let mut watcher = self.watcher;
        let task = tokio::spawn(async move {
            let result = watcher.work().await;
            (watcher.state(), result)
        });

        StartedWatcher {
            task,
            notifier: self.notifier,
            executor: self.executor,
            logger: self.logger,
            shutdown: self.shutdown,
        }
    }
}

/// A watcher whose `work()` is running in a task.
pub struct StartedWatcher {
    task: JoinHandle<(WatcherState, Result<()>)>,
    pub notifier: NotifierHandle,
    pub executor: RecordingExecutor,
    pub logger: RecordingLogger,
    shutdown: watch::Sender<bool>,
}

impl StartedWatcher {
    pub fn send(&self, event: NotificationEvent) {
        assert!(self.notifier.send(event), "notifier already closed");
    }

    /// Request shutdown and wait for `work()` to return.
    pub async fn stop(self) -> (WatcherState, Result<()>) {
        let _ = self.shutdown.send(true);
        self.join().await
    }

    /// Wait for `work()` to return on its own.
    pub async fn join(self) -> (WatcherState, Result<()>) {
        self.task.await.expect("watcher task panicked")
    }
}
