// src/engine/runtime.rs

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::errors::{Result, WatchError};
use crate::exec::Executor;
use crate::logging::Logger;
use crate::watch::{EventError, EventStream, Filter, Finder, Notifier, NotificationEvent};

use super::core::Coalescer;
use super::event_handlers::{FlushCommand, plan_flush};

/// Notifier shared between the receive loop and the coalescing consumer.
pub type SharedNotifier = Arc<Mutex<Box<dyn Notifier>>>;

/// Lifecycle of a [`Watcher`]. There is no way back to `Registering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Registering,
    Running,
    Stopped,
}

/// One match specification, one command.
///
/// Drives find → register → receive → coalesce → trigger. The receive loop
/// runs in [`Watcher::work`]; coalescing runs in a task it spawns. Build one
/// with [`super::WatcherBuilder`].
pub struct Watcher {
    pub(super) name: String,
    pub(super) finder: Box<dyn Finder>,
    pub(super) filter: Arc<dyn Filter>,
    pub(super) notifier: SharedNotifier,
    pub(super) executor: Arc<dyn Executor>,
    pub(super) logger: Arc<dyn Logger>,
    pub(super) coalesce_window: Duration,
    pub(super) shutdown: Option<watch::Receiver<bool>>,
    pub(super) state: WatcherState,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("name", &self.name)
            .field("finder", &self.finder)
            .field("filter", &self.filter)
            .field("executor", &self.executor)
            .field("coalesce_window", &self.coalesce_window)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn coalesce_window(&self) -> Duration {
        self.coalesce_window
    }

    /// Run until the notifier fails, its stream ends, or shutdown is
    /// requested.
    ///
    /// Setup failures (finding, registering) are returned before any event is
    /// read. A fatal notifier event is returned as
    /// [`WatchError::NotifierStopped`]. The notifier is closed exactly once
    /// on every path out of this function.
    pub async fn work(&mut self) -> Result<()> {
        if self.state != WatcherState::Idle {
            return Err(WatchError::AlreadyStarted(self.name.clone()));
        }

        let events = match self.register() {
            Ok(events) => events,
            Err(err) => {
                self.close_notifier();
                self.state = WatcherState::Stopped;
                return Err(err);
            }
        };

        self.state = WatcherState::Running;

        let (tx, rx) = mpsc::unbounded_channel();
        let consumer = Consumer {
            filter: Arc::clone(&self.filter),
            notifier: Arc::clone(&self.notifier),
            executor: Arc::clone(&self.executor),
            logger: Arc::clone(&self.logger),
            coalescer: Coalescer::new(self.coalesce_window),
            inflight: JoinSet::new(),
        };
        let consumer = tokio::spawn(consumer.run(rx));

        let mut result = self.receive(events, tx).await;

        self.close_notifier();
        if let Err(err) = consumer.await {
            warn!(watcher = %self.name, error = %err, "coalescing task ended abnormally");
            // A receive error is the root cause; keep it.
            if result.is_ok() {
                result = Err(WatchError::CoalescerFailed(err));
            }
        }

        self.state = WatcherState::Stopped;
        self.logger.debug(format_args!("watcher stopped"));
        result
    }

    fn register(&mut self) -> Result<EventStream> {
        self.state = WatcherState::Registering;

        let found = self.finder.find()?;
        if found.locations.is_empty() {
            return Err(WatchError::NoLocations(self.finder.match_spec().to_string()));
        }
        for excluded in &found.excluded {
            self.logger
                .debug(format_args!("skipping unreadable {}", excluded.display()));
        }

        let mut notifier = lock(&self.notifier);
        for location in &found.locations {
            notifier
                .add(location)
                .map_err(|source| WatchError::Register {
                    location: location.clone(),
                    source: Box::new(source),
                })?;
            self.logger
                .debug(format_args!("watching {}", location.display()));
        }
        let events = notifier.events()?;
        drop(notifier);

        self.logger.log(format_args!(
            "watching {} location(s)",
            found.locations.len()
        ));
        Ok(events)
    }

    async fn receive(
        &mut self,
        mut events: EventStream,
        tx: mpsc::UnboundedSender<NotificationEvent>,
    ) -> Result<()> {
        let mut shutdown = self.shutdown.clone();

        loop {
            let event = tokio::select! {
                event = events.recv() => event,
                _ = shutdown_requested(&mut shutdown) => {
                    self.logger.debug(format_args!("shutdown requested"));
                    return Ok(());
                }
            };

            let Some(event) = event else {
                self.logger.debug(format_args!("event stream closed"));
                return Ok(());
            };

            if event.is_fatal() {
                let cause = event
                    .error
                    .unwrap_or_else(|| EventError::Source("unknown notifier error".to_string()));
                self.logger.log(format_args!("notifier failed: {cause}"));
                return Err(WatchError::NotifierStopped(cause));
            }

            self.logger.debug(format_args!(
                "event {} on {}",
                event.notification,
                event.path.display()
            ));

            if tx.send(event).is_err() {
                warn!(watcher = %self.name, "coalescing task is gone; stopping");
                return Ok(());
            }
        }
    }

    fn close_notifier(&self) {
        if let Err(err) = lock(&self.notifier).close() {
            self.logger
                .log(format_args!("closing notifier failed: {err}"));
        }
    }
}

/// Resolves once the shutdown flag is true. Never resolves without a
/// receiver, or after the sender is gone.
async fn shutdown_requested(rx: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = rx else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
    }
}

fn lock(notifier: &SharedNotifier) -> std::sync::MutexGuard<'_, Box<dyn Notifier>> {
    notifier.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The coalescing side of a running watcher.
struct Consumer {
    filter: Arc<dyn Filter>,
    notifier: SharedNotifier,
    executor: Arc<dyn Executor>,
    logger: Arc<dyn Logger>,
    coalescer: Coalescer,
    inflight: JoinSet<()>,
}

impl Consumer {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<NotificationEvent>) {
        let window = self.coalescer.window();
        let mut ticker = time::interval_at(Instant::now() + window, window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => self.coalescer.push(event, Instant::now()),
                    None => break,
                },
                _ = ticker.tick() => {
                    while let Some(res) = self.inflight.try_join_next() {
                        self.reap(res);
                    }
                    if let Some(batch) = self.coalescer.take_ready(Instant::now()) {
                        self.flush(batch);
                    }
                }
            }
        }

        let dropped = self.coalescer.discard();
        if dropped > 0 {
            self.logger
                .debug(format_args!("dropping {dropped} unflushed event(s)"));
        }

        while let Some(res) = self.inflight.join_next().await {
            self.reap(res);
        }
    }

    fn flush(&mut self, batch: Vec<NotificationEvent>) {
        let running = self.executor.running();
        let step = plan_flush(&batch, self.filter.as_ref(), running);

        for (path, reason) in &step.skipped {
            self.logger
                .debug(format_args!("skipping {}: {reason}", path.display()));
        }
        if step.superseded > 0 {
            self.logger.debug(format_args!(
                "{} later event(s) superseded in this batch",
                step.superseded
            ));
        }

        for command in step.commands {
            match command {
                FlushCommand::Unwatch(path) => self.unwatch(&path),
                FlushCommand::Execute(event) => self.execute(event),
            }
        }
    }

    fn unwatch(&self, path: &Path) {
        if let Err(err) = lock(&self.notifier).remove(path) {
            self.logger
                .debug(format_args!("unwatch {} failed: {err}", path.display()));
        }
    }

    fn execute(&mut self, event: NotificationEvent) {
        let path = event.path_str();
        self.logger.log(format_args!(
            "running command for {path} ({})",
            event.notification
        ));

        let fut = self.executor.exec(&event, &path);
        let logger = Arc::clone(&self.logger);
        self.inflight.spawn(async move {
            match fut.await {
                Ok(()) => logger.log(format_args!("finished command for {path}")),
                Err(err) => logger.log(format_args!("command for {path} failed: {err}")),
            }
        });
    }

    fn reap(&self, res: std::result::Result<(), JoinError>) {
        if let Err(err) = res {
            debug!(error = %err, "execution task ended abnormally");
            self.logger
                .log(format_args!("execution task ended abnormally: {err}"));
        }
    }
}
