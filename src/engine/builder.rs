// src/engine/builder.rs

//! Assembling [`Watcher`]s.
//!
//! [`WatcherBuilder`] is the only way to get a `Watcher`: it insists on the
//! three collaborators that have no sensible default (finder, notifier,
//! executor) and fills in the rest. [`watchers_from_config`] wires the
//! production collaborators for every watcher of a validated config.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::config::{ConfigFile, WatcherConfig};
use crate::errors::{Result, WatchError};
use crate::exec::{CommandTemplate, Executor, OutputSink, executor_from_kind};
use crate::logging::{InfoLogger, Logger, logger_for};
use crate::types::{DEFAULT_COALESCE_WINDOW, fits_instant};
use crate::watch::{AcceptAll, Filter, Finder, FsNotifier, LocalFinder, Notifier, filter_from_pattern};

use super::runtime::{Watcher, WatcherState};

#[derive(Debug, Default)]
pub struct WatcherBuilder {
    name: String,
    finder: Option<Box<dyn Finder>>,
    filter: Option<Arc<dyn Filter>>,
    notifier: Option<Box<dyn Notifier>>,
    executor: Option<Arc<dyn Executor>>,
    logger: Option<Arc<dyn Logger>>,
    coalesce_window: Option<Duration>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl WatcherBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn finder(mut self, finder: impl Finder + 'static) -> Self {
        self.finder = Some(Box::new(finder));
        self
    }

    pub fn filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce_window = Some(window);
        self
    }

    /// Stop the watcher once `rx` reads `true`.
    pub fn shutdown(mut self, rx: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(rx);
        self
    }

    pub fn build(self) -> Result<Watcher> {
        let finder = self.finder.ok_or(WatchError::MissingCollaborator("finder"))?;
        let notifier = self
            .notifier
            .ok_or(WatchError::MissingCollaborator("notifier"))?;
        let executor = self
            .executor
            .ok_or(WatchError::MissingCollaborator("executor"))?;

        let coalesce_window = self.coalesce_window.unwrap_or(DEFAULT_COALESCE_WINDOW);
        if coalesce_window.is_zero() {
            return Err(WatchError::ConfigError(format!(
                "watcher '{}': coalesce window must be greater than zero",
                self.name
            )));
        }
        if !fits_instant(coalesce_window) {
            return Err(WatchError::ConfigError(format!(
                "watcher '{}': coalesce window {coalesce_window:?} is too large",
                self.name
            )));
        }

        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(InfoLogger::new(self.name.clone())));

        Ok(Watcher {
            name: self.name,
            finder,
            filter: self.filter.unwrap_or_else(|| Arc::new(AcceptAll)),
            notifier: Arc::new(Mutex::new(notifier)),
            executor,
            logger,
            coalesce_window,
            shutdown: self.shutdown,
            state: WatcherState::Idle,
        })
    }
}

/// Build a production watcher for every entry of `cfg`.
pub fn watchers_from_config(
    cfg: &ConfigFile,
    output: &OutputSink,
    shutdown: Option<&watch::Receiver<bool>>,
) -> Result<Vec<Watcher>> {
    cfg.watchers()
        .iter()
        .map(|watcher| watcher_from_config(watcher, output, shutdown))
        .collect()
}

fn watcher_from_config(
    cfg: &WatcherConfig,
    output: &OutputSink,
    shutdown: Option<&watch::Receiver<bool>>,
) -> Result<Watcher> {
    let filter = filter_from_pattern(cfg.filter.as_deref())?;
    let template = CommandTemplate::new(cfg.command.as_str())
        .bind_watcher(&cfg.match_spec, cfg.filter.as_deref().unwrap_or_default());
    let executor = executor_from_kind(cfg.executor, template, output.clone());

    let mut builder = WatcherBuilder::new(cfg.name.clone())
        .finder(LocalFinder::new(cfg.match_spec.clone()))
        .filter(filter)
        .notifier(FsNotifier::new()?)
        .executor(executor)
        .logger(logger_for(&cfg.name, cfg.silent, cfg.debug))
        .coalesce_window(cfg.coalesce_window);

    if let Some(rx) = shutdown {
        builder = builder.shutdown(rx.clone());
    }

    builder.build()
}
