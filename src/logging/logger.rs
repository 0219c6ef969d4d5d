// src/logging/logger.rs

//! Per-watcher loggers.
//!
//! Each watcher owns one [`Logger`]. Call sites always use `log` for
//! user-visible lines and `debug` for diagnostics; whether anything is printed
//! depends only on which implementation the watcher was built with.

use std::fmt;
use std::sync::Arc;

use tracing::info;

pub trait Logger: Send + Sync + fmt::Debug {
    fn log(&self, args: fmt::Arguments<'_>);
    fn debug(&self, args: fmt::Arguments<'_>);
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentLogger;

impl Logger for SilentLogger {
    fn log(&self, _args: fmt::Arguments<'_>) {}
    fn debug(&self, _args: fmt::Arguments<'_>) {}
}

/// Emits `log` lines at info level tagged with the watcher name; drops
/// `debug` lines.
#[derive(Debug, Clone)]
pub struct InfoLogger {
    watcher: String,
}

impl InfoLogger {
    pub fn new(watcher: impl Into<String>) -> Self {
        Self {
            watcher: watcher.into(),
        }
    }
}

impl Logger for InfoLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        info!(watcher = %self.watcher, "{}", args);
    }

    fn debug(&self, _args: fmt::Arguments<'_>) {}
}

/// Promotes `debug` lines to `log` lines of the wrapped logger.
#[derive(Debug, Clone)]
pub struct DebugLogger<L> {
    inner: L,
}

impl<L: Logger> DebugLogger<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<L: Logger> Logger for DebugLogger<L> {
    fn log(&self, args: fmt::Arguments<'_>) {
        self.inner.log(args);
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.inner.log(format_args!("[debug] {args}"));
    }
}

/// Pick the logger for a watcher's `silent` / `debug` settings.
///
/// `silent` wins over `debug`.
pub fn logger_for(watcher: &str, silent: bool, debug: bool) -> Arc<dyn Logger> {
    if silent {
        Arc::new(SilentLogger)
    } else if debug {
        Arc::new(DebugLogger::new(InfoLogger::new(watcher)))
    } else {
        Arc::new(InfoLogger::new(watcher))
    }
}
