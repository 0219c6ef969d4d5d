// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The watcher talks to an [`Executor`] instead of spawning processes itself.
//! This makes it easy to swap in a recording executor in tests while keeping
//! the production executors in [`super::process`] and [`super::print`].
//!
//! An executor owns its busy state. The watcher only reads it through
//! [`Executor::running`] before deciding to trigger, which is how at most one
//! command per watcher is ever in flight.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::Result;
use crate::watch::NotificationEvent;

/// Future returned by [`Executor::exec`]; resolves when the action finished.
pub type ExecFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Runs an action in response to a triggered event.
pub trait Executor: Send + Sync + fmt::Debug {
    /// True while a previous `exec` has not finished. Must not block.
    fn running(&self) -> bool;

    /// Start the action for `event` on `path`.
    ///
    /// Implementations mark themselves running before returning, and must
    /// report not running again once the future completes, fails, or is
    /// dropped.
    fn exec(&self, event: &NotificationEvent, path: &str) -> ExecFuture;
}

/// Shared "currently executing" flag.
#[derive(Debug, Clone, Default)]
pub struct RunningFlag {
    inner: Arc<AtomicBool>,
}

impl RunningFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Mark running until the returned guard is dropped.
    pub fn start(&self) -> RunningGuard {
        self.inner.store(true, Ordering::Release);
        RunningGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears its [`RunningFlag`] on drop.
#[derive(Debug)]
pub struct RunningGuard {
    inner: Arc<AtomicBool>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.inner.store(false, Ordering::Release);
    }
}
