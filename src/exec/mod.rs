// src/exec/mod.rs

//! Command execution layer.
//!
//! This module is responsible for running a watcher's action when the engine
//! decides an event should trigger, and for reporting whether an action is
//! still in flight.
//!
//! - [`backend`] provides the `Executor` trait the engine talks to, and the
//!   `RunningFlag` drop guard every executor uses for its busy state.
//! - [`command`] renders command templates.
//! - [`task_runner`] spawns one child process and streams its output.
//! - [`process`] contains the shell and raw executors built on it.
//! - [`print`] contains the executor that only prints the triggering path.
//! - [`output`] is the shared sink command output is written to.

pub mod backend;
pub mod command;
pub mod output;
pub mod print;
pub mod process;
pub mod task_runner;

use std::sync::Arc;

pub use backend::{ExecFuture, Executor, RunningFlag, RunningGuard};
pub use command::CommandTemplate;
pub use output::{OutputSink, SharedBuffer};
pub use print::PrintExecutor;
pub use process::{RawExecutor, ShellExecutor};

use crate::types::ExecutorKind;

/// Build the production executor for `kind`.
///
/// `template` should already have its per-watcher placeholders bound.
pub fn executor_from_kind(
    kind: ExecutorKind,
    template: CommandTemplate,
    output: OutputSink,
) -> Arc<dyn Executor> {
    match kind {
        ExecutorKind::UnixShell => Arc::new(ShellExecutor::new(template, output)),
        ExecutorKind::Raw => Arc::new(RawExecutor::new(template, output)),
        ExecutorKind::Stdout => Arc::new(PrintExecutor::new(output)),
    }
}
