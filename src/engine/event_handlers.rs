// src/engine/event_handlers.rs

//! Trigger decisions for a flushed batch.
//!
//! [`evaluate`] is the per-event predicate. [`plan_flush`] applies it to a
//! whole batch and returns the commands the IO shell should carry out, in
//! order. Neither touches the notifier or the executor.

use std::fmt;
use std::path::PathBuf;

use crate::watch::{FileType, Filter, Notification, NotificationEvent};

/// Why an event did not trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyPath,
    Filtered,
    ClassificationError,
    ExecutorBusy,
    NotTriggerWorthy,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::EmptyPath => "empty path",
            RejectReason::Filtered => "rejected by filter",
            RejectReason::ClassificationError => "classification error",
            RejectReason::ExecutorBusy => "executor busy",
            RejectReason::NotTriggerWorthy => "not a triggering change",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Accept, after unwatching the path (it was removed or renamed away).
    AcceptRemoved,
    Reject(RejectReason),
}

/// Decide whether a single event should trigger.
///
/// `executor_running` is the busy state sampled once for the whole batch.
pub fn evaluate(event: &NotificationEvent, filter: &dyn Filter, executor_running: bool) -> Verdict {
    if event.path.as_os_str().is_empty() {
        return Verdict::Reject(RejectReason::EmptyPath);
    }

    if !filter.matches(&event.path_str()) {
        return Verdict::Reject(RejectReason::Filtered);
    }

    if event.has_classification_error() {
        return Verdict::Reject(RejectReason::ClassificationError);
    }

    if executor_running {
        return Verdict::Reject(RejectReason::ExecutorBusy);
    }

    if event.notification.is_removal() {
        return Verdict::AcceptRemoved;
    }

    match event.file_type {
        FileType::File
            if event
                .notification
                .intersects(Notification::WRITE | Notification::CHMOD | Notification::CREATE) =>
        {
            Verdict::Accept
        }
        FileType::Directory => Verdict::Accept,
        FileType::File => Verdict::Reject(RejectReason::NotTriggerWorthy),
    }
}

/// Side effect the IO shell should perform after a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushCommand {
    /// Stop watching this path.
    Unwatch(PathBuf),
    /// Run the executor for this event.
    Execute(NotificationEvent),
}

/// Outcome of evaluating one batch.
#[derive(Debug, Clone, Default)]
pub struct FlushStep {
    /// Commands in arrival order. At most one `Execute`.
    pub commands: Vec<FlushCommand>,
    /// Rejected events and why, for diagnostics.
    pub skipped: Vec<(PathBuf, RejectReason)>,
    /// Accepted events that lost to an earlier accepted event.
    pub superseded: usize,
}

impl FlushStep {
    pub fn executed(&self) -> Option<&NotificationEvent> {
        self.commands.iter().find_map(|command| match command {
            FlushCommand::Execute(event) => Some(event),
            FlushCommand::Unwatch(_) => None,
        })
    }
}

/// Evaluate every event of `batch` in order.
///
/// The first accepted event executes; later accepted events are superseded
/// but still produce their `Unwatch`.
pub fn plan_flush(batch: &[NotificationEvent], filter: &dyn Filter, executor_running: bool) -> FlushStep {
    let mut step = FlushStep::default();
    let mut triggered = false;

    for event in batch {
        let verdict = evaluate(event, filter, executor_running);

        match verdict {
            Verdict::Reject(reason) => {
                step.skipped.push((event.path.clone(), reason));
                continue;
            }
            Verdict::AcceptRemoved => {
                step.commands.push(FlushCommand::Unwatch(event.path.clone()));
            }
            Verdict::Accept => {}
        }

        if triggered {
            step.superseded += 1;
        } else {
            triggered = true;
            step.commands.push(FlushCommand::Execute(event.clone()));
        }
    }

    step
}
