// src/watch/event.rs

//! Normalized file-system event model.
//!
//! Raw `notify` events are translated into [`NotificationEvent`]s: a cleaned
//! path, a [`Notification`] flag set, a best-effort [`FileType`] and an
//! optional [`EventError`]. Everything downstream (coalescing, the trigger
//! predicate, command templates) only ever sees this model.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use notify::event::{EventKind, ModifyKind, RenameMode};
use thiserror::Error;

use crate::fs::{EntryKind, FileSystem};
use crate::watch::path_utils::{clean_path, location_str};

bitflags! {
    /// What happened to a path. Any combination of flags may be set, except
    /// that a failed event source is reported as `ERROR` alone.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Notification: u8 {
        const REMOVE = 1 << 0;
        const CREATE = 1 << 1;
        const WRITE = 1 << 2;
        const RENAME = 1 << 3;
        const CHMOD = 1 << 4;
        const ERROR = 1 << 5;
    }
}

impl Notification {
    /// True for `REMOVE` or `RENAME`: the path is expected to be gone.
    pub fn is_removal(self) -> bool {
        self.intersects(Notification::REMOVE | Notification::RENAME)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// Kind of the path an event refers to, as seen right after the event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    File,
    Directory,
}

/// Why an event could not be classified cleanly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("stat {}: {message}", path.display())]
    Stat {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },

    /// The platform event source itself failed.
    #[error("{0}")]
    Source(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub path: PathBuf,
    pub notification: Notification,
    pub file_type: FileType,
    pub error: Option<EventError>,
}

impl NotificationEvent {
    pub fn new(path: impl Into<PathBuf>, notification: Notification, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            notification,
            file_type,
            error: None,
        }
    }

    /// Synthetic event for a failure of the event source itself.
    ///
    /// The path is left empty: there is no concrete file to blame.
    pub fn fatal(cause: impl fmt::Display) -> Self {
        Self {
            path: PathBuf::new(),
            notification: Notification::ERROR,
            file_type: FileType::File,
            error: Some(EventError::Source(cause.to_string())),
        }
    }

    /// Empty path + `ERROR`: the notifier died, not a single file.
    pub fn is_fatal(&self) -> bool {
        self.path.as_os_str().is_empty() && self.notification.contains(Notification::ERROR)
    }

    /// `ERROR` that a concurrent remove/rename does not explain.
    pub fn has_classification_error(&self) -> bool {
        self.notification.contains(Notification::ERROR) && !self.notification.is_removal()
    }

    pub fn path_str(&self) -> String {
        location_str(&self.path)
    }
}

/// Map a raw `notify` event onto `(path, flags)` pairs, one per affected path.
///
/// Event kinds with no counterpart in [`Notification`] (access, other)
/// produce nothing.
pub fn notifications_for(kind: &EventKind, paths: &[PathBuf]) -> Vec<(PathBuf, Notification)> {
    let flags = match kind {
        EventKind::Create(_) => Notification::CREATE,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
            Notification::WRITE
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => Notification::CHMOD,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Notification::CREATE,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // Old name is gone, new name appeared.
            let mut out = Vec::with_capacity(paths.len());
            let mut iter = paths.iter();
            if let Some(from) = iter.next() {
                out.push((from.clone(), Notification::RENAME));
            }
            out.extend(iter.map(|to| (to.clone(), Notification::CREATE)));
            return out;
        }
        EventKind::Modify(ModifyKind::Name(_)) => Notification::RENAME,
        EventKind::Remove(_) => Notification::REMOVE,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Notification::empty(),
    };

    if flags.is_empty() {
        return Vec::new();
    }

    paths.iter().map(|p| (p.clone(), flags)).collect()
}

/// Build a [`NotificationEvent`] for one path, stat'ing it to find its type.
///
/// A failed stat is expected for `REMOVE`/`RENAME` (the path is gone); on any
/// other event it is flagged with `ERROR` and the cause is kept.
pub fn classify(fs: &dyn FileSystem, path: &Path, notification: Notification) -> NotificationEvent {
    let path = clean_path(path);
    let mut event = NotificationEvent::new(path, notification, FileType::File);

    match fs.entry_kind(&event.path) {
        Ok(EntryKind::Dir) => event.file_type = FileType::Directory,
        Ok(_) => {}
        Err(_) if notification.is_removal() => {}
        Err(err) => {
            event.notification |= Notification::ERROR;
            event.error = Some(EventError::Stat {
                path: event.path.clone(),
                kind: err.kind(),
                message: err.to_string(),
            });
        }
    }

    event
}
