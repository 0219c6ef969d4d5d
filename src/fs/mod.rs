// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::{Result, WatchError};

pub mod mock;

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// Abstract filesystem interface.
///
/// Only the handful of operations the finder and the event classifier need.
pub trait FileSystem: Send + Sync + Debug {
    /// Stat a path, following symlinks.
    fn entry_kind(&self, path: &Path) -> io::Result<EntryKind>;

    /// Return the entries of a directory as full paths, each with its own
    /// kind (symlinks are reported as such, not followed). Entries that
    /// cannot be stat'ed are left out; only failing to open `path` is an
    /// error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>>;

    /// Expand a shell-like glob pattern into the existing paths it matches.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs` and the `glob` crate.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn entry_kind(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = fs::metadata(path)?;
        Ok(kind_of(meta.file_type()))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>> {
        let listing = fs::read_dir(path)?
            .map(|entry| entry.map(|e| (e.path(), e.file_type().map(kind_of))));
        Ok(readable_entries(path, listing))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob::glob(pattern).map_err(|source| WatchError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matches = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => matches.push(path),
                Err(err) => {
                    warn!(path = ?err.path(), error = %err.error(), "skipping unreadable glob entry");
                }
            }
        }
        Ok(matches)
    }
}

/// Keep the entries of `dir` whose kind could be read; log and drop the rest.
pub fn readable_entries<I>(dir: &Path, listing: I) -> Vec<(PathBuf, EntryKind)>
where
    I: IntoIterator<Item = io::Result<(PathBuf, io::Result<EntryKind>)>>,
{
    let mut entries = Vec::new();
    for entry in listing {
        match entry {
            Ok((path, Ok(kind))) => entries.push((path, kind)),
            Ok((path, Err(err))) => {
                warn!(path = ?path, error = %err, "skipping entry that cannot be stat'ed");
            }
            Err(err) => {
                warn!(dir = ?dir, error = %err, "skipping unreadable entry");
            }
        }
    }
    entries
}

fn kind_of(ft: fs::FileType) -> EntryKind {
    if ft.is_symlink() {
        EntryKind::Symlink
    } else if ft.is_dir() {
        EntryKind::Dir
    } else if ft.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}
