// src/watch/finder.rs

//! Resolution of a match specification into concrete watch locations.
//!
//! Native notifiers do not watch recursively, so a directory spec expands to
//! every directory below it. A plain file is watched directly. Anything that
//! does not exist is treated as a glob pattern.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{Result, WatchError};
use crate::fs::{EntryKind, FileSystem, RealFileSystem};

/// Outcome of [`Finder::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderResults {
    /// Paths to register with the notifier, in walk order.
    pub locations: Vec<PathBuf>,
    /// Directories skipped because they could not be listed.
    pub excluded: Vec<PathBuf>,
}

pub trait Finder: Send + Sync + fmt::Debug {
    fn find(&self) -> Result<FinderResults>;

    /// The specification this finder resolves, for messages.
    fn match_spec(&self) -> &str;
}

/// Finder over a local (or mocked) filesystem.
#[derive(Debug, Clone)]
pub struct LocalFinder {
    match_spec: String,
    fs: Arc<dyn FileSystem>,
}

impl LocalFinder {
    pub fn new(match_spec: impl Into<String>) -> Self {
        Self::with_fs(match_spec, Arc::new(RealFileSystem))
    }

    pub fn with_fs(match_spec: impl Into<String>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            match_spec: match_spec.into(),
            fs,
        }
    }
}

impl Finder for LocalFinder {
    fn find(&self) -> Result<FinderResults> {
        let spec_path = PathBuf::from(&self.match_spec);

        match self.fs.entry_kind(&spec_path) {
            Ok(EntryKind::Dir) => {
                debug!(spec = %self.match_spec, "match spec is a directory; walking");
                find_recursive(self.fs.as_ref(), spec_path)
            }
            Ok(_) => {
                debug!(spec = %self.match_spec, "match spec is a single file");
                Ok(FinderResults {
                    locations: vec![spec_path],
                    excluded: Vec::new(),
                })
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(spec = %self.match_spec, "match spec does not exist; expanding as glob");
                let locations = self.fs.glob(&self.match_spec)?;
                if locations.is_empty() {
                    return Err(WatchError::EmptyGlob(self.match_spec.clone()));
                }
                Ok(FinderResults {
                    locations,
                    excluded: Vec::new(),
                })
            }
            Err(source) => Err(WatchError::BadMatchSpec {
                spec: self.match_spec.clone(),
                source,
            }),
        }
    }

    fn match_spec(&self) -> &str {
        &self.match_spec
    }
}

/// Collect `root` and every directory below it, depth first, children in
/// lexical order. Files and symlinks are skipped.
///
/// A directory that cannot be listed for lack of permission is logged and
/// moved to `excluded`; any other listing error aborts the walk.
pub fn find_recursive(fs: &dyn FileSystem, root: PathBuf) -> Result<FinderResults> {
    let mut results = FinderResults::default();
    let mut stack = vec![root];

    while let Some(dir) = stack.pop() {
        match fs.read_dir(&dir) {
            Ok(entries) => {
                let mut subdirs: Vec<PathBuf> = entries
                    .into_iter()
                    .filter(|(_, kind)| *kind == EntryKind::Dir)
                    .map(|(path, _)| path)
                    .collect();
                subdirs.sort();
                // Reverse so the lexically first child is popped next.
                stack.extend(subdirs.into_iter().rev());
                results.locations.push(dir);
            }
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                warn!(path = ?dir, error = %err, "skipped");
                results.excluded.push(dir);
            }
            Err(source) => return Err(WatchError::Walk { path: dir, source }),
        }
    }

    Ok(results)
}
