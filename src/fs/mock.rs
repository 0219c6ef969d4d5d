// src/fs/mock.rs

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{EntryKind, FileSystem};
use crate::errors::{Result, WatchError};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Symlink,
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    denied: HashSet<PathBuf>,
}

/// In-memory filesystem for finder and classifier tests.
///
/// Parent directories are created implicitly; `.` always exists.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state.entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path);
    }

    pub fn add_symlink(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Symlink);
    }

    /// Make listing `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.lock().denied.insert(path.as_ref().to_path_buf());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut state = self.lock();
        state.entries.insert(path.to_path_buf(), entry);

        if let Some(parent) = parent_of(path) {
            ensure_dir_entry(&mut state.entries, parent);
            add_child(&mut state.entries, parent, path);
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = parent_of(path) {
        if parent != path {
            // Avoid infinite loop at root
            ensure_dir_entry(entries, parent);
            add_child(entries, parent, path);
        }
    }
}

fn add_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {:?}", path))
}

fn denied(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("permission denied: {:?}", path))
}

impl FileSystem for MockFileSystem {
    fn entry_kind(&self, path: &Path) -> io::Result<EntryKind> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File) => Ok(EntryKind::File),
            Some(MockEntry::Dir(_)) => Ok(EntryKind::Dir),
            // Mock symlinks dangle.
            Some(MockEntry::Symlink) => Err(not_found(path)),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>> {
        let state = self.lock();
        if state.denied.contains(path) {
            return Err(denied(path));
        }
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => Ok(children
                .iter()
                .map(|name| {
                    let child = path.join(name);
                    let kind = match state.entries.get(&child) {
                        Some(MockEntry::Dir(_)) => EntryKind::Dir,
                        Some(MockEntry::Symlink) => EntryKind::Symlink,
                        _ => EntryKind::File,
                    };
                    (child, kind)
                })
                .collect()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {:?}", path),
            )),
            None => Err(not_found(path)),
        }
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let compiled = glob::Pattern::new(pattern).map_err(|source| WatchError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;

        // Same separator rule as `glob::glob`: `*` stays within one component.
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..glob::MatchOptions::new()
        };

        let state = self.lock();
        let mut matches: Vec<PathBuf> = state
            .entries
            .iter()
            .filter(|(_, entry)| !matches!(entry, MockEntry::Symlink))
            .map(|(path, _)| path)
            .filter(|path| compiled.matches_path_with(path, options))
            .cloned()
            .collect();
        matches.sort();
        Ok(matches)
    }
}
