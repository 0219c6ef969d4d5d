// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Component, Path, PathBuf};

/// Lexically clean a path, without touching the filesystem.
///
/// - `.` components are dropped.
/// - `..` folds into the preceding normal component; at the root it is
///   dropped, in a relative path with nothing to fold it is kept.
/// - A relative path that cleans down to nothing becomes `.`.
///
/// The empty path stays empty: it is the "no concrete file" sentinel of
/// [`crate::watch::event::NotificationEvent`].
pub fn clean_path(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::new();
    }

    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().collect()
}

/// Render a path the way filters and command templates see it.
pub fn location_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
