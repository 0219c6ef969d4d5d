// tests/finder.rs

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use watchrun::errors::WatchError;
use watchrun::fs::mock::MockFileSystem;
use watchrun::fs::{EntryKind, readable_entries};
use watchrun::watch::finder::find_recursive;
use watchrun::watch::{Finder, LocalFinder};

type TestResult = Result<(), Box<dyn Error>>;

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

fn mock_tree() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("root/top.txt");
    fs.add_file("root/b/deep/file.rs");
    fs.add_dir("root/a");
    fs.add_file("root/a/x.txt");
    fs.add_dir("root/c");
    fs.add_symlink("root/link");
    fs
}

#[test]
fn directory_spec_yields_every_directory_depth_first() -> TestResult {
    let fs = mock_tree();
    let finder = LocalFinder::with_fs("root", Arc::new(fs));

    let found = finder.find()?;

    assert_eq!(
        found.locations,
        paths(&["root", "root/a", "root/b", "root/b/deep", "root/c"])
    );
    assert!(found.excluded.is_empty());
    Ok(())
}

#[test]
fn unreadable_directory_is_excluded_not_fatal() -> TestResult {
    let fs = mock_tree();
    fs.deny("root/b");
    let finder = LocalFinder::with_fs("root", Arc::new(fs));

    let found = finder.find()?;

    assert_eq!(found.locations, paths(&["root", "root/a", "root/c"]));
    assert_eq!(found.excluded, paths(&["root/b"]));
    Ok(())
}

#[test]
fn walking_a_file_is_a_walk_error() {
    let fs = mock_tree();
    let err = find_recursive(&fs, PathBuf::from("root/top.txt")).unwrap_err();
    assert!(matches!(err, WatchError::Walk { .. }));
}

#[test]
fn file_spec_yields_exactly_that_file() -> TestResult {
    let fs = mock_tree();
    let finder = LocalFinder::with_fs("root/a/x.txt", Arc::new(fs));

    let found = finder.find()?;

    assert_eq!(found.locations, paths(&["root/a/x.txt"]));
    Ok(())
}

#[test]
fn missing_spec_is_expanded_as_glob() -> TestResult {
    let fs = mock_tree();
    let finder = LocalFinder::with_fs("root/*.txt", Arc::new(fs));

    let found = finder.find()?;

    assert_eq!(found.locations, paths(&["root/top.txt"]));

    let nested = LocalFinder::with_fs("root/*/*.txt", Arc::new(mock_tree())).find()?;
    assert_eq!(nested.locations, paths(&["root/a/x.txt"]));
    Ok(())
}

#[test]
fn glob_without_matches_is_empty_glob() {
    let fs = mock_tree();
    let finder = LocalFinder::with_fs("root/*.md", Arc::new(fs));

    let err = finder.find().unwrap_err();
    assert!(matches!(err, WatchError::EmptyGlob(spec) if spec == "root/*.md"));
}

#[test]
fn malformed_glob_is_reported() {
    let fs = mock_tree();
    let finder = LocalFinder::with_fs("root/[", Arc::new(fs));

    let err = finder.find().unwrap_err();
    assert!(matches!(err, WatchError::Glob { .. }));
}

#[test]
fn real_directory_tree_is_walked() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().join("root");
    fs::create_dir_all(root.join("b/deep"))?;
    fs::create_dir_all(root.join("a"))?;
    fs::write(root.join("a/file.txt"), "x")?;
    fs::write(root.join("top.txt"), "x")?;

    let finder = LocalFinder::new(root.to_string_lossy());
    let found = finder.find()?;

    assert_eq!(
        found.locations,
        vec![
            root.clone(),
            root.join("a"),
            root.join("b"),
            root.join("b/deep"),
        ]
    );
    Ok(())
}

#[test]
fn real_file_and_glob_specs() -> TestResult {
    let tmp = tempfile::tempdir()?;
    fs::write(tmp.path().join("one.txt"), "1")?;
    fs::write(tmp.path().join("two.txt"), "2")?;
    fs::write(tmp.path().join("three.bin"), "3")?;

    let file = tmp.path().join("one.txt");
    let found = LocalFinder::new(file.to_string_lossy()).find()?;
    assert_eq!(found.locations, vec![file]);

    let pattern = tmp.path().join("*.txt");
    let found = LocalFinder::new(pattern.to_string_lossy()).find()?;
    assert_eq!(
        found.locations,
        vec![tmp.path().join("one.txt"), tmp.path().join("two.txt")]
    );

    let pattern = tmp.path().join("*.md");
    let err = LocalFinder::new(pattern.to_string_lossy()).find().unwrap_err();
    assert!(matches!(err, WatchError::EmptyGlob(_)));
    Ok(())
}

#[cfg(unix)]
#[test]
fn real_symlinked_directories_are_not_followed() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().join("root");
    fs::create_dir_all(root.join("real"))?;
    std::os::unix::fs::symlink(root.join("real"), root.join("alias"))?;

    let found = LocalFinder::new(root.to_string_lossy()).find()?;

    assert_eq!(found.locations, vec![root.clone(), root.join("real")]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlink_loop_is_a_bad_match_spec() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let looped = tmp.path().join("loop");
    std::os::unix::fs::symlink(&looped, &looped)?;

    let err = LocalFinder::new(looped.to_string_lossy()).find().unwrap_err();

    assert!(matches!(err, WatchError::BadMatchSpec { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn entries_that_fail_to_stat_are_dropped_not_fatal() {
    let listing = vec![
        Ok((PathBuf::from("root/a"), Ok(EntryKind::Dir))),
        Ok((
            PathBuf::from("root/locked"),
            Err(io::Error::from(io::ErrorKind::PermissionDenied)),
        )),
        Err(io::Error::other("entry vanished")),
        Ok((PathBuf::from("root/b.txt"), Ok(EntryKind::File))),
    ];

    let entries = readable_entries(Path::new("root"), listing);

    assert_eq!(
        entries,
        vec![
            (PathBuf::from("root/a"), EntryKind::Dir),
            (PathBuf::from("root/b.txt"), EntryKind::File),
        ]
    );
}
