// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Resolving a match specification into watch locations (`finder`).
//! - Deciding which changed locations are relevant (`filter`).
//! - Wrapping the platform watcher (`notify`) and normalizing its events
//!   (`notifier`, `event`).
//!
//! It does **not** know about coalescing or command execution; it only turns
//! filesystem changes into [`NotificationEvent`]s.

pub mod event;
pub mod filter;
pub mod finder;
pub mod notifier;
pub mod path_utils;

pub use event::{EventError, FileType, Notification, NotificationEvent};
pub use filter::{AcceptAll, Filter, RegexFilter, filter_from_pattern};
pub use finder::{Finder, FinderResults, LocalFinder};
pub use notifier::{EventStream, FsNotifier, Notifier};
