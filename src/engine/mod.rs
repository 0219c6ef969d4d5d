// src/engine/mod.rs

//! Watcher engine.
//!
//! This module ties together one finder, filter, notifier, executor and
//! logger per watcher, and runs the loop that:
//! - registers the resolved locations with the notifier
//! - forwards notifier events to a coalescing task
//! - flushes a settled batch through the trigger predicate
//! - starts at most one execution at a time
//!
//! The pure pieces live in [`core`] (batching) and [`event_handlers`]
//! (trigger decisions); the async/IO shell is implemented in [`runtime`].

pub mod builder;
pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use builder::{WatcherBuilder, watchers_from_config};
pub use self::core::Coalescer;
pub use event_handlers::{FlushCommand, FlushStep, RejectReason, Verdict, evaluate, plan_flush};
pub use runtime::{SharedNotifier, Watcher, WatcherState};
