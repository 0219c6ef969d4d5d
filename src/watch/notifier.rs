// src/watch/notifier.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::errors::{Result, WatchError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::event::{NotificationEvent, classify, notifications_for};

/// Stream of normalized events produced by a [`Notifier`].
pub type EventStream = mpsc::UnboundedReceiver<NotificationEvent>;

/// A source of normalized file-system events for a set of locations.
pub trait Notifier: Send + fmt::Debug {
    /// Start watching `location` (not recursively).
    fn add(&mut self, location: &Path) -> Result<()>;

    /// Stop watching `location`. Removing an unwatched path is not an error.
    fn remove(&mut self, location: &Path) -> Result<()>;

    /// Hand out the event stream. There is exactly one; asking again fails
    /// with [`WatchError::EventsTaken`].
    fn events(&mut self) -> Result<EventStream>;

    /// Release the underlying watcher. The event stream ends afterwards.
    /// Safe to call more than once.
    fn close(&mut self) -> Result<()>;
}

/// [`Notifier`] backed by the platform's native watcher through `notify`.
///
/// Classification happens on notify's own event thread: each raw event is
/// split per path, stat'ed and pushed into an unbounded channel.
pub struct FsNotifier {
    inner: Option<RecommendedWatcher>,
    events: Option<EventStream>,
}

impl fmt::Debug for FsNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsNotifier")
            .field("closed", &self.inner.is_none())
            .field("events_taken", &self.events.is_none())
            .finish()
    }
}

impl FsNotifier {
    pub fn new() -> Result<Self> {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel::<NotificationEvent>();

        // Called synchronously by notify whenever an event arrives.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    trace!(?event, "raw notify event");
                    for (path, flags) in notifications_for(&event.kind, &event.paths) {
                        if tx.send(classify(fs.as_ref(), &path, flags)).is_err() {
                            debug!("event stream dropped; discarding notify event");
                            return;
                        }
                    }
                }
                Err(err) => {
                    let _ = tx.send(NotificationEvent::fatal(err));
                }
            },
            Config::default(),
        )?;

        Ok(Self {
            inner: Some(watcher),
            events: Some(rx),
        })
    }
}

impl Notifier for FsNotifier {
    fn add(&mut self, location: &Path) -> Result<()> {
        let watcher = self
            .inner
            .as_mut()
            .ok_or_else(|| WatchError::Notifier(notify::Error::generic("notifier is closed")))?;
        watcher.watch(location, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn remove(&mut self, location: &Path) -> Result<()> {
        let Some(watcher) = self.inner.as_mut() else {
            return Ok(());
        };
        match watcher.unwatch(location) {
            Ok(()) => Ok(()),
            Err(err) if matches!(err.kind, notify::ErrorKind::WatchNotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn events(&mut self) -> Result<EventStream> {
        self.events.take().ok_or(WatchError::EventsTaken)
    }

    fn close(&mut self) -> Result<()> {
        if self.inner.take().is_some() {
            debug!("native watcher released");
        }
        Ok(())
    }
}
