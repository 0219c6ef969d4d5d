use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use watchrun::errors::{Result, WatchError};
use watchrun::watch::{EventStream, Notifier, NotificationEvent};

#[derive(Debug, Default)]
struct NotifierState {
    added: Vec<PathBuf>,
    removed: Vec<PathBuf>,
    closes: usize,
    sender: Option<mpsc::UnboundedSender<NotificationEvent>>,
}

/// A notifier whose events are injected by the test through a
/// [`NotifierHandle`], and which records every call made on it.
#[derive(Debug)]
pub struct ScriptedNotifier {
    state: Arc<Mutex<NotifierState>>,
    events: Option<EventStream>,
    fail_add: Option<PathBuf>,
}

/// Test-side view of a [`ScriptedNotifier`].
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    state: Arc<Mutex<NotifierState>>,
}

impl ScriptedNotifier {
    pub fn new() -> (Self, NotifierHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(NotifierState {
            sender: Some(tx),
            ..NotifierState::default()
        }));

        let notifier = Self {
            state: Arc::clone(&state),
            events: Some(rx),
            fail_add: None,
        };
        (notifier, NotifierHandle { state })
    }

    /// `add(path)` fails for this path.
    pub fn fail_on_add(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_add = Some(path.into());
        self
    }
}

impl Notifier for ScriptedNotifier {
    fn add(&mut self, location: &Path) -> Result<()> {
        if self.fail_add.as_deref() == Some(location) {
            return Err(WatchError::IoError(std::io::Error::other(
                "scripted add failure",
            )));
        }
        self.state.lock().unwrap().added.push(location.to_path_buf());
        Ok(())
    }

    fn remove(&mut self, location: &Path) -> Result<()> {
        self.state.lock().unwrap().removed.push(location.to_path_buf());
        Ok(())
    }

    fn events(&mut self) -> Result<EventStream> {
        self.events.take().ok_or(WatchError::EventsTaken)
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.closes += 1;
        state.sender = None;
        Ok(())
    }
}

impl NotifierHandle {
    /// Inject an event. Returns false once the notifier is closed.
    pub fn send(&self, event: NotificationEvent) -> bool {
        match self.state.lock().unwrap().sender.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// End the event stream without closing the notifier.
    pub fn end_stream(&self) {
        self.state.lock().unwrap().sender = None;
    }

    pub fn added(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().added.clone()
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().removed.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }
}
