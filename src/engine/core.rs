// src/engine/core.rs

//! Pure coalescing state.
//!
//! [`Coalescer`] accumulates events and decides when a burst has settled.
//! It has no channels, no timers, and does not perform any IO; the caller
//! passes the current instant in. The async shell in `engine::runtime`
//! drives it from a ticker.

use std::mem;
use std::time::Duration;

use tokio::time::Instant;

use crate::watch::NotificationEvent;

/// Pending batch plus the time of its most recent event.
#[derive(Debug)]
pub struct Coalescer {
    window: Duration,
    pending: Vec<NotificationEvent>,
    last_event_at: Option<Instant>,
}

impl Coalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Vec::new(),
            last_event_at: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Append `event` in arrival order and restart the quiet period.
    pub fn push(&mut self, event: NotificationEvent, now: Instant) {
        self.pending.push(event);
        self.last_event_at = Some(now);
    }

    /// Take the batch if it is non-empty and strictly more than one window
    /// has passed since its last event.
    pub fn take_ready(&mut self, now: Instant) -> Option<Vec<NotificationEvent>> {
        let last = self.last_event_at?;
        if self.pending.is_empty() || now.saturating_duration_since(last) <= self.window {
            return None;
        }
        self.last_event_at = None;
        Some(mem::take(&mut self.pending))
    }

    /// Drop whatever is pending, returning how many events were dropped.
    pub fn discard(&mut self) -> usize {
        self.last_event_at = None;
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}
