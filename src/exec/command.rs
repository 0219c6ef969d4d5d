// src/exec/command.rs

//! Command templates.
//!
//! Four placeholders are supported, nothing else:
//!
//! | token         | replaced by                                  |
//! |---------------|----------------------------------------------|
//! | `%match`      | the watcher's match specification            |
//! | `%filter`     | the watcher's filter pattern (may be empty)  |
//! | `%event.file` | cleaned path of the triggering event         |
//! | `%event.op`   | notification names, e.g. `WRITE\|CHMOD`      |
//!
//! `%match` and `%filter` are fixed per watcher and bound once at
//! construction with [`CommandTemplate::bind_watcher`].

use std::fmt;

use crate::watch::NotificationEvent;

pub const MATCH_TOKEN: &str = "%match";
pub const FILTER_TOKEN: &str = "%filter";
pub const EVENT_FILE_TOKEN: &str = "%event.file";
pub const EVENT_OP_TOKEN: &str = "%event.op";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandTemplate {
    template: String,
}

impl CommandTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute the per-watcher placeholders.
    pub fn bind_watcher(&self, match_spec: &str, filter: &str) -> Self {
        Self::new(
            self.template
                .replace(MATCH_TOKEN, match_spec)
                .replace(FILTER_TOKEN, filter),
        )
    }

    /// Substitute the per-event placeholders.
    pub fn render(&self, event: &NotificationEvent, path: &str) -> String {
        self.template
            .replace(EVENT_FILE_TOKEN, path)
            .replace(EVENT_OP_TOKEN, &event.notification.to_string())
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
