use std::path::PathBuf;

use watchrun::config::{ConfigFile, RawConfigFile, RawWatcherConfig};
use watchrun::types::ExecutorKind;
use watchrun::watch::{FileType, Notification, NotificationEvent};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_watcher(mut self, name: &str, watcher: RawWatcherConfig) -> Self {
        self.config.watcher.insert(name.to_string(), watcher);
        self
    }

    pub fn with_default_executor(mut self, executor: ExecutorKind) -> Self {
        self.config.defaults.executor = executor;
        self
    }

    pub fn with_default_window(mut self, window: &str) -> Self {
        self.config.defaults.coalesce_window = Some(window.to_string());
        self
    }

    pub fn with_default_debug(mut self, debug: bool) -> Self {
        self.config.defaults.debug = debug;
        self
    }

    pub fn with_default_silent(mut self, silent: bool) -> Self {
        self.config.defaults.silent = silent;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawWatcherConfig`.
pub struct WatcherConfigBuilder {
    watcher: RawWatcherConfig,
}

impl WatcherConfigBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            watcher: RawWatcherConfig {
                command: Some(command.to_string()),
                ..RawWatcherConfig::default()
            },
        }
    }

    pub fn without_command() -> Self {
        Self {
            watcher: RawWatcherConfig::default(),
        }
    }

    pub fn match_spec(mut self, spec: &str) -> Self {
        self.watcher.match_spec = Some(spec.to_string());
        self
    }

    pub fn filter(mut self, filter: &str) -> Self {
        self.watcher.filter = Some(filter.to_string());
        self
    }

    pub fn executor(mut self, executor: ExecutorKind) -> Self {
        self.watcher.executor = Some(executor);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.watcher.debug = Some(debug);
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.watcher.silent = Some(silent);
        self
    }

    pub fn coalesce_window(mut self, window: &str) -> Self {
        self.watcher.coalesce_window = Some(window.to_string());
        self
    }

    pub fn build(self) -> RawWatcherConfig {
        self.watcher
    }
}

/// Event on a regular file.
pub fn file_event(path: &str, notification: Notification) -> NotificationEvent {
    NotificationEvent::new(PathBuf::from(path), notification, FileType::File)
}

/// Event on a directory.
pub fn dir_event(path: &str, notification: Notification) -> NotificationEvent {
    NotificationEvent::new(PathBuf::from(path), notification, FileType::Directory)
}

pub fn write(path: &str) -> NotificationEvent {
    file_event(path, Notification::WRITE)
}
