// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::ExecutorKind;

/// Name of the single watcher built from command-line flags.
pub const ON_THE_FLY_WATCHER: &str = "on the fly";

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [defaults]
/// executor = "unixshell"
/// coalesce_window = "250ms"
///
/// [watcher.build]
/// match = "src"
/// filter = '.*\.rs$'
/// command = "cargo build"
/// ```
///
/// All sections are optional at this level; [`ConfigFile`] is what the rest
/// of the crate consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Settings inherited by every watcher, from `[defaults]`.
    #[serde(default)]
    pub defaults: DefaultsSection,

    /// All watchers from `[watcher.<name>]`, keyed by name.
    #[serde(default)]
    pub watcher: BTreeMap<String, RawWatcherConfig>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub silent: bool,

    #[serde(default)]
    pub executor: ExecutorKind,

    /// Duration string such as `"250ms"`.
    #[serde(default)]
    pub coalesce_window: Option<String>,
}

/// `[watcher.<name>]` section. Unset fields fall back to `[defaults]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWatcherConfig {
    /// File, directory or glob to watch. Defaults to `"."`.
    #[serde(rename = "match", default)]
    pub match_spec: Option<String>,

    /// Regex a changed path must match to trigger.
    #[serde(default)]
    pub filter: Option<String>,

    /// Command template; required unless the executor is `stdout`.
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub executor: Option<ExecutorKind>,

    #[serde(default)]
    pub debug: Option<bool>,

    #[serde(default)]
    pub silent: Option<bool>,

    #[serde(default)]
    pub coalesce_window: Option<String>,
}

/// Validated configuration. Build one with `ConfigFile::try_from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    watchers: Vec<WatcherConfig>,
}

/// Fully resolved settings for one watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    pub name: String,
    pub match_spec: String,
    /// `None` when unset or empty: accept every path.
    pub filter: Option<String>,
    /// Empty only for the `stdout` executor.
    pub command: String,
    pub executor: ExecutorKind,
    pub debug: bool,
    pub silent: bool,
    pub coalesce_window: Duration,
}

impl ConfigFile {
    /// Only `validate.rs` should call this; everything else goes through
    /// `TryFrom<RawConfigFile>`.
    pub(crate) fn new_unchecked(watchers: Vec<WatcherConfig>) -> Self {
        Self { watchers }
    }

    /// Watchers in name order.
    pub fn watchers(&self) -> &[WatcherConfig] {
        &self.watchers
    }

    pub fn watcher(&self, name: &str) -> Option<&WatcherConfig> {
        self.watchers.iter().find(|w| w.name == name)
    }

    /// Configuration with a single watcher named [`ON_THE_FLY_WATCHER`],
    /// validated like a file.
    pub fn on_the_fly(watcher: RawWatcherConfig) -> crate::errors::Result<Self> {
        let mut raw = RawConfigFile::default();
        raw.watcher.insert(ON_THE_FLY_WATCHER.to_string(), watcher);
        Self::try_from(raw)
    }
}
