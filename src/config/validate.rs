// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, DefaultsSection, RawConfigFile, RawWatcherConfig, WatcherConfig};
use crate::errors::{Result, WatchError};
use crate::types::{DEFAULT_COALESCE_WINDOW, parse_duration};
use crate::watch::RegexFilter;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)
    }
}

/// Check every invariant and resolve defaults.
pub fn validate_config(raw: &RawConfigFile) -> Result<ConfigFile> {
    ensure_has_watchers(raw)?;

    let default_window = match raw.defaults.coalesce_window.as_deref() {
        Some(s) => parse_window("[defaults]", s)?,
        None => DEFAULT_COALESCE_WINDOW,
    };

    let watchers = raw
        .watcher
        .iter()
        .map(|(name, watcher)| resolve_watcher(name, watcher, &raw.defaults, default_window))
        .collect::<Result<Vec<_>>>()?;

    Ok(ConfigFile::new_unchecked(watchers))
}

fn ensure_has_watchers(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watcher.is_empty() {
        return Err(WatchError::ConfigError(
            "config must contain at least one [watcher.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn resolve_watcher(
    name: &str,
    raw: &RawWatcherConfig,
    defaults: &DefaultsSection,
    default_window: Duration,
) -> Result<WatcherConfig> {
    let executor = raw.executor.unwrap_or(defaults.executor);

    let match_spec = raw.match_spec.clone().unwrap_or_else(|| ".".to_string());
    if match_spec.trim().is_empty() {
        return Err(WatchError::ConfigError(format!(
            "watcher '{name}' has an empty `match`"
        )));
    }

    let command = raw.command.clone().unwrap_or_default();
    if executor.needs_command() && command.trim().is_empty() {
        return Err(WatchError::ConfigError(format!(
            "watcher '{name}' needs a `command` for the {executor} executor"
        )));
    }

    let filter = raw.filter.clone().filter(|f| !f.is_empty());
    if let Some(pattern) = filter.as_deref() {
        RegexFilter::new(pattern)?;
    }

    let coalesce_window = match raw.coalesce_window.as_deref() {
        Some(s) => parse_window(&format!("watcher '{name}'"), s)?,
        None => default_window,
    };

    Ok(WatcherConfig {
        name: name.to_string(),
        match_spec,
        filter,
        command,
        executor,
        debug: raw.debug.unwrap_or(defaults.debug),
        silent: raw.silent.unwrap_or(defaults.silent),
        coalesce_window,
    })
}

fn parse_window(section: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| {
        WatchError::ConfigError(format!("{section}: invalid coalesce_window: {e}"))
    })
}
