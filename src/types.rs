// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use serde::Deserialize;

/// Default coalescing window for a watcher.
pub const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_millis(250);

/// Which executor runs a watcher's command.
///
/// - `UnixShell`: render the command template and run it via `sh -c`
///   (default).
/// - `Raw`: render the template and run it directly, split on whitespace.
/// - `Stdout`: print the triggering path instead of running anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum ExecutorKind {
    #[default]
    UnixShell,
    Raw,
    Stdout,
}

impl ExecutorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorKind::UnixShell => "unixshell",
            ExecutorKind::Raw => "raw",
            ExecutorKind::Stdout => "stdout",
        }
    }

    /// Whether this executor needs a command template.
    pub fn needs_command(&self) -> bool {
        !matches!(self, ExecutorKind::Stdout)
    }
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unixshell" => Ok(ExecutorKind::UnixShell),
            "raw" => Ok(ExecutorKind::Raw),
            "stdout" => Ok(ExecutorKind::Stdout),
            other => Err(format!(
                "invalid executor: {other} (expected \"unixshell\", \"raw\" or \"stdout\")"
            )),
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = |factor: u64| {
        value
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{s}' is too large"))
    };
    let duration = match unit.as_str() {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => secs(60)?,
        "h" => secs(60 * 60)?,
        _ => {
            return Err(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            ));
        }
    };

    if duration.is_zero() {
        return Err(format!("duration '{s}' must be greater than zero"));
    }
    if !fits_instant(duration) {
        return Err(format!("duration '{s}' is too large"));
    }

    Ok(duration)
}

/// Whether `duration` can be added to the current instant without overflow.
pub fn fits_instant(duration: Duration) -> bool {
    Instant::now().checked_add(duration).is_some()
}
