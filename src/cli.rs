// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::RawWatcherConfig;
use crate::types::ExecutorKind;

/// Command-line arguments for `watchrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchrun",
    version,
    about = "Run commands when watched files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Ignored when `--match` or `--command` is given.
    #[arg(long, value_name = "PATH", default_value = "watchrun.toml")]
    pub config: String,

    /// File, directory or glob to watch.
    #[arg(long = "match", value_name = "SPEC")]
    pub match_spec: Option<String>,

    /// Only trigger for paths matching this regex.
    #[arg(long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Command to run. Supports %match, %filter, %event.file and %event.op.
    #[arg(long, value_name = "TEMPLATE")]
    pub command: Option<String>,

    /// How to run the command.
    #[arg(long, value_enum, value_name = "KIND")]
    pub executor: Option<ExecutorKind>,

    /// Quiet period before a burst of events triggers (e.g. 250ms, 1s).
    #[arg(long, value_name = "DURATION")]
    pub coalesce_window: Option<String>,

    /// Print per-event diagnostics for the watcher.
    #[arg(long)]
    pub debug: bool,

    /// Print nothing for the watcher. Wins over `--debug`.
    #[arg(long)]
    pub silent: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the watchers, but don't watch anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Whether the flags describe a watcher instead of pointing at a file.
    pub fn is_on_the_fly(&self) -> bool {
        self.match_spec.is_some() || self.command.is_some()
    }

    /// The on-the-fly watcher described by the flags.
    pub fn on_the_fly_watcher(&self) -> RawWatcherConfig {
        RawWatcherConfig {
            match_spec: self.match_spec.clone(),
            filter: self.filter.clone(),
            command: self.command.clone(),
            executor: self.executor,
            debug: Some(self.debug),
            silent: Some(self.silent),
            coalesce_window: self.coalesce_window.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
