// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::watch::event::EventError;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("bad match specification '{spec}': {source}")]
    BadMatchSpec {
        spec: String,
        #[source]
        source: std::io::Error,
    },

    #[error("empty glob: {0}")]
    EmptyGlob(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("match specification '{0}' resolved to no locations")]
    NoLocations(String),

    #[error("invalid filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("watcher '{0}' was already started")]
    AlreadyStarted(String),

    #[error("on match {}: {source}", location.display())]
    Register {
        location: PathBuf,
        #[source]
        source: Box<WatchError>,
    },

    #[error("notifier: {0}")]
    Notifier(#[from] notify::Error),

    #[error("notifier stopped: {0}")]
    NotifierStopped(#[source] EventError),

    #[error("coalescing task failed: {0}")]
    CoalescerFailed(#[source] tokio::task::JoinError),

    #[error("notifier event stream already taken")]
    EventsTaken,

    #[error("spawning '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{command}' exited with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;
