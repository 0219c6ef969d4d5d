// src/config/mod.rs

//! Configuration loading and validation for watchrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it and resolve `[defaults]` into each watcher (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_and_validate};
pub use model::{
    ConfigFile, DefaultsSection, ON_THE_FLY_WATCHER, RawConfigFile, RawWatcherConfig,
    WatcherConfig,
};
pub use validate::validate_config;
