// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod runner;
pub mod types;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate};
use crate::engine::watchers_from_config;
use crate::exec::OutputSink;
use crate::runner::Runner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file or on-the-fly flags)
/// - one watcher per configured entry
/// - the runner
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let watchers = watchers_from_config(&cfg, &OutputSink::stdout(), Some(&shutdown_rx))?;

    tokio::spawn(shutdown_on(tokio::signal::ctrl_c(), shutdown_tx));

    let report = Runner::new(watchers).run().await;

    if report.all_failed() {
        let reasons: Vec<String> = report
            .failed
            .iter()
            .map(|(name, err)| format!("{name}: {err}"))
            .collect();
        bail!("every watcher failed: {}", reasons.join("; "));
    }

    Ok(())
}

/// Flip `shutdown` to `true` once `signal` fires.
///
/// If listening for the signal fails, the error is logged and `shutdown` is
/// left alone: the watchers keep running until they stop on their own.
pub async fn shutdown_on<F>(signal: F, shutdown: tokio::sync::watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!("shutdown requested");
    let _ = shutdown.send(true);
}

/// On-the-fly flags win over the config file.
pub fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    if args.is_on_the_fly() {
        debug!("building on-the-fly watcher from flags");
        return ConfigFile::on_the_fly(args.on_the_fly_watcher())
            .context("invalid on-the-fly watcher");
    }

    let config_path = PathBuf::from(&args.config);
    load_and_validate(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))
}

/// Simple dry-run output: print each watcher's resolved settings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("watchrun dry-run");
    println!();

    println!("watchers ({}):", cfg.watchers().len());
    for watcher in cfg.watchers() {
        println!("  - {}", watcher.name);
        println!("      match: {}", watcher.match_spec);
        if let Some(ref filter) = watcher.filter {
            println!("      filter: {filter}");
        }
        if !watcher.command.is_empty() {
            println!("      command: {}", watcher.command);
        }
        println!("      executor: {}", watcher.executor);
        println!("      coalesce_window: {:?}", watcher.coalesce_window);
        if watcher.silent {
            println!("      silent: true");
        } else if watcher.debug {
            println!("      debug: true");
        }
    }

    debug!("dry-run complete (no watching)");
}
