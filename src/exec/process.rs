// src/exec/process.rs

//! Executors that run the watcher's command as a child process.

use tracing::debug;

use crate::exec::backend::{ExecFuture, Executor, RunningFlag};
use crate::exec::command::CommandTemplate;
use crate::exec::output::OutputSink;
use crate::exec::task_runner::run_command;
use crate::watch::NotificationEvent;

/// Runs the rendered command through the platform shell (`sh -c`).
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    template: CommandTemplate,
    output: OutputSink,
    running: RunningFlag,
}

impl ShellExecutor {
    pub fn new(template: CommandTemplate, output: OutputSink) -> Self {
        Self {
            template,
            output,
            running: RunningFlag::new(),
        }
    }
}

impl Executor for ShellExecutor {
    fn running(&self) -> bool {
        self.running.is_running()
    }

    fn exec(&self, event: &NotificationEvent, path: &str) -> ExecFuture {
        let command = self.template.render(event, path);
        let guard = self.running.start();
        let output = self.output.clone();

        Box::pin(async move {
            let _guard = guard;
            let (program, args) = shell_invocation(&command);
            debug!(%command, "running via shell");
            run_command(program, &args, &command, &output).await
        })
    }
}

#[cfg(windows)]
fn shell_invocation(command: &str) -> (&'static str, Vec<String>) {
    ("cmd", vec!["/C".to_string(), command.to_string()])
}

#[cfg(not(windows))]
fn shell_invocation(command: &str) -> (&'static str, Vec<String>) {
    ("sh", vec!["-c".to_string(), command.to_string()])
}

/// Runs the rendered command directly, without a shell.
///
/// The command is split on whitespace; the first word is the program and the
/// rest are its arguments. No quoting rules apply.
#[derive(Debug, Clone)]
pub struct RawExecutor {
    template: CommandTemplate,
    output: OutputSink,
    running: RunningFlag,
}

impl RawExecutor {
    pub fn new(template: CommandTemplate, output: OutputSink) -> Self {
        Self {
            template,
            output,
            running: RunningFlag::new(),
        }
    }
}

impl Executor for RawExecutor {
    fn running(&self) -> bool {
        self.running.is_running()
    }

    fn exec(&self, event: &NotificationEvent, path: &str) -> ExecFuture {
        let command = self.template.render(event, path);
        let guard = self.running.start();
        let output = self.output.clone();

        Box::pin(async move {
            let _guard = guard;
            let mut words = command.split_whitespace().map(str::to_string);
            let Some(program) = words.next() else {
                debug!("rendered command is empty; nothing to run");
                return Ok(());
            };
            let args: Vec<String> = words.collect();
            run_command(&program, &args, &command, &output).await
        })
    }
}
