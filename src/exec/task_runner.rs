// src/exec/task_runner.rs

//! Child process runner shared by the process-backed executors.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::{Result, WatchError};
use crate::exec::output::OutputSink;

/// Run `program` with `args` to completion, streaming its stdout and stderr
/// line by line into `output`.
///
/// `label` is the human form of the command, used in logs and errors.
/// A non-zero exit is [`WatchError::CommandFailed`]. The child is killed if
/// the returned future is dropped before it exits.
pub async fn run_command(
    program: &str,
    args: &[String],
    label: &str,
    output: &OutputSink,
) -> Result<()> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| WatchError::Spawn {
        command: label.to_string(),
        source,
    })?;

    info!(command = %label, pid = ?child.id(), "started command");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Always drain both pipes so the child never blocks on a full buffer.
    let (status, (), ()) = tokio::join!(
        child.wait(),
        forward_lines(stdout, output),
        forward_lines(stderr, output),
    );
    let status = status?;

    debug!(
        command = %label,
        exit_code = ?status.code(),
        success = status.success(),
        "command exited"
    );

    if status.success() {
        Ok(())
    } else {
        Err(WatchError::CommandFailed {
            command: label.to_string(),
            status,
        })
    }
}

async fn forward_lines<R>(reader: Option<R>, output: &OutputSink)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    // Raw bytes: command output need not be UTF-8. The pipe is drained to
    // EOF whatever happens to the sink, so the child never sees SIGPIPE.
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut write_failed = false;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if let Err(err) = output.write_bytes(&buf) {
                    if !write_failed {
                        warn!(error = %err, "failed to write command output; discarding");
                        write_failed = true;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to read command output");
                break;
            }
        }
    }
}
