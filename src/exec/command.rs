// src/exec/command.rs

//! Shell command execution for toolchain actions.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::ActionReport;
use crate::types::ActionKind;

/// Run `cmd` through the platform shell in `cwd` and wait for it.
///
/// Stdout is logged at debug level; stderr is captured and returned as the
/// report output when the command fails. The child is killed if the
/// returned future is dropped (e.g. on timeout).
pub async fn run_shell(action: ActionKind, cmd: &str, cwd: &Path) -> Result<ActionReport> {
    info!(%action, %cmd, cwd = %cwd.display(), "starting action process");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for action '{action}'"))?;

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(%action, "stdout: {}", line);
            }
        });
    }

    let stderr_task = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of action '{action}'"))?;

    let stderr = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    info!(
        %action,
        exit_code = ?status.code(),
        success = status.success(),
        "action process exited"
    );

    if status.success() {
        if !stderr.trim().is_empty() {
            debug!(%action, "stderr: {}", stderr.trim());
        }
        Ok(ActionReport::success())
    } else {
        Ok(ActionReport::failed(status.code(), stderr))
    }
}
