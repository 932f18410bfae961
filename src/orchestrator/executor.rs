//! Long-running tool execution with line-by-line output streaming.
//!
//! The freeze step can run for minutes; its stdout and stderr are read
//! concurrently and handed to a callback as lines arrive so the log shows
//! progress while the child is still running.

use crate::error::AppError;
use crate::system::ToolInvocation;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Which pipe a streamed line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Spawn `invocation`, feed every output line to `on_line`, and wait for exit.
///
/// # Returns
/// * `Ok(Some(code))` when the child exited normally
/// * `Ok(None)` when it was terminated by a signal
/// * `Err(AppError)` when it could not be spawned or awaited
pub async fn run_streaming<F>(
    invocation: &ToolInvocation,
    mut on_line: F,
) -> Result<Option<i32>, AppError>
where
    F: FnMut(StreamKind, &str),
{
    if invocation.program.as_os_str().is_empty() {
        return Err(AppError::InvalidInput("empty program name".to_string()));
    }

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args);
    if let Some(dir) = &invocation.current_dir {
        command.current_dir(dir);
    }
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.kill_on_drop(true);

    log::debug!("[Executor] Spawning: {}", invocation.program.display());

    let mut child = command.spawn().map_err(|e| AppError::OsCommand {
        cmd: invocation.program.display().to_string(),
        reason: e.to_string(),
    })?;

    let stdout = child.stdout.take().ok_or_else(|| AppError::OsCommand {
        cmd: invocation.program.display().to_string(),
        reason: "failed to capture stdout".to_string(),
    })?;
    let stderr = child.stderr.take().ok_or_else(|| AppError::OsCommand {
        cmd: invocation.program.display().to_string(),
        reason: "failed to capture stderr".to_string(),
    })?;

    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();
    let mut stdout_closed = false;
    let mut stderr_closed = false;

    while !(stdout_closed && stderr_closed) {
        tokio::select! {
            line = stdout_lines.next_line(), if !stdout_closed => match line {
                Ok(Some(line)) => on_line(StreamKind::Stdout, &line),
                Ok(None) => stdout_closed = true,
                Err(e) => {
                    log::warn!("[Executor] stdout read error: {}", e);
                    stdout_closed = true;
                }
            },
            line = stderr_lines.next_line(), if !stderr_closed => match line {
                Ok(Some(line)) => on_line(StreamKind::Stderr, &line),
                Ok(None) => stderr_closed = true,
                Err(e) => {
                    log::warn!("[Executor] stderr read error: {}", e);
                    stderr_closed = true;
                }
            },
        }
    }

    let status = child.wait().await.map_err(|e| AppError::OsCommand {
        cmd: invocation.program.display().to_string(),
        reason: e.to_string(),
    })?;

    log::debug!("[Executor] {} exited: {}", invocation.program.display(), status);
    Ok(status.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_program_rejected() {
        let result = run_streaming(&ToolInvocation::new(""), |_, _| {}).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let inv = ToolInvocation::new("freezepack-no-such-tool-xyz");
        let result = run_streaming(&inv, |_, _| {}).await;
        assert!(matches!(result, Err(AppError::OsCommand { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_streams_both_pipes_and_returns_code() {
        let inv = ToolInvocation::new("sh")
            .arg("-c")
            .arg("echo a; echo b 1>&2; echo c; exit 3");

        let mut lines = Vec::new();
        let code = run_streaming(&inv, |kind, line| lines.push((kind, line.to_string())))
            .await
            .unwrap();

        assert_eq!(code, Some(3));
        let stdout: Vec<&str> = lines
            .iter()
            .filter(|(k, _)| *k == StreamKind::Stdout)
            .map(|(_, l)| l.as_str())
            .collect();
        assert_eq!(stdout, vec!["a", "c"]);
        assert!(lines.contains(&(StreamKind::Stderr, "b".to_string())));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("marker.txt"), "").unwrap();
        let inv = ToolInvocation::new("ls").current_dir(temp_dir.path());

        let mut seen = Vec::new();
        let code = run_streaming(&inv, |_, line| seen.push(line.to_string()))
            .await
            .unwrap();
        assert_eq!(code, Some(0));
        assert_eq!(seen, vec!["marker.txt"]);
    }
}
