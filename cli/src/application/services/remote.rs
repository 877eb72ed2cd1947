//! Checked remote execution helpers shared by the step library and the
//! account service.
//!
//! These turn a non-zero exit status into [`ProvisionError::CommandFailed`],
//! the "unhandled/propagating" failure class: the caller's `?` aborts the
//! rest of the workflow.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{FileUpload, RemoteShell};
use crate::domain::{ProvisionError, RemoteCommand};

/// Run `cmd` and require exit status 0.
///
/// # Errors
///
/// Returns an error if the command cannot be run or exits non-zero.
pub async fn run(shell: &impl RemoteShell, cmd: RemoteCommand) -> Result<Output> {
    tracing::debug!(command = %cmd, "remote exec");
    let output = shell
        .exec(&cmd)
        .await
        .with_context(|| format!("running {cmd}"))?;
    ensure_success(&cmd.render(), output)
}

/// Run `cmd` with `input` on stdin and require exit status 0.
/// `input` is never logged.
///
/// # Errors
///
/// Returns an error if the command cannot be run or exits non-zero.
pub async fn run_with_stdin(
    shell: &impl RemoteShell,
    cmd: RemoteCommand,
    input: &[u8],
) -> Result<Output> {
    tracing::debug!(command = %cmd, stdin_bytes = input.len(), "remote exec with stdin");
    let output = shell
        .exec_with_stdin(&cmd, input)
        .await
        .with_context(|| format!("running {cmd}"))?;
    ensure_success(&cmd.render(), output)
}

/// Upload `local` to `remote` and require success.
///
/// # Errors
///
/// Returns an error if the transfer cannot be started or fails.
pub async fn put(session: &impl FileUpload, local: &Path, remote: &str) -> Result<()> {
    tracing::debug!(local = %local.display(), remote, "upload");
    let output = session
        .put(local, remote)
        .await
        .with_context(|| format!("uploading {} to {remote}", local.display()))?;
    ensure_success(&format!("upload {} -> {remote}", local.display()), output)?;
    Ok(())
}

/// Run `cmd` and ignore its exit status (best-effort commands).
///
/// Returns whether it succeeded; transport failures count as `false`.
pub async fn run_tolerant(shell: &impl RemoteShell, cmd: RemoteCommand) -> bool {
    tracing::debug!(command = %cmd, "remote exec (failure tolerated)");
    match shell.exec(&cmd).await {
        Ok(o) if o.status.success() => true,
        Ok(o) => {
            tracing::warn!(command = %cmd, code = ?o.status.code(), "ignored failure");
            false
        }
        Err(e) => {
            tracing::warn!(command = %cmd, error = %e, "ignored failure");
            false
        }
    }
}

fn ensure_success(command: &str, output: Output) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    let code = output
        .status
        .code()
        .map_or_else(|| "signal".to_string(), |c| c.to_string());
    Err(ProvisionError::CommandFailed {
        command: command.to_string(),
        code,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
    .into())
}
