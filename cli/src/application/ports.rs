//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{Artifact, ArchsmithConfig, RemoteCommand, Secret};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts local process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with stdin piped from `input`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output>;
}

// ── Remote Session Ports ──────────────────────────────────────────────────────

/// Command execution on the target host.
///
/// A non-zero exit status is NOT an error at this level: implementations
/// return `Ok(output)` and callers decide. `Err` means the command could
/// not be run at all (transport failure, timeout).
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `cmd` and capture its output.
    async fn exec(&self, cmd: &RemoteCommand) -> Result<Output>;
    /// Run `cmd` with stdin piped from `input`. Used for secrets.
    async fn exec_with_stdin(&self, cmd: &RemoteCommand, input: &[u8]) -> Result<Output>;
}

/// Host-to-target file transfer.
#[allow(async_fn_in_trait)]
pub trait FileUpload {
    /// Upload `local` to the absolute path `remote`, overwriting it.
    async fn put(&self, local: &Path, remote: &str) -> Result<Output>;
}

/// Composite trait — a live connection to one target.
pub trait RemoteSession: RemoteShell + FileUpload {
    /// A view of this session whose commands run from `dir`.
    fn in_dir(&self, dir: &str) -> WorkingDir<'_, Self>
    where
        Self: Sized,
    {
        WorkingDir {
            session: self,
            dir: dir.to_string(),
        }
    }
}

/// Blanket implementation: anything that can run commands and upload files.
impl<T> RemoteSession for T where T: RemoteShell + FileUpload {}

// ── WorkingDir ────────────────────────────────────────────────────────────────

/// A scoped view of a session with a fixed remote working directory.
///
/// Every remote invocation is a fresh shell, so the directory change never
/// outlives a single command; dropping the view is the restoration.
/// Uploads go through unchanged and must use absolute paths.
pub struct WorkingDir<'a, S> {
    session: &'a S,
    dir: String,
}

impl<S: RemoteShell> RemoteShell for WorkingDir<'_, S> {
    async fn exec(&self, cmd: &RemoteCommand) -> Result<Output> {
        self.session.exec(&cmd.clone().in_dir(&self.dir)).await
    }

    async fn exec_with_stdin(&self, cmd: &RemoteCommand, input: &[u8]) -> Result<Output> {
        self.session
            .exec_with_stdin(&cmd.clone().in_dir(&self.dir), input)
            .await
    }
}

impl<S: FileUpload> FileUpload for WorkingDir<'_, S> {
    async fn put(&self, local: &Path, remote: &str) -> Result<Output> {
        self.session.put(local, remote).await
    }
}

// ── Operator Interaction Ports ────────────────────────────────────────────────

/// Source of the operator's answer to the destructive-operation prompt.
pub trait Confirmer {
    /// Show `prompt` and return the raw answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read (e.g. no TTY).
    fn ask(&self, prompt: &str) -> Result<String>;
}

/// Non-echoing secret input.
pub trait SecretPrompt {
    /// Read a secret. With `confirm`, the value is asked twice and must match.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn secret(&self, prompt: &str, confirm: bool) -> Result<Secret>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Show multi-line remote output the operator should look at.
    fn detail(&self, text: &str);
}

// ── Configuration and Local File Ports ────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<ArchsmithConfig>;
    /// Persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &ArchsmithConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

/// Locates the local files that get uploaded to the target.
pub trait ArtifactSource {
    /// Local path of `artifact`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ProvisionError::MissingArtifact`] when the
    /// file is absent and has no built-in default.
    fn resolve(&self, artifact: Artifact) -> Result<PathBuf>;
}
