//! Infrastructure implementation of the remote session ports.
//!
//! `SshSession<R>` routes every remote command through the system `ssh`
//! client and every upload through `scp`, both via a `CommandRunner`.
//! With a connection password both are wrapped in `sshpass -e`, which reads
//! the password from the `SSHPASS` variable set on the runner.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, FileUpload, RemoteShell};
use crate::domain::config::SshConfig;
use crate::domain::{Credentials, RemoteCommand, Target};
use crate::infra::command_runner::TokioCommandRunner;

const SSHPASS_ENV: &str = "SSHPASS";

/// Infrastructure adapter for one target host.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct SshSession<R: CommandRunner> {
    runner: R,
    target: Target,
    options: Vec<String>,
    password_auth: bool,
}

impl<R: CommandRunner> SshSession<R> {
    /// `password_auth` must match whether `runner` carries `SSHPASS`.
    pub fn new(runner: R, target: Target, options: Vec<String>, password_auth: bool) -> Self {
        Self {
            runner,
            target,
            options,
            password_auth,
        }
    }

    fn common_options(&self, port_flag: &str) -> Vec<String> {
        let mut args = vec![port_flag.to_string(), self.target.port.to_string()];
        for opt in &self.options {
            args.push("-o".to_string());
            args.push(opt.clone());
        }
        if !self.password_auth {
            args.push("-o".to_string());
            args.push("BatchMode=yes".to_string());
        }
        args
    }

    /// Program and arguments that run `cmd` on the target.
    #[must_use]
    pub fn ssh_invocation(&self, cmd: &RemoteCommand) -> (&'static str, Vec<String>) {
        let mut args = self.common_options("-p");
        args.push(self.target.ssh_destination());
        args.push(cmd.render());
        self.wrap("ssh", args)
    }

    /// Program and arguments that copy `local` to `remote` on the target.
    #[must_use]
    pub fn scp_invocation(&self, local: &Path, remote: &str) -> (&'static str, Vec<String>) {
        let mut args = self.common_options("-P");
        args.push(local.display().to_string());
        args.push(self.target.scp_destination(remote));
        self.wrap("scp", args)
    }

    fn wrap(&self, program: &'static str, args: Vec<String>) -> (&'static str, Vec<String>) {
        if self.password_auth {
            let mut wrapped = vec!["-e".to_string(), program.to_string()];
            wrapped.extend(args);
            ("sshpass", wrapped)
        } else {
            (program, args)
        }
    }
}

impl SshSession<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn connect(target: Target, credentials: &Credentials, config: &SshConfig) -> Self {
        let mut runner = TokioCommandRunner::new(config.timeout_secs.map(Duration::from_secs));
        if let Some(password) = &credentials.password {
            runner = runner.with_env(SSHPASS_ENV, password.expose());
        }
        Self::new(
            runner,
            target,
            config.options.clone(),
            credentials.password.is_some(),
        )
    }
}

impl<R: CommandRunner> RemoteShell for SshSession<R> {
    async fn exec(&self, cmd: &RemoteCommand) -> Result<Output> {
        let (program, args) = self.ssh_invocation(cmd);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run(program, &args)
            .await
            .with_context(|| format!("ssh {}", self.target))
    }

    async fn exec_with_stdin(&self, cmd: &RemoteCommand, input: &[u8]) -> Result<Output> {
        let (program, args) = self.ssh_invocation(cmd);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_with_stdin(program, &args, input)
            .await
            .with_context(|| format!("ssh {}", self.target))
    }
}

impl<R: CommandRunner> FileUpload for SshSession<R> {
    async fn put(&self, local: &Path, remote: &str) -> Result<Output> {
        let (program, args) = self.scp_invocation(local, remote);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run(program, &args)
            .await
            .with_context(|| format!("scp to {}", self.target))
    }
}
