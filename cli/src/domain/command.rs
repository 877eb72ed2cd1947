//! Structured remote commands.
//!
//! A [`RemoteCommand`] is an argv list plus an optional working directory.
//! It is rendered to a single shell line only at the transport boundary,
//! with every element quoted, so hostnames, usernames and paths can never
//! be interpreted by the remote shell.

use std::fmt;

/// A command to run on the target host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    argv: Vec<String>,
    cwd: Option<String>,
}

impl RemoteCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            argv: vec![program.into()],
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    /// A script for `sh -c`. Only ever built from constants.
    #[must_use]
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    /// Run this command with its root redirected into `root`
    /// (`arch-chroot <root> <argv...>`).
    #[must_use]
    pub fn in_chroot(self, root: &str) -> Self {
        let mut argv = Vec::with_capacity(self.argv.len() + 2);
        argv.push("arch-chroot".to_string());
        argv.push(root.to_string());
        argv.extend(self.argv);
        Self { argv, cwd: self.cwd }
    }

    /// Run this command from `dir`.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    #[must_use]
    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    /// Render to one line for a POSIX shell on the far side.
    #[must_use]
    pub fn render(&self) -> String {
        let line = self
            .argv
            .iter()
            .map(|a| quote(a))
            .collect::<Vec<_>>()
            .join(" ");
        match &self.cwd {
            Some(dir) => format!("cd {} && {line}", quote(dir)),
            None => line,
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Quote one word for a POSIX shell.
///
/// Words made only of characters that no shell treats specially are left
/// bare; everything else is wrapped in single quotes, with embedded single
/// quotes written as `'\''`.
#[must_use]
pub fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_./=:,@%+-".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
