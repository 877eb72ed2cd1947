//! Application context — unified state passed to every command handler.
//!
//! Adding a new cross-cutting concern requires only one field change
//! here; command signatures stay the same.

use anyhow::Result;

use crate::application::ports::{ConfigStore, SecretPrompt};
use crate::domain::validate::validate_password;
use crate::domain::{ArchsmithConfig, Credentials, ProvisionError, Secret};
use crate::infra::config::YamlConfigStore;
use crate::infra::prompt::TerminalPrompt;
use crate::output::OutputContext;

/// Environment variable holding the connection password.
pub const PASSWORD_ENV: &str = "ARCHSMITH_PASSWORD";

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Configuration persistence.
    pub config_store: YamlConfigStore,
    /// Confirmation and password prompts.
    pub prompt: TerminalPrompt,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config_store: YamlConfigStore::new(),
            prompt: TerminalPrompt,
        }
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or holds invalid values.
    pub fn config(&self) -> Result<ArchsmithConfig> {
        let config = self.config_store.load()?;
        config.validate()?;
        Ok(config)
    }

    /// The connection password: `$ARCHSMITH_PASSWORD`, else a non-echoing
    /// prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable holds an invalid value or the
    /// prompt cannot be shown.
    pub fn password(&self, prompt: &str) -> Result<Secret> {
        match std::env::var(PASSWORD_ENV) {
            Ok(value) if !value.is_empty() => {
                validate_password(&value)?;
                tracing::debug!("connection password taken from environment");
                Ok(Secret::new(value))
            }
            _ => self
                .prompt
                .secret(prompt, false)
                .map_err(|e| e.context(ProvisionError::MissingPassword)),
        }
    }

    /// Credentials for a session that may use key auth: password auth only
    /// with `ask_pass` or when `$ARCHSMITH_PASSWORD` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if password auth is wanted and no password is
    /// available.
    pub fn credentials(&self, ask_pass: bool) -> Result<Credentials> {
        let from_env = std::env::var_os(PASSWORD_ENV).is_some_and(|v| !v.is_empty());
        if ask_pass || from_env {
            Ok(Credentials::with_password(
                self.password("Connection password")?,
            ))
        } else {
            Ok(Credentials::key_only())
        }
    }
}
