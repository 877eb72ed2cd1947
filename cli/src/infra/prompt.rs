//! Terminal implementations of the operator interaction ports.

use anyhow::{Context, Result};

use crate::application::ports::{Confirmer, SecretPrompt};
use crate::domain::Secret;
use crate::domain::validate::validate_password;

/// Reads answers and secrets from the controlling terminal.
pub struct TerminalPrompt;

impl Confirmer for TerminalPrompt {
    fn ask(&self, prompt: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .context("cannot read confirmation (is a terminal attached?)")
    }
}

impl SecretPrompt for TerminalPrompt {
    fn secret(&self, prompt: &str, confirm: bool) -> Result<Secret> {
        let mut input = dialoguer::Password::new().with_prompt(prompt);
        if confirm {
            input = input.with_confirmation("Repeat", "Values do not match");
        }
        let value = input
            .interact()
            .context("cannot read password (is a terminal attached?)")?;
        validate_password(&value)?;
        Ok(Secret::new(value))
    }
}
