//! Safety gate: identity check plus explicit operator intent.
//!
//! Both checks run before the first remote command of a destructive run.

use anyhow::Result;

use crate::application::ports::{Confirmer, ProgressReporter};
use crate::domain::validate::is_affirmative;
use crate::domain::{ProvisionError, Target};

pub const CONFIRM_PROMPT: &str = "Are you sure? (y/N)";

/// Refuse targets that resolve to the local machine.
///
/// # Errors
///
/// Returns [`ProvisionError::LoopbackTarget`] for loopback targets.
pub fn check_target(target: &Target) -> Result<(), ProvisionError> {
    if target.is_loopback() {
        tracing::warn!(target = %target, "refusing loopback target");
        return Err(ProvisionError::LoopbackTarget(target.host.clone()));
    }
    Ok(())
}

/// Identity check, then the destructive-operation prompt.
///
/// Returns `Ok(false)` when the operator declines; that is a normal
/// outcome, not an error.
///
/// # Errors
///
/// Returns an error for loopback targets or if the answer cannot be read.
pub fn authorize(
    target: &Target,
    confirmer: &impl Confirmer,
    reporter: &impl ProgressReporter,
) -> Result<bool> {
    check_target(target)?;
    reporter.warn(&format!(
        "About to provision {}.\nThis is a destructive operation.",
        target.host
    ));
    let answer = confirmer.ask(CONFIRM_PROMPT)?;
    let granted = is_affirmative(&answer);
    tracing::info!(target = %target, granted, "destructive run authorization");
    Ok(granted)
}
