//! Create a login account on an already-installed, booted machine.
//!
//! Not part of either profile. The sub-operations are not atomic: when one
//! fails the error lists those already done, and nothing is undone.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteSession};
use crate::application::services::remote::{put, run, run_with_stdin};
use crate::application::services::safety;
use crate::domain::validate::validate_username;
use crate::domain::{RemoteCommand, Secret, Target};

/// The account to create.
pub struct NewAccount<'a> {
    pub username: &'a str,
    pub password: &'a Secret,
    /// Add to the admin group.
    pub admin: bool,
    pub shell: &'a str,
    pub admin_group: &'a str,
    pub authorized_keys: &'a Path,
}

/// Create the account, its password and its SSH keys.
///
/// # Errors
///
/// Returns an error for loopback targets or invalid usernames before any
/// remote command, or the first failing sub-operation, annotated with the
/// ones that already completed.
pub async fn create_user_account(
    session: &impl RemoteSession,
    reporter: &impl ProgressReporter,
    target: &Target,
    account: &NewAccount<'_>,
) -> Result<()> {
    safety::check_target(target)?;
    validate_username(account.username)?;

    let mut done: Vec<&'static str> = Vec::new();
    if let Err(e) = create(session, reporter, account, &mut done).await {
        let state = if done.is_empty() {
            format!("user '{}' was not created", account.username)
        } else {
            format!(
                "user '{}' is partially set up; completed: {}",
                account.username,
                done.join(", ")
            )
        };
        return Err(e.context(state));
    }
    reporter.success(&format!("User {} created", account.username));
    Ok(())
}

async fn create(
    s: &impl RemoteSession,
    reporter: &impl ProgressReporter,
    account: &NewAccount<'_>,
    done: &mut Vec<&'static str>,
) -> Result<()> {
    let user = account.username;
    let home = format!("/home/{user}");

    reporter.step(&format!("Creating user {user}..."));
    run(
        s,
        RemoteCommand::new("useradd")
            .args(["--user-group", "--create-home", "--shell", account.shell, user]),
    )
    .await?;
    done.push("useradd");

    run_with_stdin(
        s,
        RemoteCommand::new("chpasswd"),
        format!("{user}:{}\n", account.password.expose()).as_bytes(),
    )
    .await?;
    done.push("password");

    reporter.step("Installing SSH keys...");
    run(
        s,
        RemoteCommand::new("mkdir").args(["-p", &format!("{home}/.ssh")]),
    )
    .await?;
    done.push("ssh directory");

    put(s, account.authorized_keys, &format!("{home}/.ssh/authorized_keys")).await?;
    done.push("authorized_keys upload");

    let in_home = s.in_dir(&home);
    run(&in_home, RemoteCommand::new("chmod").args(["700", ".ssh"])).await?;
    run(
        &in_home,
        RemoteCommand::new("chmod").args(["600", ".ssh/authorized_keys"]),
    )
    .await?;
    run(
        &in_home,
        RemoteCommand::new("chown").args(["-R", &format!("{user}:{user}"), ".ssh"]),
    )
    .await?;
    done.push("ssh permissions");

    if account.admin {
        run(
            s,
            RemoteCommand::new("usermod").args(["--append", "--groups", account.admin_group, user]),
        )
        .await?;
        done.push("admin group");
    }
    tracing::info!(user, admin = account.admin, "account created");
    Ok(())
}
