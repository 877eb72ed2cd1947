//! `archsmith create-user` — add a login account to an installed machine.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{ArtifactSource, SecretPrompt};
use crate::application::services::safety;
use crate::application::services::user_account::{self, NewAccount};
use crate::commands::TargetArgs;
use crate::domain::Artifact;
use crate::domain::validate::validate_username;
use crate::infra::assets::LocalArtifactSource;
use crate::infra::ssh::SshSession;
use crate::output::TerminalReporter;

/// Arguments for the create-user command.
#[derive(Args)]
pub struct CreateUserArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Login name of the new account
    pub username: String,

    /// Do not add the account to the admin group
    #[arg(long)]
    pub no_admin: bool,

    /// Log in with a password instead of SSH keys
    #[arg(long)]
    pub ask_pass: bool,
}

/// Run the create-user command.
///
/// # Errors
///
/// Returns an error if the target is refused, the username is invalid,
/// `authorized_keys` is missing, or a sub-operation fails.
pub async fn run(app: &AppContext, args: CreateUserArgs) -> Result<ExitCode> {
    let target = args.target.target;
    safety::check_target(&target)?;
    validate_username(&args.username)?;

    let config = app.config()?;
    let keys = LocalArtifactSource::new(&config.artifacts)?.resolve(Artifact::AuthorizedKeys)?;

    let credentials = app.credentials(args.ask_pass)?;
    let password = app
        .prompt
        .secret(&format!("Password for {}", args.username), true)?;
    let session = SshSession::connect(target.clone(), &credentials, &config.ssh);

    let reporter = TerminalReporter::new(&app.output);
    let account = NewAccount {
        username: &args.username,
        password: &password,
        admin: !args.no_admin,
        shell: &config.users.shell,
        admin_group: &config.users.admin_group,
        authorized_keys: &keys,
    };
    user_account::create_user_account(&session, &reporter, &target, &account).await?;
    Ok(ExitCode::SUCCESS)
}
