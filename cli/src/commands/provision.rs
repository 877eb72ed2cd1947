//! `archsmith provision` / `archsmith provision-laptop` — install Arch on a
//! live environment.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::safety;
use crate::application::services::workflow::{self, ProvisionOutcome, ProvisionRequest};
use crate::commands::TargetArgs;
use crate::domain::validate::validate_hostname;
use crate::domain::{Credentials, Profile};
use crate::infra::assets::LocalArtifactSource;
use crate::infra::ssh::SshSession;
use crate::output::TerminalReporter;

/// Arguments shared by both provisioning profiles.
#[derive(Args)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Hostname of the new system
    pub hostname: String,
}

/// Run `profile` against the target.
///
/// # Errors
///
/// Returns an error if the target is refused, a local file is missing,
/// the target is offline, or a step fails.
pub async fn run(app: &AppContext, args: ProvisionArgs, profile: Profile) -> Result<ExitCode> {
    let target = args.target.target;
    safety::check_target(&target)?;
    validate_hostname(&args.hostname)?;

    let config = app.config()?;
    let source = LocalArtifactSource::new(&config.artifacts)?;
    let artifacts = workflow::resolve_artifacts(&source, profile)?;

    let password = app.password(&format!("Password for {}", target.ssh_destination()))?;
    let session = SshSession::connect(
        target.clone(),
        &Credentials::with_password(password.clone()),
        &config.ssh,
    );
    tracing::info!(target = %target, %profile, hostname = %args.hostname, "provisioning");

    app.output.header(&format!(
        "Provisioning {} as {} ({profile} profile)",
        target.host, args.hostname
    ));
    let reporter = TerminalReporter::new(&app.output);
    let request = ProvisionRequest {
        target: &target,
        profile,
        hostname: &args.hostname,
        root_password: &password,
        config: &config,
        artifacts: &artifacts,
    };
    match workflow::provision(&session, &app.prompt, &reporter, &request).await? {
        ProvisionOutcome::Declined => app.output.info("Aborted. Nothing was changed."),
        ProvisionOutcome::Completed { steps, .. } => {
            tracing::info!(steps, "provisioning complete");
        }
    }
    Ok(ExitCode::SUCCESS)
}
