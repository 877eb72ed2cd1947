//! `archsmith probe` — read-only report of the target's environment.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::{probe, safety};
use crate::commands::TargetArgs;
use crate::infra::ssh::SshSession;
use crate::output::progress;

/// Arguments for the probe command.
#[derive(Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Log in with a password instead of SSH keys
    #[arg(long)]
    pub ask_pass: bool,
}

/// Run the probe command.
///
/// # Errors
///
/// Returns an error if the target is refused or cannot be reached.
pub async fn run(app: &AppContext, args: ProbeArgs) -> Result<ExitCode> {
    let target = args.target.target;
    safety::check_target(&target)?;

    let config = app.config()?;
    let credentials = app.credentials(args.ask_pass)?;
    let session = SshSession::connect(target.clone(), &credentials, &config.ssh);

    let pb = progress::spinner(&app.output, &format!("Probing {}...", target.host));
    let report = probe::probe_all(&session, &config.install.device, &config.cache.mount_point).await;
    progress::finish(&pb);
    let report = report?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("JSON serialization")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    app.output.header(&format!("Environment of {}", target.host));
    app.output.check("Internet reachable", report.internet);
    app.output.check("UEFI firmware", report.uefi);
    app.output
        .check(&format!("{} is a block device", report.device), report.device_present);
    app.output.check(
        &format!("Package cache mounted at {}", report.cache_mount_point),
        report.cache_mounted,
    );
    Ok(ExitCode::SUCCESS)
}
