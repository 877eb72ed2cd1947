//! Profile execution: safety gate, connectivity precondition, then every
//! step of the profile in order.
//!
//! Builds on the `safety`, `probe` and `steps` services.

use anyhow::{Context, Result};

use crate::application::ports::{ArtifactSource, Confirmer, ProgressReporter, RemoteSession};
use crate::application::services::probe::{self, EnvironmentFacts};
use crate::application::services::{safety, steps};
use crate::domain::validate::validate_hostname;
use crate::domain::{
    ArchsmithConfig, Artifact, ArtifactPaths, PackageSet, Profile, ProvisionError, Secret, Step,
    Target,
};

/// Inputs of one provisioning run.
pub struct ProvisionRequest<'a> {
    pub target: &'a Target,
    pub profile: Profile,
    pub hostname: &'a str,
    /// Connection password, reused as the new system's root password.
    pub root_password: &'a Secret,
    pub config: &'a ArchsmithConfig,
    pub artifacts: &'a ArtifactPaths,
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The operator did not confirm. Nothing ran on the target.
    Declined,
    /// Every step of the profile finished.
    Completed { profile: Profile, steps: usize },
}

/// Resolve every local file `profile` uploads, before anything runs.
///
/// # Errors
///
/// Returns the first artifact that cannot be found.
pub fn resolve_artifacts(source: &impl ArtifactSource, profile: Profile) -> Result<ArtifactPaths> {
    let mut paths = ArtifactPaths::default();
    for artifact in profile.steps().iter().filter_map(|s| s.artifact()) {
        let path = source.resolve(artifact)?;
        tracing::debug!(artifact = artifact.file_name(), path = %path.display(), "artifact resolved");
        paths.insert(artifact, path);
    }
    Ok(paths)
}

/// Run `req.profile` against the connected target.
///
/// # Errors
///
/// Returns an error for loopback targets, invalid inputs, an offline
/// target, or the first failing step. A step failure leaves the target
/// partially provisioned; nothing is rolled back.
pub async fn provision(
    session: &impl RemoteSession,
    confirmer: &impl Confirmer,
    reporter: &impl ProgressReporter,
    req: &ProvisionRequest<'_>,
) -> Result<ProvisionOutcome> {
    safety::check_target(req.target)?;
    validate_hostname(req.hostname)?;
    req.config.validate()?;

    if !safety::authorize(req.target, confirmer, reporter)? {
        tracing::info!(target = %req.target, "run declined by operator");
        return Ok(ProvisionOutcome::Declined);
    }

    reporter.step("Checking internet connectivity...");
    if !probe::is_internet_reachable(session).await? {
        return Err(ProvisionError::Offline.into());
    }
    reporter.success("Target is online");

    let facts = EnvironmentFacts::gather(session).await?;
    tracing::info!(uefi = facts.uefi, "environment facts gathered");
    reporter.success(if facts.uefi {
        "Firmware: UEFI"
    } else {
        "Firmware: BIOS"
    });

    let plan = req.profile.steps();
    for (i, &step) in plan.iter().enumerate() {
        reporter.step(&format!("[{}/{}] {}", i + 1, plan.len(), step.summary()));
        tracing::info!(step = step.name(), "step started");
        run_step(session, reporter, req, &facts, step)
            .await
            .with_context(|| {
                format!(
                    "step '{step}' failed; the target is left partially provisioned and must be reinstalled from scratch"
                )
            })?;
        tracing::info!(step = step.name(), "step finished");
    }

    reporter.success(&format!(
        "{} provisioned ({} profile). Reboot the target to finish.",
        req.hostname, req.profile
    ));
    Ok(ProvisionOutcome::Completed {
        profile: req.profile,
        steps: plan.len(),
    })
}

async fn run_step(
    s: &impl RemoteSession,
    reporter: &impl ProgressReporter,
    req: &ProvisionRequest<'_>,
    facts: &EnvironmentFacts,
    step: Step,
) -> Result<()> {
    let install = &req.config.install;
    let root = install.root.as_str();
    match step {
        Step::EnableNtp => steps::enable_ntp(s).await,
        Step::PartitionDisk => steps::partition_disk(s, &install.device, facts).await,
        Step::MountPartitions => steps::mount_partitions(s, &install.device, root, facts).await,
        Step::UploadMirrorlist => {
            steps::upload_mirrorlist(s, req.artifacts.get(Artifact::Mirrorlist)?).await
        }
        Step::InstallBase => {
            let source = steps::install_base(
                s,
                reporter,
                PackageSet::new(install.packages.iter().cloned()),
                &req.config.cache,
                root,
                facts,
            )
            .await?;
            tracing::debug!(?source, "base system installed");
            Ok(())
        }
        Step::CreateFstab => {
            let fstab = steps::create_fstab(s, root).await?;
            reporter.detail(&fstab);
            Ok(())
        }
        Step::SetTimezone => steps::set_timezone(s, root, &install.timezone).await,
        Step::SetLocale => steps::set_locale(s, root, &install.locale).await,
        Step::SetHostname => steps::set_hostname(s, root, req.hostname).await,
        Step::EnableDhcp => {
            steps::enable_dhcp(s, root, req.artifacts.get(Artifact::DhcpNetwork)?).await
        }
        Step::EnableRootSsh => steps::enable_root_ssh(s, root).await,
        Step::EnableHaveged => steps::enable_haveged(s, root).await,
        Step::MakeInitramfs => steps::make_initramfs(s, root).await,
        Step::SetRootPassword => steps::set_root_password(s, root, req.root_password).await,
        Step::InstallGrub => {
            steps::install_grub(s, root, &install.device, &install.bootloader_id, facts).await
        }
        Step::SetupSudo => steps::setup_sudo(s, root, req.artifacts.get(Artifact::Sudoers)?).await,
        Step::InstallKeys => {
            steps::install_keys(s, root, req.artifacts.get(Artifact::AuthorizedKeys)?).await
        }
        Step::CreateSkel => {
            steps::create_skel(s, root, req.artifacts.get(Artifact::EditorConfig)?).await
        }
        Step::PostInstallCleanup => {
            steps::post_install_cleanup(s, root, &req.config.cache.mount_point).await
        }
    }
}
