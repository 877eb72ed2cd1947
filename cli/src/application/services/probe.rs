//! Environment probes: read-only predicates about the target.
//!
//! Each predicate is a fresh remote query. A non-zero exit means `false`;
//! only transport failures are errors. Facts that cannot change during a
//! run (firmware mode) are gathered once into [`EnvironmentFacts`].

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::RemoteShell;
use crate::domain::RemoteCommand;
use crate::domain::install::{CONNECTIVITY_HOST, CONNECTIVITY_PACKETS, EFIVARS_DIR};

async fn succeeds(shell: &impl RemoteShell, cmd: RemoteCommand) -> Result<bool> {
    tracing::debug!(command = %cmd, "probe");
    Ok(shell.exec(&cmd).await?.status.success())
}

/// `ping -c 3 archlinux.org` succeeds.
///
/// # Errors
///
/// Returns an error only if the command could not be run.
pub async fn is_internet_reachable(shell: &impl RemoteShell) -> Result<bool> {
    succeeds(
        shell,
        RemoteCommand::new("ping").args(["-c", CONNECTIVITY_PACKETS, CONNECTIVITY_HOST]),
    )
    .await
}

/// The EFI variables directory exists.
///
/// # Errors
///
/// Returns an error only if the command could not be run.
pub async fn is_uefi_firmware(shell: &impl RemoteShell) -> Result<bool> {
    succeeds(shell, RemoteCommand::new("test").args(["-d", EFIVARS_DIR])).await
}

/// `path` is a block device node.
///
/// # Errors
///
/// Returns an error only if the command could not be run.
pub async fn block_device_exists(shell: &impl RemoteShell, path: &str) -> Result<bool> {
    succeeds(shell, RemoteCommand::new("test").args(["-b", path])).await
}

/// `mount_point` is currently in the mount table.
///
/// # Errors
///
/// Returns an error only if the command could not be run.
pub async fn cache_mount_active(shell: &impl RemoteShell, mount_point: &str) -> Result<bool> {
    succeeds(shell, RemoteCommand::new("mountpoint").args(["-q", mount_point])).await
}

/// Facts gathered once at the start of a run and passed to every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentFacts {
    /// Booted in UEFI mode.
    pub uefi: bool,
}

impl EnvironmentFacts {
    /// # Errors
    ///
    /// Returns an error only if a probe could not be run.
    pub async fn gather(shell: &impl RemoteShell) -> Result<Self> {
        let uefi = is_uefi_firmware(shell).await?;
        Ok(Self { uefi })
    }
}

/// Snapshot of every predicate, for `archsmith probe`.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub internet: bool,
    pub uefi: bool,
    pub device: String,
    pub device_present: bool,
    pub cache_mount_point: String,
    pub cache_mounted: bool,
}

/// Run every predicate once. Read-only.
///
/// # Errors
///
/// Returns an error only if a probe could not be run.
pub async fn probe_all(
    shell: &impl RemoteShell,
    device: &str,
    cache_mount_point: &str,
) -> Result<ProbeReport> {
    Ok(ProbeReport {
        internet: is_internet_reachable(shell).await?,
        uefi: is_uefi_firmware(shell).await?,
        device: device.to_string(),
        device_present: block_device_exists(shell, device).await?,
        cache_mount_point: cache_mount_point.to_string(),
        cache_mounted: cache_mount_active(shell, cache_mount_point).await?,
    })
}
