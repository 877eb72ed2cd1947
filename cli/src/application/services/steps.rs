//! Provisioning step library.
//!
//! Each function is one named step. Steps run strictly in order, assume
//! their predecessors succeeded and are not idempotent. Any non-zero exit
//! not explicitly tolerated below propagates.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteSession, RemoteShell};
use crate::application::services::probe::{self, EnvironmentFacts};
use crate::application::services::remote::{put, run, run_tolerant, run_with_stdin};
use crate::domain::config::CacheConfig;
use crate::domain::install::{
    LOGICAL_VOLUME, REMOTE_MIRRORLIST, ROOT_LV_PATH, VOLUME_GROUP, hosts_entries,
    partition_path, sed_literal,
};
use crate::domain::{DiskLayout, PackageSet, ProvisionError, RemoteCommand, Secret};

/// `root` + absolute `path`, e.g. `/mnt` + `/etc/fstab`.
fn under(root: &str, path: &str) -> String {
    format!("{}{path}", root.trim_end_matches('/'))
}

fn chroot(root: &str, program: &str) -> RemoteCommand {
    RemoteCommand::new(program).in_chroot(root)
}

// ── Disk ──────────────────────────────────────────────────────────────────────

/// Turn on network time sync on the live environment.
///
/// # Errors
///
/// Returns an error if the command fails.
pub async fn enable_ntp(s: &impl RemoteShell) -> Result<()> {
    run(s, RemoteCommand::new("timedatectl").args(["set-ntp", "true"])).await?;
    Ok(())
}

/// Wipe `device` and lay out boot + LVM root partitions for the firmware.
///
/// # Errors
///
/// Returns [`ProvisionError::NotABlockDevice`] if `device` is not a block
/// device, or an error if any command fails.
pub async fn partition_disk(
    s: &impl RemoteShell,
    device: &str,
    facts: &EnvironmentFacts,
) -> Result<()> {
    if !probe::block_device_exists(s, device).await? {
        return Err(ProvisionError::NotABlockDevice(device.to_string()).into());
    }
    let layout = DiskLayout::for_firmware(facts.uefi);
    tracing::info!(device, ?layout, "partitioning");

    run(
        s,
        RemoteCommand::new("parted")
            .args(["--script", "--align", "optimal", device])
            .args(layout.parted_script().iter().copied()),
    )
    .await?;
    if layout == DiskLayout::Uefi {
        run(
            s,
            RemoteCommand::new("mkfs.fat")
                .arg("-F32")
                .arg(partition_path(device, 1)),
        )
        .await?;
    }

    let root_part = partition_path(device, 2);
    run(
        s,
        RemoteCommand::new("parted")
            .args(["--script", device])
            .args(["set", "2", "lvm", "on", "print", "all"]),
    )
    .await?;
    run(s, RemoteCommand::new("pvcreate").arg(&root_part)).await?;
    run(s, RemoteCommand::new("vgcreate").args([VOLUME_GROUP, &root_part])).await?;
    run(
        s,
        RemoteCommand::new("lvcreate").args(["-n", LOGICAL_VOLUME, "-l", "50%VG", VOLUME_GROUP]),
    )
    .await?;
    run(s, RemoteCommand::new("mkfs.ext4").arg(ROOT_LV_PATH)).await?;
    Ok(())
}

/// Mount the root volume at `root`, plus the ESP under it on UEFI.
///
/// # Errors
///
/// Returns an error if any command fails.
pub async fn mount_partitions(
    s: &impl RemoteShell,
    device: &str,
    root: &str,
    facts: &EnvironmentFacts,
) -> Result<()> {
    run(s, RemoteCommand::new("mount").args([ROOT_LV_PATH, root])).await?;
    if facts.uefi {
        let esp = under(root, "/boot/efi");
        run(s, RemoteCommand::new("mkdir").args(["-p", &esp])).await?;
        run(
            s,
            RemoteCommand::new("mount").args([partition_path(device, 1), esp]),
        )
        .await?;
    }
    Ok(())
}

// ── Base system ───────────────────────────────────────────────────────────────

/// Replace the live environment's mirror list with the operator's.
///
/// # Errors
///
/// Returns an error if the upload fails.
pub async fn upload_mirrorlist(s: &impl RemoteSession, local: &Path) -> Result<()> {
    put(s, local, REMOTE_MIRRORLIST).await
}

/// Which package source `pacstrap` used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSource {
    /// Network cache mounted; `pacstrap -c` reuses it.
    Cache,
    /// Plain download from the mirrors.
    Mirrors,
}

/// Bootstrap the package set into `root`, through the network cache when
/// it can be mounted.
///
/// A failed cache mount is not an error: it is reported as a warning and
/// the install falls back to the mirrors.
///
/// # Errors
///
/// Returns an error if `pacstrap` fails.
pub async fn install_base(
    s: &impl RemoteShell,
    reporter: &impl ProgressReporter,
    packages: PackageSet,
    cache: &CacheConfig,
    root: &str,
    facts: &EnvironmentFacts,
) -> Result<PackageSource> {
    let packages = packages.for_firmware(facts.uefi);

    let source = match &cache.source {
        Some(export) => {
            let mounted = run_tolerant(
                s,
                RemoteCommand::new("mount").args([
                    "-t",
                    "nfs",
                    "-o",
                    &cache.options,
                    export,
                    &cache.mount_point,
                ]),
            )
            .await;
            if mounted {
                PackageSource::Cache
            } else {
                reporter.warn(&format!(
                    "Could not mount package cache {export}; downloading from mirrors"
                ));
                PackageSource::Mirrors
            }
        }
        None => PackageSource::Mirrors,
    };
    tracing::info!(?source, packages = packages.as_slice().len(), "bootstrapping");

    let mut cmd = RemoteCommand::new("pacstrap");
    if source == PackageSource::Cache {
        cmd = cmd.arg("-c");
    }
    run(s, cmd.arg(root).args(packages.as_slice().iter().cloned())).await?;
    Ok(source)
}

/// Generate `/etc/fstab` from the current mounts. Returns its content.
///
/// # Errors
///
/// Returns an error if either command fails.
pub async fn create_fstab(s: &impl RemoteShell, root: &str) -> Result<String> {
    let fstab = under(root, "/etc/fstab");
    run(s, RemoteCommand::shell(format!("genfstab -U {root} >> {fstab}"))).await?;
    let out = run(s, RemoteCommand::new("cat").arg(&fstab)).await?;
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

// ── System configuration ──────────────────────────────────────────────────────

/// Link the zone file and sync the hardware clock.
///
/// # Errors
///
/// Returns an error if either command fails.
pub async fn set_timezone(s: &impl RemoteShell, root: &str, timezone: &str) -> Result<()> {
    run(
        s,
        chroot(root, "ln").args([
            "-sf",
            &format!("/usr/share/zoneinfo/{timezone}"),
            "/etc/localtime",
        ]),
    )
    .await?;
    run(s, chroot(root, "hwclock").arg("--systohc")).await?;
    Ok(())
}

/// Enable `locale` in `locale.gen`, generate it and make it the default.
///
/// # Errors
///
/// Returns an error if any command fails.
pub async fn set_locale(s: &impl RemoteShell, root: &str, locale: &str) -> Result<()> {
    let pattern = sed_literal(locale);
    run(
        s,
        chroot(root, "sed").args(["-i", &format!("s/#{pattern}/{locale}/"), "/etc/locale.gen"]),
    )
    .await?;
    run(s, chroot(root, "locale-gen")).await?;
    run_with_stdin(
        s,
        chroot(root, "tee").args(["-a", "/etc/locale.conf"]),
        format!("LANG={locale}\n").as_bytes(),
    )
    .await?;
    Ok(())
}

/// Write `/etc/hostname` and the matching `/etc/hosts` entries.
///
/// # Errors
///
/// Returns an error if either write fails.
pub async fn set_hostname(s: &impl RemoteShell, root: &str, hostname: &str) -> Result<()> {
    run_with_stdin(
        s,
        chroot(root, "tee").arg("/etc/hostname"),
        format!("{hostname}\n").as_bytes(),
    )
    .await?;
    run_with_stdin(
        s,
        chroot(root, "tee").args(["-a", "/etc/hosts"]),
        hosts_entries(hostname).as_bytes(),
    )
    .await?;
    Ok(())
}

/// Install the DHCP network unit and enable networkd + resolved.
///
/// # Errors
///
/// Returns an error if the upload or any command fails.
pub async fn enable_dhcp(s: &impl RemoteSession, root: &str, unit: &Path) -> Result<()> {
    put(s, unit, &under(root, "/etc/systemd/network/dhcp.network")).await?;
    run(
        s,
        chroot(root, "systemctl").args(["enable", "systemd-networkd.service"]),
    )
    .await?;
    run(
        s,
        RemoteCommand::new("ln").args([
            "-sf",
            "/run/systemd/resolve/resolv.conf",
            &under(root, "/etc/resolv.conf"),
        ]),
    )
    .await?;
    run(
        s,
        chroot(root, "systemctl").args(["enable", "systemd-resolved.service"]),
    )
    .await?;
    Ok(())
}

/// Allow root password login over SSH and enable sshd.
///
/// # Errors
///
/// Returns an error if either command fails.
pub async fn enable_root_ssh(s: &impl RemoteShell, root: &str) -> Result<()> {
    run(
        s,
        RemoteCommand::new("sed").args([
            "-i",
            "s/^#PermitRootLogin .*$/PermitRootLogin yes/",
            &under(root, "/etc/ssh/sshd_config"),
        ]),
    )
    .await?;
    run(s, chroot(root, "systemctl").args(["enable", "sshd.service"])).await?;
    Ok(())
}

/// Enable the entropy daemon.
///
/// # Errors
///
/// Returns an error if the command fails.
pub async fn enable_haveged(s: &impl RemoteShell, root: &str) -> Result<()> {
    run(s, chroot(root, "systemctl").args(["enable", "haveged.service"])).await?;
    Ok(())
}

/// Add the `lvm2` hook after `block` and rebuild the initramfs.
///
/// # Errors
///
/// Returns an error if either command fails.
pub async fn make_initramfs(s: &impl RemoteShell, root: &str) -> Result<()> {
    run(
        s,
        RemoteCommand::new("sed").args([
            "-i.bak",
            "s/^HOOKS=.*block/& lvm2/",
            &under(root, "/etc/mkinitcpio.conf"),
        ]),
    )
    .await?;
    run(s, chroot(root, "mkinitcpio").args(["-p", "linux"])).await?;
    Ok(())
}

/// Set the installed system's root password. The value goes over stdin.
///
/// # Errors
///
/// Returns an error if `chpasswd` fails.
pub async fn set_root_password(s: &impl RemoteShell, root: &str, password: &Secret) -> Result<()> {
    run_with_stdin(
        s,
        chroot(root, "chpasswd"),
        format!("root:{}\n", password.expose()).as_bytes(),
    )
    .await?;
    Ok(())
}

/// Install GRUB for the firmware mode and write its config.
///
/// # Errors
///
/// Returns an error if either command fails.
pub async fn install_grub(
    s: &impl RemoteShell,
    root: &str,
    device: &str,
    bootloader_id: &str,
    facts: &EnvironmentFacts,
) -> Result<()> {
    let install = if facts.uefi {
        chroot(root, "grub-install").args([
            "--target=x86_64-efi".to_string(),
            "--efi-directory=/boot/efi".to_string(),
            format!("--bootloader-id={bootloader_id}"),
        ])
    } else {
        chroot(root, "grub-install").args(["--target=i386-pc", device])
    };
    run(s, install).await?;
    run(
        s,
        chroot(root, "grub-mkconfig").args(["-o", "/boot/grub/grub.cfg"]),
    )
    .await?;
    Ok(())
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Install the sudoers drop-in for the admin group.
///
/// # Errors
///
/// Returns an error if the upload fails.
pub async fn setup_sudo(s: &impl RemoteSession, root: &str, drop_in: &Path) -> Result<()> {
    put(s, drop_in, &under(root, "/etc/sudoers.d/10-wheel")).await
}

/// Install root's authorized keys.
///
/// # Errors
///
/// Returns an error if any command or the upload fails.
pub async fn install_keys(s: &impl RemoteSession, root: &str, keys: &Path) -> Result<()> {
    let ssh_dir = under(root, "/root/.ssh");
    run(s, RemoteCommand::new("mkdir").arg(&ssh_dir)).await?;
    run(s, RemoteCommand::new("chmod").args(["700", &ssh_dir])).await?;
    put(s, keys, &format!("{ssh_dir}/authorized_keys")).await
}

/// Seed `/etc/skel` with the default editor config.
///
/// # Errors
///
/// Returns an error if the command or the upload fails.
pub async fn create_skel(s: &impl RemoteSession, root: &str, editor_config: &Path) -> Result<()> {
    let nvim_dir = under(root, "/etc/skel/.config/nvim");
    run(s, RemoteCommand::new("mkdir").args(["-p", &nvim_dir])).await?;
    put(s, editor_config, &format!("{nvim_dir}/init.vim")).await
}

/// Unmount everything under `root`, then the package cache if mounted.
///
/// The recursive unmount is best-effort. The cache unmount is not.
///
/// # Errors
///
/// Returns an error if the cache is mounted and cannot be unmounted.
pub async fn post_install_cleanup(
    s: &impl RemoteShell,
    root: &str,
    cache_mount_point: &str,
) -> Result<()> {
    run_tolerant(s, RemoteCommand::new("umount").args(["-R", root])).await;
    let cache_mounted = probe::cache_mount_active(s, cache_mount_point)
        .await
        .unwrap_or(false);
    if cache_mounted {
        run(s, RemoteCommand::new("umount").arg(cache_mount_point)).await?;
    }
    Ok(())
}
