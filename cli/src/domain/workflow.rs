//! Installation profiles and the steps they are made of.
//!
//! A profile is a fixed, linear list of steps. There are no branches
//! between steps, no retries and no rollback; branching happens only
//! inside individual steps.

use std::fmt;
use std::str::FromStr;

/// One unit of provisioning work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    EnableNtp,
    PartitionDisk,
    MountPartitions,
    UploadMirrorlist,
    InstallBase,
    CreateFstab,
    SetTimezone,
    SetLocale,
    SetHostname,
    EnableDhcp,
    EnableRootSsh,
    EnableHaveged,
    MakeInitramfs,
    SetRootPassword,
    InstallGrub,
    SetupSudo,
    InstallKeys,
    CreateSkel,
    PostInstallCleanup,
}

impl Step {
    /// Stable kebab-case name used in progress output and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::EnableNtp => "enable-ntp",
            Self::PartitionDisk => "partition-disk",
            Self::MountPartitions => "mount-partitions",
            Self::UploadMirrorlist => "upload-mirrorlist",
            Self::InstallBase => "install-base",
            Self::CreateFstab => "create-fstab",
            Self::SetTimezone => "set-timezone",
            Self::SetLocale => "set-locale",
            Self::SetHostname => "set-hostname",
            Self::EnableDhcp => "enable-dhcp",
            Self::EnableRootSsh => "enable-root-ssh",
            Self::EnableHaveged => "enable-haveged",
            Self::MakeInitramfs => "make-initramfs",
            Self::SetRootPassword => "set-root-password",
            Self::InstallGrub => "install-grub",
            Self::SetupSudo => "setup-sudo",
            Self::InstallKeys => "install-keys",
            Self::CreateSkel => "create-skel",
            Self::PostInstallCleanup => "post-install-cleanup",
        }
    }

    /// One-line description for `archsmith plan`.
    #[must_use]
    pub fn summary(self) -> &'static str {
        match self {
            Self::EnableNtp => "enable NTP time sync on the live system",
            Self::PartitionDisk => "partition the install disk and build LVM root",
            Self::MountPartitions => "mount root (and the EFI partition) under the install root",
            Self::UploadMirrorlist => "upload the pacman mirror list",
            Self::InstallBase => "pacstrap the base package set",
            Self::CreateFstab => "generate /etc/fstab",
            Self::SetTimezone => "set the timezone and sync the hardware clock",
            Self::SetLocale => "generate the locale and set LANG",
            Self::SetHostname => "write /etc/hostname and /etc/hosts",
            Self::EnableDhcp => "configure systemd-networkd DHCP and resolved",
            Self::EnableRootSsh => "permit root SSH login and enable sshd",
            Self::EnableHaveged => "enable the haveged entropy daemon",
            Self::MakeInitramfs => "add the lvm2 hook and rebuild the initramfs",
            Self::SetRootPassword => "set the root password to the connection password",
            Self::InstallGrub => "install GRUB and generate its config",
            Self::SetupSudo => "install the sudoers drop-in",
            Self::InstallKeys => "install root's authorized_keys",
            Self::CreateSkel => "install the default editor config into /etc/skel",
            Self::PostInstallCleanup => "unmount the install root and package cache",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named installation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Whole-disk install: partitioning, mounting, and bootloader included.
    Full,
    /// In-place install onto partitions the operator already mounted;
    /// no partitioning, mounting, or bootloader.
    Laptop,
}

const FULL_STEPS: &[Step] = &[
    Step::EnableNtp,
    Step::PartitionDisk,
    Step::MountPartitions,
    Step::UploadMirrorlist,
    Step::InstallBase,
    Step::CreateFstab,
    Step::SetTimezone,
    Step::SetLocale,
    Step::SetHostname,
    Step::EnableDhcp,
    Step::EnableRootSsh,
    Step::EnableHaveged,
    Step::MakeInitramfs,
    Step::SetRootPassword,
    Step::InstallGrub,
    Step::SetupSudo,
    Step::InstallKeys,
    Step::CreateSkel,
    Step::PostInstallCleanup,
];

const LAPTOP_STEPS: &[Step] = &[
    Step::EnableNtp,
    Step::UploadMirrorlist,
    Step::InstallBase,
    Step::CreateFstab,
    Step::SetTimezone,
    Step::SetLocale,
    Step::SetHostname,
    Step::EnableDhcp,
    Step::EnableRootSsh,
    Step::MakeInitramfs,
    Step::SetRootPassword,
    Step::SetupSudo,
    Step::InstallKeys,
    Step::CreateSkel,
    Step::PostInstallCleanup,
];

impl Profile {
    /// Ordered steps of this profile.
    #[must_use]
    pub fn steps(self) -> &'static [Step] {
        match self {
            Self::Full => FULL_STEPS,
            Self::Laptop => LAPTOP_STEPS,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Laptop => "laptop",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "laptop" => Ok(Self::Laptop),
            other => Err(format!("unknown profile '{other}' (expected: full, laptop)")),
        }
    }
}
