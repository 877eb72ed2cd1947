//! Installation data: package set, disk layout, and the fixed paths the
//! workflow touches on the target.

// ── Fixed target paths ────────────────────────────────────────────────────────

pub const EFIVARS_DIR: &str = "/sys/firmware/efi/efivars";
pub const VOLUME_GROUP: &str = "vg-os";
pub const LOGICAL_VOLUME: &str = "lv-root";
pub const ROOT_LV_PATH: &str = "/dev/vg-os/lv-root";
pub const REMOTE_MIRRORLIST: &str = "/etc/pacman.d/mirrorlist";
pub const CONNECTIVITY_HOST: &str = "archlinux.org";
pub const CONNECTIVITY_PACKETS: &str = "3";

/// Bootloader package whose presence triggers the firmware-manager append.
pub const BOOTLOADER_PACKAGE: &str = "grub";
/// UEFI boot entry manager required by `grub-install --target=x86_64-efi`.
pub const FIRMWARE_PACKAGE: &str = "efibootmgr";

/// Base package set installed by `pacstrap`.
pub const DEFAULT_PACKAGES: &[&str] = &[
    "base",
    "base-devel",
    "grub",
    "openssh",
    "neovim",
    "bash-completion",
    "python",
    "fish",
    "haveged",
    "termite-terminfo",
];

// ── PackageSet ────────────────────────────────────────────────────────────────

/// Ordered, duplicate-free list of packages for the base install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSet {
    packages: Vec<String>,
}

impl PackageSet {
    #[must_use]
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self {
            packages: Vec::new(),
        };
        for p in packages {
            set.push(p.into());
        }
        set
    }

    fn push(&mut self, package: String) {
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
    }

    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.packages
    }

    /// Final package list for this run: appends [`FIRMWARE_PACKAGE`] once
    /// when the bootloader is requested and the firmware is UEFI.
    #[must_use]
    pub fn for_firmware(mut self, uefi: bool) -> Self {
        if uefi && self.contains(BOOTLOADER_PACKAGE) {
            self.push(FIRMWARE_PACKAGE.to_string());
        }
        self
    }
}

impl Default for PackageSet {
    fn default() -> Self {
        Self::new(DEFAULT_PACKAGES.iter().copied())
    }
}

// ── DiskLayout ────────────────────────────────────────────────────────────────

/// Partition scheme derived from the firmware mode. Both variants put the
/// root filesystem on LVM in partition 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskLayout {
    /// FAT32 EFI system partition (1–512 MiB) + LVM root.
    Uefi,
    /// 1 MiB BIOS boot partition for GRUB + LVM root.
    Bios,
}

impl DiskLayout {
    #[must_use]
    pub fn for_firmware(uefi: bool) -> Self {
        if uefi { Self::Uefi } else { Self::Bios }
    }

    /// `parted --script` arguments (after the device) that create the label
    /// and both partitions.
    #[must_use]
    pub fn parted_script(self) -> &'static [&'static str] {
        match self {
            Self::Uefi => &[
                "mklabel", "gpt", "mkpart", "efi", "fat32", "1", "512", "mkpart", "root", "512",
                "100%", "set", "1", "esp", "on",
            ],
            Self::Bios => &[
                "mklabel", "gpt", "mkpart", "bios_boot", "1", "2", "mkpart", "root", "2", "100%",
                "set", "1", "bios_grub", "on",
            ],
        }
    }
}

/// Device node of partition `n` on `device`.
///
/// Kernel naming inserts a `p` when the disk name ends in a digit
/// (`/dev/nvme0n1` → `/dev/nvme0n1p1`, `/dev/sda` → `/dev/sda1`).
#[must_use]
pub fn partition_path(device: &str, n: u8) -> String {
    if device.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{device}p{n}")
    } else {
        format!("{device}{n}")
    }
}

/// Escape `.` so a locale name matches literally inside a sed pattern.
#[must_use]
pub fn sed_literal(s: &str) -> String {
    s.replace('.', r"\.")
}

/// Lines appended to `/etc/hosts` for the new machine.
#[must_use]
pub fn hosts_entries(hostname: &str) -> String {
    format!("127.0.0.1\tlocalhost\n::1\tlocalhost\n127.0.1.1\t{hostname}.localdomain\t{hostname}\n")
}
