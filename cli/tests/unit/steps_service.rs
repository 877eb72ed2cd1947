//! Tests for individual provisioning steps.

#![allow(clippy::expect_used)]

use std::path::Path;

use archsmith_cli::application::services::probe::EnvironmentFacts;
use archsmith_cli::application::services::steps::{self, PackageSource};
use archsmith_cli::domain::config::CacheConfig;
use archsmith_cli::domain::{PackageSet, ProvisionError};

use crate::helpers::password;
use crate::mocks::{Event, RecordingReporter, RecordingSession};

const UEFI: EnvironmentFacts = EnvironmentFacts { uefi: true };
const BIOS: EnvironmentFacts = EnvironmentFacts { uefi: false };

// ── partition-disk ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_partition_uefi_layout() {
    let session = RecordingSession::new();
    steps::partition_disk(&session, "/dev/sda", &UEFI).await.expect("partition");
    assert_eq!(
        session.lines(),
        [
            "test -b /dev/sda",
            "parted --script --align optimal /dev/sda mklabel gpt mkpart efi fat32 1 512 mkpart root 512 100% set 1 esp on",
            "mkfs.fat -F32 /dev/sda1",
            "parted --script /dev/sda set 2 lvm on print all",
            "pvcreate /dev/sda2",
            "vgcreate vg-os /dev/sda2",
            "lvcreate -n lv-root -l 50%VG vg-os",
            "mkfs.ext4 /dev/vg-os/lv-root",
        ]
    );
}

#[tokio::test]
async fn test_partition_bios_layout_has_no_esp() {
    let session = RecordingSession::new();
    steps::partition_disk(&session, "/dev/sda", &BIOS).await.expect("partition");
    let lines = session.lines();
    assert_eq!(
        lines[1],
        "parted --script --align optimal /dev/sda mklabel gpt mkpart bios_boot 1 2 mkpart root 2 100% set 1 bios_grub on"
    );
    assert!(!session.ran("mkfs.fat"));
    assert!(lines.iter().all(|l| !l.contains("esp")));
}

#[tokio::test]
async fn test_partition_nvme_uses_p_separator() {
    let session = RecordingSession::new();
    steps::partition_disk(&session, "/dev/nvme0n1", &UEFI).await.expect("partition");
    assert!(session.ran("mkfs.fat -F32 /dev/nvme0n1p1"));
    assert!(session.ran("pvcreate /dev/nvme0n1p2"));
}

#[tokio::test]
async fn test_partition_refuses_non_block_device() {
    let session = RecordingSession::new().exit_when("test -b", 1);
    let err = steps::partition_disk(&session, "/dev/sdz", &UEFI)
        .await
        .expect_err("not a block device");
    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::NotABlockDevice(d)) if d == "/dev/sdz"
    ));
    assert_eq!(session.lines(), ["test -b /dev/sdz"]);
}

#[tokio::test]
async fn test_partition_stops_at_first_failure() {
    let session = RecordingSession::new().exit_when("pvcreate", 5);
    let err = steps::partition_disk(&session, "/dev/sda", &BIOS)
        .await
        .expect_err("pvcreate fails");
    assert!(err.to_string().contains("pvcreate /dev/sda2"), "got: {err}");
    assert!(!session.ran("vgcreate"));
}

// ── mount-partitions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mount_uefi_adds_esp() {
    let session = RecordingSession::new();
    steps::mount_partitions(&session, "/dev/sda", "/mnt", &UEFI).await.expect("mount");
    assert_eq!(
        session.lines(),
        [
            "mount /dev/vg-os/lv-root /mnt",
            "mkdir -p /mnt/boot/efi",
            "mount /dev/sda1 /mnt/boot/efi",
        ]
    );
}

#[tokio::test]
async fn test_mount_bios_root_only() {
    let session = RecordingSession::new();
    steps::mount_partitions(&session, "/dev/sda", "/mnt", &BIOS).await.expect("mount");
    assert_eq!(session.lines(), ["mount /dev/vg-os/lv-root /mnt"]);
}

// ── install-base ─────────────────────────────────────────────────────────────

const BASE: &str = "base base-devel grub openssh neovim bash-completion python fish haveged termite-terminfo";

#[tokio::test]
async fn test_install_base_uses_cache_when_mounted() {
    let session = RecordingSession::new();
    let reporter = RecordingReporter::new();
    let source = steps::install_base(
        &session,
        &reporter,
        PackageSet::default(),
        &CacheConfig::default(),
        "/mnt",
        &UEFI,
    )
    .await
    .expect("install");
    assert_eq!(source, PackageSource::Cache);
    assert_eq!(
        session.lines(),
        [
            "mount -t nfs -o timeo=100,retry=0 192.168.2.20:/packages /var/cache/pacman/pkg".to_string(),
            format!("pacstrap -c /mnt {BASE} efibootmgr"),
        ]
    );
    assert!(reporter.of(Event::Warn).is_empty());
}

#[tokio::test]
async fn test_install_base_falls_back_when_cache_mount_fails() {
    let session = RecordingSession::new().exit_when("mount -t nfs", 32);
    let reporter = RecordingReporter::new();
    let source = steps::install_base(
        &session,
        &reporter,
        PackageSet::default(),
        &CacheConfig::default(),
        "/mnt",
        &BIOS,
    )
    .await
    .expect("install");
    assert_eq!(source, PackageSource::Mirrors);
    assert_eq!(session.lines()[1], format!("pacstrap /mnt {BASE}"));
    let warnings = reporter.of(Event::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("192.168.2.20:/packages"));
}

#[tokio::test]
async fn test_install_base_skips_mount_without_cache_source() {
    let session = RecordingSession::new();
    let reporter = RecordingReporter::new();
    let cache = CacheConfig {
        source: None,
        ..CacheConfig::default()
    };
    steps::install_base(&session, &reporter, PackageSet::default(), &cache, "/mnt", &BIOS)
        .await
        .expect("install");
    assert_eq!(session.lines(), [format!("pacstrap /mnt {BASE}")]);
    assert!(reporter.of(Event::Warn).is_empty());
}

#[tokio::test]
async fn test_install_base_pacstrap_failure_propagates() {
    let session = RecordingSession::new().exit_when("pacstrap", 1);
    let reporter = RecordingReporter::new();
    let result = steps::install_base(
        &session,
        &reporter,
        PackageSet::default(),
        &CacheConfig::default(),
        "/mnt",
        &UEFI,
    )
    .await;
    assert!(result.is_err());
}

// ── create-fstab ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_fstab_appends_then_returns_content() {
    let fstab = b"UUID=1234 / ext4 rw,relatime 0 1\n";
    let session = RecordingSession::new().stdout_when("cat /mnt/etc/fstab", fstab);
    let content = steps::create_fstab(&session, "/mnt").await.expect("fstab");
    assert_eq!(content.as_bytes(), fstab);
    assert_eq!(
        session.lines(),
        ["sh -c 'genfstab -U /mnt >> /mnt/etc/fstab'", "cat /mnt/etc/fstab"]
    );
}

// ── system configuration ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_timezone_links_zone_in_chroot() {
    let session = RecordingSession::new();
    steps::set_timezone(&session, "/mnt", "Europe/Paris").await.expect("tz");
    assert_eq!(
        session.lines(),
        [
            "arch-chroot /mnt ln -sf /usr/share/zoneinfo/Europe/Paris /etc/localtime",
            "arch-chroot /mnt hwclock --systohc",
        ]
    );
}

#[tokio::test]
async fn test_set_locale_escapes_dots_and_writes_lang() {
    let session = RecordingSession::new();
    steps::set_locale(&session, "/mnt", "en_CA.UTF-8").await.expect("locale");
    assert_eq!(
        session.lines()[0],
        r"arch-chroot /mnt sed -i 's/#en_CA\.UTF-8/en_CA.UTF-8/' /etc/locale.gen"
    );
    assert!(session.ran("arch-chroot /mnt locale-gen"));
    assert_eq!(
        session.stdin_of("arch-chroot /mnt tee -a /etc/locale.conf"),
        Some(b"LANG=en_CA.UTF-8\n".to_vec())
    );
}

#[tokio::test]
async fn test_set_hostname_writes_name_and_fqdn_line() {
    let session = RecordingSession::new();
    steps::set_hostname(&session, "/mnt", "oviraptor").await.expect("hostname");
    assert_eq!(
        session.stdin_of("arch-chroot /mnt tee /etc/hostname"),
        Some(b"oviraptor\n".to_vec())
    );
    let hosts = String::from_utf8(
        session
            .stdin_of("arch-chroot /mnt tee -a /etc/hosts")
            .expect("hosts written"),
    )
    .expect("utf8");
    assert!(hosts.contains("127.0.0.1\tlocalhost\n"));
    assert!(hosts.contains("::1\tlocalhost\n"));
    assert!(hosts.contains("127.0.1.1\toviraptor.localdomain\toviraptor\n"));
}

#[tokio::test]
async fn test_enable_dhcp_uploads_unit_and_enables_services() {
    let session = RecordingSession::new();
    steps::enable_dhcp(&session, "/mnt", Path::new("/local/dhcp.network"))
        .await
        .expect("dhcp");
    assert_eq!(
        session.lines(),
        [
            "put /mnt/etc/systemd/network/dhcp.network",
            "arch-chroot /mnt systemctl enable systemd-networkd.service",
            "ln -sf /run/systemd/resolve/resolv.conf /mnt/etc/resolv.conf",
            "arch-chroot /mnt systemctl enable systemd-resolved.service",
        ]
    );
}

#[tokio::test]
async fn test_enable_root_ssh_edits_sshd_config() {
    let session = RecordingSession::new();
    steps::enable_root_ssh(&session, "/mnt").await.expect("ssh");
    assert_eq!(
        session.lines(),
        [
            "sed -i 's/^#PermitRootLogin .*$/PermitRootLogin yes/' /mnt/etc/ssh/sshd_config",
            "arch-chroot /mnt systemctl enable sshd.service",
        ]
    );
}

#[tokio::test]
async fn test_make_initramfs_adds_lvm2_hook() {
    let session = RecordingSession::new();
    steps::make_initramfs(&session, "/mnt").await.expect("initramfs");
    assert_eq!(
        session.lines(),
        [
            "sed -i.bak 's/^HOOKS=.*block/& lvm2/' /mnt/etc/mkinitcpio.conf",
            "arch-chroot /mnt mkinitcpio -p linux",
        ]
    );
}

#[tokio::test]
async fn test_root_password_travels_on_stdin_only() {
    let session = RecordingSession::new();
    steps::set_root_password(&session, "/mnt", &password()).await.expect("passwd");
    assert_eq!(session.lines(), ["arch-chroot /mnt chpasswd"]);
    assert_eq!(
        session.stdin_of("arch-chroot /mnt chpasswd"),
        Some(b"root:hunter2\n".to_vec())
    );
}

#[tokio::test]
async fn test_install_grub_per_firmware() {
    let uefi = RecordingSession::new();
    steps::install_grub(&uefi, "/mnt", "/dev/sda", "GRUB", &UEFI).await.expect("grub");
    assert_eq!(
        uefi.lines(),
        [
            "arch-chroot /mnt grub-install --target=x86_64-efi --efi-directory=/boot/efi --bootloader-id=GRUB",
            "arch-chroot /mnt grub-mkconfig -o /boot/grub/grub.cfg",
        ]
    );

    let bios = RecordingSession::new();
    steps::install_grub(&bios, "/mnt", "/dev/sda", "GRUB", &BIOS).await.expect("grub");
    assert_eq!(
        bios.lines()[0],
        "arch-chroot /mnt grub-install --target=i386-pc /dev/sda"
    );
}

// ── files ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_install_keys_creates_private_ssh_dir() {
    let session = RecordingSession::new();
    steps::install_keys(&session, "/mnt", Path::new("/local/authorized_keys"))
        .await
        .expect("keys");
    assert_eq!(
        session.lines(),
        [
            "mkdir /mnt/root/.ssh",
            "chmod 700 /mnt/root/.ssh",
            "put /mnt/root/.ssh/authorized_keys",
        ]
    );
}

#[tokio::test]
async fn test_create_skel_places_editor_config() {
    let session = RecordingSession::new();
    steps::create_skel(&session, "/mnt", Path::new("/local/init.vim"))
        .await
        .expect("skel");
    assert_eq!(
        session.lines(),
        [
            "mkdir -p /mnt/etc/skel/.config/nvim",
            "put /mnt/etc/skel/.config/nvim/init.vim",
        ]
    );
}

#[tokio::test]
async fn test_upload_failure_propagates() {
    let session = RecordingSession::new().exit_when("put /mnt/etc/sudoers.d", 1);
    let result = steps::setup_sudo(&session, "/mnt", Path::new("/local/10-wheel")).await;
    assert!(result.is_err());
}

// ── post-install-cleanup ─────────────────────────────────────────────────────

const CACHE: &str = "/var/cache/pacman/pkg";

#[tokio::test]
async fn test_cleanup_unmounts_root_and_cache() {
    let session = RecordingSession::new();
    steps::post_install_cleanup(&session, "/mnt", CACHE).await.expect("cleanup");
    assert_eq!(
        session.lines(),
        [
            "umount -R /mnt",
            "mountpoint -q /var/cache/pacman/pkg",
            "umount /var/cache/pacman/pkg",
        ]
    );
}

#[tokio::test]
async fn test_cleanup_tolerates_failed_recursive_unmount() {
    let session = RecordingSession::new().exit_when("umount -R", 32);
    steps::post_install_cleanup(&session, "/mnt", CACHE).await.expect("cleanup");
    assert!(session.ran("umount /var/cache/pacman/pkg"));
}

#[tokio::test]
async fn test_cleanup_skips_cache_when_not_mounted() {
    let session = RecordingSession::new().exit_when("mountpoint", 1);
    steps::post_install_cleanup(&session, "/mnt", CACHE).await.expect("cleanup");
    assert_eq!(session.lines().len(), 2);
}

#[tokio::test]
async fn test_cleanup_treats_failed_probe_as_unmounted() {
    let session = RecordingSession::new().unreachable_when("mountpoint");
    steps::post_install_cleanup(&session, "/mnt", CACHE).await.expect("cleanup");
    assert!(!session.ran("umount /var"));
}

#[tokio::test]
async fn test_cleanup_cache_unmount_failure_propagates() {
    let session = RecordingSession::new().exit_when("umount /var/cache", 1);
    assert!(steps::post_install_cleanup(&session, "/mnt", CACHE).await.is_err());
}
