//! Domain types and validators for Archsmith configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::install::DEFAULT_PACKAGES;
use crate::domain::validate;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "install.device",
    "install.timezone",
    "install.locale",
    "cache.source",
    "artifacts.dir",
    "users.shell",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.archsmith/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArchsmithConfig {
    pub install: InstallConfig,
    pub cache: CacheConfig,
    pub artifacts: ArtifactsConfig,
    pub users: UsersConfig,
    pub ssh: SshConfig,
}

/// What gets installed, and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Whole disk to partition in the full profile.
    pub device: String,
    /// Mount point of the new system on the live host.
    pub root: String,
    pub timezone: String,
    pub locale: String,
    pub packages: Vec<String>,
    /// `--bootloader-id` for UEFI GRUB installs.
    pub bootloader_id: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            device: "/dev/sda".to_string(),
            root: "/mnt".to_string(),
            timezone: "America/Toronto".to_string(),
            locale: "en_CA.UTF-8".to_string(),
            packages: DEFAULT_PACKAGES.iter().map(ToString::to_string).collect(),
            bootloader_id: "GRUB".to_string(),
        }
    }
}

/// Network package cache mounted over NFS during `pacstrap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// NFS export, e.g. `192.168.2.20:/packages`. `None` skips the mount.
    pub source: Option<String>,
    pub options: String,
    pub mount_point: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            source: Some("192.168.2.20:/packages".to_string()),
            options: "timeo=100,retry=0".to_string(),
            mount_point: "/var/cache/pacman/pkg".to_string(),
        }
    }
}

/// Where local files uploaded to the target come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory holding `dhcp.network`, `10-wheel`, `init.vim`,
    /// `authorized_keys`.
    pub dir: String,
    /// Local mirror list uploaded verbatim.
    pub mirrorlist: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            mirrorlist: "/etc/pacman.d/mirrorlist".to_string(),
        }
    }
}

/// Defaults for accounts created with `create-user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    pub shell: String,
    pub admin_group: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            shell: "/usr/bin/fish".to_string(),
            admin_group: "wheel".to_string(),
        }
    }
}

/// Options for the `ssh`/`scp` client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Extra `-o` options passed to every invocation.
    pub options: Vec<String>,
    /// Per-command limit; `None` waits indefinitely (pacstrap can be slow).
    pub timeout_secs: Option<u64>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            options: vec!["StrictHostKeyChecking=accept-new".to_string()],
            timeout_secs: None,
        }
    }
}

impl ArchsmithConfig {
    /// Set one whitelisted key. Validates the value first.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unknown keys or invalid values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "install.device" => self.install.device = value.to_string(),
            "install.timezone" => self.install.timezone = value.to_string(),
            "install.locale" => self.install.locale = value.to_string(),
            "cache.source" => {
                self.cache.source = match value {
                    "" | "none" => None,
                    v => Some(v.to_string()),
                }
            }
            "artifacts.dir" => self.artifacts.dir = value.to_string(),
            "users.shell" => self.users.shell = value.to_string(),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }

    /// Check every value that ends up in a remote command.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        validate_config_value("install.device", &self.install.device)?;
        validate_config_value("install.timezone", &self.install.timezone)?;
        validate_config_value("install.locale", &self.install.locale)?;
        validate_config_value("users.shell", &self.users.shell)?;
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let reason = match key {
        "install.device" => validate::validate_device(value).err().map(|e| e.to_string()),
        "install.timezone" => validate::validate_timezone(value).err().map(|e| e.to_string()),
        "install.locale" => validate::validate_locale(value).err().map(|e| e.to_string()),
        "users.shell" => (!value.starts_with('/') || value.contains(char::is_whitespace))
            .then(|| "Shell must be an absolute path".to_string()),
        "artifacts.dir" => value
            .is_empty()
            .then(|| "Directory must not be empty".to_string()),
        _ => None,
    };
    match reason {
        Some(reason) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
