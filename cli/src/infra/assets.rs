//! Local artifact resolution with embedded fallbacks.
//!
//! At compile time, `include_dir!` embeds everything under `assets/`:
//!   - `dhcp.network` — systemd-networkd unit enabling DHCP on `en*`
//!   - `10-wheel`     — sudoers drop-in for the admin group
//!   - `init.vim`     — default editor config for new users
//!
//! `authorized_keys` and the mirror list are never embedded: they are
//! specific to the operator and must exist locally.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

use crate::application::ports::ArtifactSource;
use crate::domain::config::ArtifactsConfig;
use crate::domain::{Artifact, ProvisionError};

static EMBEDDED_DEFAULTS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Extract all embedded defaults to a temporary directory.
///
/// The returned [`tempfile::TempDir`] deletes the directory when dropped.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created or if any
/// file fails to extract.
pub fn extract_defaults() -> Result<tempfile::TempDir> {
    let dir = tempfile::tempdir().context("creating temp dir for default artifacts")?;
    EMBEDDED_DEFAULTS
        .extract(dir.path())
        .context("extracting default artifacts")?;
    Ok(dir)
}

/// Production `ArtifactSource`: the configured directory first, then the
/// embedded defaults.
pub struct LocalArtifactSource {
    dir: PathBuf,
    mirrorlist: PathBuf,
    defaults: tempfile::TempDir,
}

impl LocalArtifactSource {
    /// # Errors
    ///
    /// Returns an error if the embedded defaults cannot be extracted.
    pub fn new(config: &ArtifactsConfig) -> Result<Self> {
        Ok(Self {
            dir: PathBuf::from(&config.dir),
            mirrorlist: PathBuf::from(&config.mirrorlist),
            defaults: extract_defaults()?,
        })
    }

    fn missing(artifact: Artifact, searched: &Path) -> anyhow::Error {
        ProvisionError::MissingArtifact {
            name: artifact.file_name().to_string(),
            searched: searched.display().to_string(),
        }
        .into()
    }
}

impl ArtifactSource for LocalArtifactSource {
    fn resolve(&self, artifact: Artifact) -> Result<PathBuf> {
        if artifact == Artifact::Mirrorlist {
            return if self.mirrorlist.is_file() {
                Ok(self.mirrorlist.clone())
            } else {
                Err(Self::missing(artifact, &self.mirrorlist))
            };
        }

        let local = self.dir.join(artifact.file_name());
        if local.is_file() {
            return Ok(local);
        }
        if artifact.has_embedded_default() {
            tracing::debug!(artifact = artifact.file_name(), "using built-in default");
            return Ok(self.defaults.path().join(artifact.file_name()));
        }
        Err(Self::missing(artifact, &self.dir))
    }
}
