//! Local files uploaded verbatim to the target.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::workflow::Step;

/// A local input file the workflow uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// pacman mirror list.
    Mirrorlist,
    /// systemd-networkd link unit enabling DHCP.
    DhcpNetwork,
    /// sudoers drop-in granting the admin group.
    Sudoers,
    /// Default editor config placed in `/etc/skel`.
    EditorConfig,
    /// SSH public keys allowed to log in.
    AuthorizedKeys,
}

impl Artifact {
    /// File name looked up in the artifacts directory (and in the embedded
    /// defaults).
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Mirrorlist => "mirrorlist",
            Self::DhcpNetwork => "dhcp.network",
            Self::Sudoers => "10-wheel",
            Self::EditorConfig => "init.vim",
            Self::AuthorizedKeys => "authorized_keys",
        }
    }

    /// Whether the binary ships a default for this file.
    #[must_use]
    pub fn has_embedded_default(self) -> bool {
        matches!(self, Self::DhcpNetwork | Self::Sudoers | Self::EditorConfig)
    }
}

impl Step {
    /// Local file this step uploads, if any.
    #[must_use]
    pub fn artifact(self) -> Option<Artifact> {
        match self {
            Self::UploadMirrorlist => Some(Artifact::Mirrorlist),
            Self::EnableDhcp => Some(Artifact::DhcpNetwork),
            Self::SetupSudo => Some(Artifact::Sudoers),
            Self::CreateSkel => Some(Artifact::EditorConfig),
            Self::InstallKeys => Some(Artifact::AuthorizedKeys),
            _ => None,
        }
    }
}

/// Local paths of every artifact a run needs, resolved before the run
/// starts so a missing file is reported before anything is changed.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPaths {
    paths: HashMap<Artifact, PathBuf>,
}

impl ArtifactPaths {
    pub fn insert(&mut self, artifact: Artifact, path: PathBuf) {
        self.paths.insert(artifact, path);
    }

    /// # Errors
    ///
    /// Returns an error if `artifact` was not resolved before the run.
    pub fn get(&self, artifact: Artifact) -> anyhow::Result<&Path> {
        self.paths
            .get(&artifact)
            .map(PathBuf::as_path)
            .ok_or_else(|| anyhow::anyhow!("{} was not resolved", artifact.file_name()))
    }
}
