//! Shared test helpers: exit statuses, output constructors and fixtures.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{ExitStatus, Output};

use archsmith_cli::domain::{Artifact, ArtifactPaths, Secret, Target};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn target(spec: &str) -> Target {
    spec.parse().unwrap_or_else(|e| panic!("bad target {spec}: {e}"))
}

pub fn password() -> Secret {
    Secret::new("hunter2")
}

/// Every artifact mapped to `/local/<file name>`. Uploads are mocked, so
/// the files need not exist.
pub fn artifact_paths() -> ArtifactPaths {
    let mut paths = ArtifactPaths::default();
    for artifact in [
        Artifact::Mirrorlist,
        Artifact::DhcpNetwork,
        Artifact::Sudoers,
        Artifact::EditorConfig,
        Artifact::AuthorizedKeys,
    ] {
        paths.insert(
            artifact,
            PathBuf::from(format!("/local/{}", artifact.file_name())),
        );
    }
    paths
}
