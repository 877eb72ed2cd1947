//! Tests for account creation on an installed machine.

#![allow(clippy::expect_used)]

use std::path::Path;

use archsmith_cli::application::services::user_account::{NewAccount, create_user_account};
use archsmith_cli::domain::{ProvisionError, Secret};

use crate::helpers::target;
use crate::mocks::{Event, RecordingReporter, RecordingSession};

fn account<'a>(password: &'a Secret, admin: bool) -> NewAccount<'a> {
    NewAccount {
        username: "alice",
        password,
        admin,
        shell: "/usr/bin/fish",
        admin_group: "wheel",
        authorized_keys: Path::new("/local/authorized_keys"),
    }
}

#[tokio::test]
async fn test_admin_account_full_sequence() {
    let password = Secret::new("s3cret");
    let session = RecordingSession::new();
    let reporter = RecordingReporter::new();
    create_user_account(&session, &reporter, &target("10.0.0.7"), &account(&password, true))
        .await
        .expect("create");

    assert_eq!(
        session.lines(),
        [
            "useradd --user-group --create-home --shell /usr/bin/fish alice",
            "chpasswd",
            "mkdir -p /home/alice/.ssh",
            "put /home/alice/.ssh/authorized_keys",
            "cd /home/alice && chmod 700 .ssh",
            "cd /home/alice && chmod 600 .ssh/authorized_keys",
            "cd /home/alice && chown -R alice:alice .ssh",
            "usermod --append --groups wheel alice",
        ]
    );
    assert_eq!(session.stdin_of("chpasswd"), Some(b"alice:s3cret\n".to_vec()));
    assert!(reporter.of(Event::Success).iter().any(|m| m.contains("alice")));
}

#[tokio::test]
async fn test_non_admin_account_skips_group() {
    let password = Secret::new("s3cret");
    let session = RecordingSession::new();
    create_user_account(
        &session,
        &RecordingReporter::new(),
        &target("10.0.0.7"),
        &account(&password, false),
    )
    .await
    .expect("create");
    assert!(!session.ran("usermod"));
    assert_eq!(session.lines().len(), 7);
}

#[tokio::test]
async fn test_password_never_appears_in_commands() {
    let password = Secret::new("correct horse");
    let session = RecordingSession::new();
    create_user_account(
        &session,
        &RecordingReporter::new(),
        &target("10.0.0.7"),
        &account(&password, true),
    )
    .await
    .expect("create");
    assert!(session.lines().iter().all(|l| !l.contains("horse")));
}

#[tokio::test]
async fn test_mid_way_failure_reports_completed_work() {
    let password = Secret::new("s3cret");
    let session = RecordingSession::new().exit_when("cd /home/alice && chown", 1);
    let err = create_user_account(
        &session,
        &RecordingReporter::new(),
        &target("10.0.0.7"),
        &account(&password, true),
    )
    .await
    .expect_err("chown fails");
    let message = format!("{err:#}");
    assert!(message.contains("partially set up"), "got: {message}");
    assert!(
        message.contains("useradd, password, ssh directory, authorized_keys upload"),
        "got: {message}"
    );
    assert!(!session.ran("usermod"));
}

#[tokio::test]
async fn test_first_failure_reports_nothing_created() {
    let password = Secret::new("s3cret");
    let session = RecordingSession::new().exit_when("useradd", 9);
    let err = create_user_account(
        &session,
        &RecordingReporter::new(),
        &target("10.0.0.7"),
        &account(&password, true),
    )
    .await
    .expect_err("user exists");
    assert!(format!("{err:#}").contains("was not created"));
    assert_eq!(session.lines().len(), 1);
}

#[tokio::test]
async fn test_loopback_target_runs_nothing() {
    let password = Secret::new("s3cret");
    let session = RecordingSession::new();
    let err = create_user_account(
        &session,
        &RecordingReporter::new(),
        &target("127.0.0.1"),
        &account(&password, true),
    )
    .await
    .expect_err("loopback");
    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::LoopbackTarget(_))
    ));
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_username_runs_nothing() {
    let password = Secret::new("s3cret");
    let session = RecordingSession::new();
    let mut bad = account(&password, false);
    bad.username = "alice; rm -rf /";
    let result = create_user_account(&session, &RecordingReporter::new(), &target("10.0.0.7"), &bad).await;
    assert!(result.is_err());
    assert!(session.calls().is_empty());
}
