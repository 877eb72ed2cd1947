//! Tests for the safety gate.

#![allow(clippy::expect_used)]

use archsmith_cli::application::services::safety;
use archsmith_cli::domain::ProvisionError;

use crate::helpers::target;
use crate::mocks::{CannedAnswer, Event, RecordingReporter};

#[test]
fn test_loopback_targets_are_refused() {
    for spec in ["localhost", "LOCALHOST", "root@localhost.localdomain", "127.0.0.1", "127.1.2.3:2222", "::1", "[::1]:22"] {
        let err = safety::check_target(&target(spec)).expect_err(spec);
        assert!(matches!(err, ProvisionError::LoopbackTarget(_)), "{spec}");
        assert!(err.to_string().contains("Refusing to run on localhost"));
    }
}

#[test]
fn test_remote_targets_pass_identity_check() {
    for spec in ["10.0.0.5", "root@archiso", "admin@192.168.2.30:2222", "[fe80::1]"] {
        assert!(safety::check_target(&target(spec)).is_ok(), "{spec}");
    }
}

#[test]
fn test_loopback_is_refused_before_prompting() {
    let confirmer = CannedAnswer::yes();
    let reporter = RecordingReporter::new();
    assert!(safety::authorize(&target("localhost"), &confirmer, &reporter).is_err());
    assert!(confirmer.prompts().is_empty());
    assert!(reporter.of(Event::Warn).is_empty());
}

#[test]
fn test_authorize_warns_with_host_then_asks() {
    let confirmer = CannedAnswer::new("yes");
    let reporter = RecordingReporter::new();
    let granted = safety::authorize(&target("10.0.0.5"), &confirmer, &reporter).expect("authorize");
    assert!(granted);
    assert_eq!(confirmer.prompts(), [safety::CONFIRM_PROMPT]);
    let warnings = reporter.of(Event::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("About to provision 10.0.0.5."));
    assert!(warnings[0].contains("destructive"));
}

#[test]
fn test_only_y_or_yes_grants() {
    let reporter = RecordingReporter::new();
    for (answer, expected) in [
        ("y", true),
        ("Y", true),
        ("yes", true),
        (" YeS \n", true),
        ("", false),
        ("n", false),
        ("no", false),
        ("yess", false),
        ("sure", false),
    ] {
        let granted = safety::authorize(&target("10.0.0.5"), &CannedAnswer::new(answer), &reporter)
            .expect("authorize");
        assert_eq!(granted, expected, "answer {answer:?}");
    }
}
