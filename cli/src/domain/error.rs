//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors that stop a provisioning run before or during the workflow.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Refusing to run on localhost ({0})")]
    LoopbackTarget(String),

    #[error("Target has no internet connectivity; nothing was changed.")]
    Offline,

    #[error("{0} is not a block device")]
    NotABlockDevice(String),

    #[error("Required local file not found: {name} (looked in {searched})")]
    MissingArtifact { name: String, searched: String },

    #[error("No connection password available. Set ARCHSMITH_PASSWORD or answer the prompt.")]
    MissingPassword,

    #[error("Remote command failed (exit {code}): {command}\n{stderr}")]
    CommandFailed {
        command: String,
        code: String,
        stderr: String,
    },
}

// ── Validation errors ─────────────────────────────────────────────────────────

/// Errors raised while validating operator-supplied values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid target '{0}': expected [user@]host[:port]")]
    InvalidTarget(String),

    #[error("Invalid hostname '{0}': must be 1-63 chars of [a-z0-9-], not starting or ending with '-'")]
    InvalidHostname(String),

    #[error("Invalid username '{0}': must match ^[a-z_][a-z0-9_-]{{0,31}}$")]
    InvalidUsername(String),

    #[error("Invalid timezone '{0}': expected Region/City under /usr/share/zoneinfo")]
    InvalidTimezone(String),

    #[error("Invalid locale '{0}': expected e.g. en_CA.UTF-8")]
    InvalidLocale(String),

    #[error("Invalid block device path '{0}': expected /dev/<name>")]
    InvalidDevice(String),

    #[error("Passwords must be non-empty and must not contain line breaks")]
    InvalidPassword,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
