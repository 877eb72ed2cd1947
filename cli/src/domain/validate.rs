//! Pure validators for operator-supplied values — no I/O, no async.
//!
//! Every value that ends up inside a remote command or a remote file is
//! checked here first, before any command is built.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ValidationError;

/// Single DNS label: the new machine's short hostname.
pub static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern — cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("valid regex")
});

/// Same rule `useradd` applies by default (`NAME_REGEX`).
pub static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("valid regex")
});

/// Zone names as laid out under `/usr/share/zoneinfo`.
pub static TIMEZONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_+-]+(/[A-Za-z0-9_+-]+)*$").expect("valid regex")
});

/// glibc locale names, e.g. `en_CA.UTF-8` or `de_DE@euro`.
pub static LOCALE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z]{2,3}(_[A-Z]{2})?(\.[A-Za-z0-9-]+)?(@[A-Za-z]+)?$").expect("valid regex")
});

pub static DEVICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^/dev/[A-Za-z0-9/_-]+$").expect("valid regex")
});

/// Validate the hostname given to the new machine.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidHostname`] when `name` is not a single
/// lowercase DNS label.
pub fn validate_hostname(name: &str) -> Result<(), ValidationError> {
    if HOSTNAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidHostname(name.to_string()))
    }
}

/// Validate a login name for a new account.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidUsername`] on mismatch.
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername(name.to_string()))
    }
}

/// Validate a timezone name. Rejects `..` so the name cannot leave
/// the zoneinfo tree.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimezone`] on mismatch.
pub fn validate_timezone(tz: &str) -> Result<(), ValidationError> {
    if TIMEZONE_RE.is_match(tz) && !tz.split('/').any(|part| part == "..") {
        Ok(())
    } else {
        Err(ValidationError::InvalidTimezone(tz.to_string()))
    }
}

/// # Errors
///
/// Returns [`ValidationError::InvalidLocale`] on mismatch.
pub fn validate_locale(locale: &str) -> Result<(), ValidationError> {
    if LOCALE_RE.is_match(locale) {
        Ok(())
    } else {
        Err(ValidationError::InvalidLocale(locale.to_string()))
    }
}

/// # Errors
///
/// Returns [`ValidationError::InvalidDevice`] when `path` is not under `/dev/`.
pub fn validate_device(path: &str) -> Result<(), ValidationError> {
    if DEVICE_RE.is_match(path) && !path.contains("..") {
        Ok(())
    } else {
        Err(ValidationError::InvalidDevice(path.to_string()))
    }
}

/// Passwords are fed to `chpasswd` one record per line.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPassword`] for empty values or values
/// containing `\n` / `\r`.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password.contains(['\n', '\r']) {
        Err(ValidationError::InvalidPassword)
    } else {
        Ok(())
    }
}

/// Whether a confirmation answer means "go ahead".
///
/// Only `y` and `yes` count, in any letter case, ignoring surrounding
/// whitespace. Everything else (including an empty answer) is a no.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
