//! Remote host identity and connection credentials.
//!
//! Pure types only — parsing and the loopback predicate used by the
//! safety gate. No I/O.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::domain::error::ValidationError;

/// Default SSH user for a freshly booted Arch ISO.
pub const DEFAULT_USER: &str = "root";
/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// A remote host to provision, parsed from `[user@]host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub user: String,
    pub host: String,
    pub port: u16,
}

impl Target {
    /// `true` when the target names the machine running the tool.
    ///
    /// Matches `localhost*` and `127.*` by prefix (case-insensitive), and
    /// any IP literal for a loopback address in whatever spelling, including
    /// IPv4-mapped IPv6 (`::ffff:127.0.0.1`).
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        let host = self.host.to_ascii_lowercase();
        if host.starts_with("localhost") || host.starts_with("127.") {
            return true;
        }
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => v4.is_loopback(),
            Ok(IpAddr::V6(v6)) => {
                v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback())
            }
            Err(_) => false,
        }
    }

    /// `user@host` for `ssh`.
    #[must_use]
    pub fn ssh_destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// `user@host:path` for `scp`; IPv6 literals are bracketed.
    #[must_use]
    pub fn scp_destination(&self, remote_path: &str) -> String {
        if self.host.contains(':') {
            format!("{}@[{}]:{remote_path}", self.user, self.host)
        } else {
            format!("{}@{}:{remote_path}", self.user, self.host)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == DEFAULT_PORT {
            write!(f, "{}@{}", self.user, self.host)
        } else if self.host.contains(':') {
            write!(f, "{}@[{}]:{}", self.user, self.host, self.port)
        } else {
            write!(f, "{}@{}:{}", self.user, self.host, self.port)
        }
    }
}

impl FromStr for Target {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTarget(s.to_string());
        let s = s.trim();

        let (user, rest) = match s.split_once('@') {
            Some((user, rest)) => (user, rest),
            None => (DEFAULT_USER, s),
        };
        // a leading '-' would be read as an ssh option
        if user.is_empty() || user.starts_with('-') || user.contains(char::is_whitespace) {
            return Err(invalid());
        }

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            // [v6]:port or [v6]
            let (host, tail) = bracketed.split_once(']').ok_or_else(invalid)?;
            let port = match tail.strip_prefix(':') {
                Some(p) => p.parse().map_err(|_| invalid())?,
                None if tail.is_empty() => DEFAULT_PORT,
                None => return Err(invalid()),
            };
            (host, port)
        } else if rest.matches(':').count() > 1 {
            // bare IPv6 literal, no port
            (rest, DEFAULT_PORT)
        } else if let Some((host, port)) = rest.split_once(':') {
            (host, port.parse().map_err(|_| invalid())?)
        } else {
            (rest, DEFAULT_PORT)
        };

        if host.is_empty()
            || host.starts_with('-')
            || host.contains(char::is_whitespace)
            || host.contains('/')
        {
            return Err(invalid());
        }

        Ok(Self {
            user: user.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

/// A secret string that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plaintext. Callers must only hand it to stdin of a
    /// remote process or to the SSH client environment.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Credentials used to open the remote session.
///
/// The password, when present, is also what the provisioning workflow sets
/// as the new system's root password.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub password: Option<Secret>,
}

impl Credentials {
    /// Key-based (or agent-based) authentication only.
    #[must_use]
    pub fn key_only() -> Self {
        Self { password: None }
    }

    #[must_use]
    pub fn with_password(password: Secret) -> Self {
        Self {
            password: Some(password),
        }
    }
}
