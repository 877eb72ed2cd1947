//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs` or `std::process`, and does no
//! networking (`std::net` appears only to parse address literals).
//! All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod command;
pub mod config;
pub mod error;
pub mod install;
pub mod target;
pub mod validate;
pub mod workflow;

pub use artifact::{Artifact, ArtifactPaths};
pub use command::RemoteCommand;
pub use config::{ArchsmithConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, ProvisionError, ValidationError};
pub use install::{DiskLayout, PackageSet};
pub use target::{Credentials, Secret, Target};
pub use workflow::{Profile, Step};
