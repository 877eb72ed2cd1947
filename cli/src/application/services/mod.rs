//! Application services — use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import from `crate::domain`,
//! `crate::application::ports` and sibling services (e.g. `workflow` builds
//! on `safety`, `probe` and `steps`), never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod config_service;
pub mod probe;
pub mod remote;
pub mod safety;
pub mod steps;
pub mod user_account;
pub mod workflow;
