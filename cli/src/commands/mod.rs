//! Command implementations

pub mod config;
pub mod create_user;
pub mod plan;
pub mod probe;
pub mod provision;
pub mod version;

use clap::Args;

use crate::domain::Target;

/// Which machine to work on.
#[derive(Args)]
pub struct TargetArgs {
    /// Target host as [user@]host[:port] (user defaults to root)
    #[arg(short = 'H', long = "host", value_name = "TARGET")]
    pub target: Target,
}
