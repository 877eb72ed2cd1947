//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::Profile;

/// Provision Arch Linux machines over SSH
#[derive(Parser)]
#[command(
    name = "archsmith",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Wipe a disk and install a complete system (full profile)
    Provision(commands::provision::ProvisionArgs),

    /// Install onto partitions already mounted at the install root
    ProvisionLaptop(commands::provision::ProvisionArgs),

    /// Add a login account to an installed machine
    CreateUser(commands::create_user::CreateUserArgs),

    /// Report the target's environment without changing anything
    Probe(commands::probe::ProbeArgs),

    /// Show the ordered steps of a profile
    Plan(commands::plan::PlanArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Default log filter for the `-v` count; `ARCHSMITH_LOG` overrides it.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            no_color,
            quiet,
            command,
            ..
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
        });
        match command {
            Command::Provision(args) => commands::provision::run(&app, args, Profile::Full).await,
            Command::ProvisionLaptop(args) => {
                commands::provision::run(&app, args, Profile::Laptop).await
            }
            Command::CreateUser(args) => commands::create_user::run(&app, args).await,
            Command::Probe(args) => commands::probe::run(&app, args).await,
            Command::Plan(args) => {
                commands::plan::run(&app, &args);
                Ok(ExitCode::SUCCESS)
            }
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => {
                commands::version::run();
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
