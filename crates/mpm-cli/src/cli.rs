//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};

/// Multi-project manager - check projects in and out of a shared tree
#[derive(Parser, Debug)]
#[command(name = "mpm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by every project-taking command.
#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct CommonOpts {
    /// Override a manifest value: -o KEY VALUE (repeatable)
    #[arg(short = 'o', long = "overwrite-config", num_args = 2, value_names = ["KEY", "VALUE"], action = clap::ArgAction::Append)]
    pub overrides: Vec<String>,

    /// Environment modifier inserted into [env] tokens
    #[arg(short, long, default_value = "")]
    pub env: String,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write a starter mpm.toml into the current directory
    ///
    /// Does nothing if a manifest already exists.
    Init,

    /// Create a new project from the current destination tree
    ///
    /// Seeds the project directory by copying each configured
    /// destination back to its source location.
    New {
        /// Name of the project to create
        name: String,

        #[command(flatten)]
        common: CommonOpts,
    },

    /// Copy changed mod files from the destination back to the common tree
    Update {
        /// Name of the checked-out project
        name: String,

        #[command(flatten)]
        common: CommonOpts,
    },

    /// Show hand edits in the destination relative to the sources
    Diff {
        /// Name of the project to diff against
        name: String,

        #[command(flatten)]
        common: CommonOpts,
    },

    /// Print .gitignore entries for all managed destination files
    Gitignore {
        #[command(flatten)]
        common: CommonOpts,
    },

    /// Check a project out into the destination tree
    Checkout {
        /// Name of the project to check out
        name: String,

        /// Overwrite even when the destination has hand edits
        #[arg(short, long)]
        force: bool,

        /// Copy files instead of linking them
        #[arg(short, long = "copyonly")]
        copy_only: bool,

        /// Skip execute_before/execute_after commands
        #[arg(short, long)]
        skip_commands: bool,

        #[command(flatten)]
        common: CommonOpts,
    },

    /// Quick checkout: force overwrite, skip commands
    Qcheckout {
        /// Name of the project to check out
        name: String,

        /// Copy files instead of linking them
        #[arg(short, long = "copyonly")]
        copy_only: bool,

        #[command(flatten)]
        common: CommonOpts,
    },
}
