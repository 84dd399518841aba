//! mpm CLI
//!
//! Checks per-project file sets in and out of a shared template tree.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;
use mpm_core::CheckoutOptions;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let cwd = dunce::canonicalize(std::env::current_dir()?)?;

    match cli.command {
        Some(Commands::Init) => commands::run_init(&cwd),
        Some(Commands::New { name, common }) => {
            commands::run_new(&cwd, &name, &common.overrides, &common.env)
        }
        Some(Commands::Update { name, common }) => {
            commands::run_update(&cwd, &name, &common.overrides, &common.env)
        }
        Some(Commands::Diff { name, common }) => {
            commands::run_diff(&cwd, &name, &common.overrides, &common.env)
        }
        Some(Commands::Gitignore { common }) => {
            commands::run_gitignore(&cwd, &common.overrides, &common.env)
        }
        Some(Commands::Checkout {
            name,
            force,
            copy_only,
            skip_commands,
            common,
        }) => {
            let opts = CheckoutOptions {
                force,
                skip_commands,
                copy_only,
            };
            commands::run_checkout(&cwd, &name, opts, &common.overrides, &common.env)
        }
        Some(Commands::Qcheckout {
            name,
            copy_only,
            common,
        }) => {
            let opts = CheckoutOptions::quick(copy_only);
            commands::run_checkout(&cwd, &name, opts, &common.overrides, &common.env)
        }
        None => {
            // No command provided - show help hint
            println!("{} multi-project manager", "mpm".green().bold());
            println!();
            println!("Run {} for available commands.", "mpm --help".cyan());
            Ok(())
        }
    }
}
