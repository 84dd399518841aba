//! Before/after checkout hooks executed as shell subprocesses
//!
//! Hook entries are shell command templates resolved through the same
//! token expansion as paths, then run sequentially through the platform
//! shell with inherited stdio. The run blocks until each command exits;
//! there is no timeout, so a hung command hangs the whole run (known
//! limitation). The first non-zero exit aborts the remaining steps.

use std::process::Command;

use tracing::info;

use crate::error::{Error, Result};
use crate::project::ProjectValues;
use crate::resolver::PathResolver;

/// Expand and run each hook template in list order, stopping at the
/// first failure.
pub fn run_hooks(
    commands: &[String],
    resolver: &PathResolver<'_>,
    project: &str,
    values: &ProjectValues,
) -> Result<()> {
    for template in commands {
        let command = resolver.expand(template, Some(project), Some(values))?;
        run_shell(&command)?;
    }
    Ok(())
}

/// Run one command through the platform shell, inheriting stdio, and
/// wait for it to exit.
pub fn run_shell(command: &str) -> Result<()> {
    info!(%command, "executing command");
    let status = shell(command).status()?;

    if !status.success() {
        return Err(Error::HookFailed {
            command: command.to_string(),
            code: status.code(),
        });
    }
    info!(%command, "command finished");
    Ok(())
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
