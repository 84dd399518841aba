//! Command implementations bridging the parsed CLI onto mpm-core

use std::path::Path;

use colored::Colorize;

use mpm_core::diff::{ChangeKind, DiffReport};
use mpm_core::{
    checkout, context, CheckoutOptions, CheckoutOutcome, Manifest, RunContext,
};

use crate::error::{CliError, Result};

const MANIFEST_TEMPLATE: &str = include_str!("template.toml");

/// Write the starter manifest, refusing to clobber an existing one.
pub fn run_init(cwd: &Path) -> Result<()> {
    let path = cwd.join(mpm_core::manifest::MANIFEST_FILE);
    if path.exists() {
        println!(
            "{} {} already exists, leaving it alone",
            "warning:".yellow().bold(),
            path.display()
        );
        return Ok(());
    }
    mpm_fs::io::write_text(&path, MANIFEST_TEMPLATE)?;
    println!("{} wrote {}", "init:".green().bold(), path.display());
    println!("Edit it to describe your projects, then run {}.", "mpm new <name>".cyan());
    Ok(())
}

pub fn run_new(cwd: &Path, name: &str, overrides: &[String], env: &str) -> Result<()> {
    let (manifest, ctx) = load(cwd, overrides, env)?;
    validate_name(name)?;
    checkout::new_project(&manifest, &ctx, name)?;
    println!("{} project {} created", "new:".green().bold(), name.bold());
    Ok(())
}

pub fn run_update(cwd: &Path, name: &str, overrides: &[String], env: &str) -> Result<()> {
    let (manifest, ctx) = load(cwd, overrides, env)?;
    validate_name(name)?;
    checkout::update(&manifest, &ctx, name)?;
    println!("{} common files refreshed from {}", "update:".green().bold(), name.bold());
    Ok(())
}

pub fn run_diff(cwd: &Path, name: &str, overrides: &[String], env: &str) -> Result<()> {
    let (manifest, ctx) = load(cwd, overrides, env)?;
    validate_name(name)?;
    let resolver = mpm_core::PathResolver::new(&manifest, &ctx);
    let report = mpm_core::diff::diff_project(&manifest, &resolver, name)?;
    if report.is_empty() {
        println!("{} no differences", "diff:".green().bold());
    } else {
        print_report(&report);
    }
    Ok(())
}

pub fn run_gitignore(cwd: &Path, overrides: &[String], env: &str) -> Result<()> {
    let (manifest, ctx) = load(cwd, overrides, env)?;
    for entry in checkout::gitignore_entries(&manifest, &ctx)? {
        println!("{entry}");
    }
    Ok(())
}

pub fn run_checkout(
    cwd: &Path,
    name: &str,
    opts: CheckoutOptions,
    overrides: &[String],
    env: &str,
) -> Result<()> {
    let (manifest, ctx) = load(cwd, overrides, env)?;
    validate_name(name)?;

    match checkout::checkout(&manifest, &ctx, name, opts)? {
        CheckoutOutcome::Completed => {
            println!("{} {} checked out", "checkout:".green().bold(), name.bold());
            Ok(())
        }
        CheckoutOutcome::HaltedOnDiff(report) => {
            print_report(&report);
            Err(CliError::user(
                "destination has hand edits; run `mpm update` to keep them or pass --force to discard",
            ))
        }
    }
}

fn load(cwd: &Path, overrides: &[String], env: &str) -> Result<(Manifest, RunContext)> {
    let path = cwd.join(mpm_core::manifest::MANIFEST_FILE);
    let mut manifest = Manifest::load(&path)?;
    manifest.apply_overrides(&context::pair_overrides(overrides));
    Ok((manifest, RunContext::new(cwd, env)))
}

fn validate_name(name: &str) -> Result<()> {
    if mpm_core::project::is_valid_project_name(name) {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "invalid project name '{name}': only letters, digits, '-' and '_' are allowed"
        )))
    }
}

fn print_report(report: &DiffReport) {
    for (file, spans) in report.iter() {
        if spans.is_empty() {
            continue;
        }
        println!("{}", file.bold().underline());
        for span in spans {
            let label = match span.kind {
                ChangeKind::Added => format!("added at line {}:", span.start_line).green(),
                ChangeKind::Removed => format!("removed at line {}:", span.start_line).red(),
            };
            println!("  {label}");
            for line in span.text.lines() {
                match span.kind {
                    ChangeKind::Added => println!("    {}", format!("+ {line}").green()),
                    ChangeKind::Removed => println!("    {}", format!("- {line}").red()),
                }
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_writes_a_parseable_manifest() {
        let temp = TempDir::new().unwrap();
        run_init(temp.path()).unwrap();

        let written =
            std::fs::read_to_string(temp.path().join(mpm_core::manifest::MANIFEST_FILE)).unwrap();
        let manifest = Manifest::parse(&written).unwrap();
        assert_eq!(manifest.project_root, "../projects/apps");
        assert!(!manifest.simple_files.is_empty());
        assert!(!manifest.mod_files.is_empty());
    }

    #[test]
    fn init_does_not_clobber() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(mpm_core::manifest::MANIFEST_FILE);
        std::fs::write(&path, "# mine\n").unwrap();

        run_init(temp.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
    }

    #[test]
    fn bad_project_name_is_a_user_error() {
        let err = validate_name("../escape").unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = run_diff(temp.path(), "demo", &[], "").unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(mpm_core::Error::ManifestNotFound { .. })
        ));
    }
}
