//! Checkout orchestration: the sequential pipeline behind every command
//!
//! Steps run strictly in order, each a potential abort point, with no
//! rollback: every mutating step deletes before it creates, so re-running
//! the command is the recovery path after a mid-run failure.

use std::fs;

use tracing::{info, warn};

use mpm_fs::ops;

use crate::context::RunContext;
use crate::diff::{self, DiffReport};
use crate::error::{Error, Result};
use crate::hooks;
use crate::manifest::{LinkKind, Manifest, SimpleFileRule};
use crate::modfile::{self, Direction};
use crate::project::{self, ProjectValues};
use crate::resolver::PathResolver;

/// Flags controlling a checkout run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutOptions {
    /// Overwrite even when the diff gate finds hand edits.
    pub force: bool,
    /// Do not run before/after hook commands.
    pub skip_commands: bool,
    /// Copy everything, never link.
    pub copy_only: bool,
}

impl CheckoutOptions {
    /// The fixed flag set of `qcheckout`: force on, hooks off.
    pub fn quick(copy_only: bool) -> Self {
        Self {
            force: true,
            skip_commands: true,
            copy_only,
        }
    }
}

/// How a checkout run ended.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// All steps ran to completion.
    Completed,
    /// The diff gate found hand edits and no `--force` was given; the
    /// filesystem was not touched.
    HaltedOnDiff(DiffReport),
}

/// Materialize `project`'s working tree from the templates.
pub fn checkout(
    manifest: &Manifest,
    ctx: &RunContext,
    project: &str,
    opts: CheckoutOptions,
) -> Result<CheckoutOutcome> {
    let resolver = PathResolver::new(manifest, ctx);
    info!(project, "checking out");

    // 1. Validate
    ensure_project_exists(&resolver, project)?;

    // 2. Diff gate - controlled early stop, nothing touched yet.
    let report = diff::diff_project(manifest, &resolver, project)?;
    if !report.is_empty() && !opts.force {
        warn!("destination files differ from their sources; pass --force to overwrite");
        return Ok(CheckoutOutcome::HaltedOnDiff(report));
    }

    // 3. Load project config values
    let values = project::load_values(manifest, &resolver, project)?;

    // 4. Before hooks
    if opts.skip_commands || manifest.execute_before.is_empty() {
        info!("skipping execute_before");
    } else {
        hooks::run_hooks(&manifest.execute_before, &resolver, project, &values)?;
    }

    // 5. Delete list
    for template in &manifest.delete_list {
        let path = resolver.resolve(template, Some(project), Some(&values))?;
        ops::remove_any(&path)?;
    }

    // 6. Simple link/copy rules
    info!("processing linked/copied files");
    for rule in &manifest.simple_files {
        materialize_simple(rule, &resolver, project, &values, opts.copy_only)?;
    }

    // 7. Mod files
    info!("processing mod files");
    for rule in &manifest.mod_files {
        let dest = resolver.resolve(&rule.dest, Some(project), Some(&values))?;
        ops::remove_any(&dest)?;
        modfile::process(rule, Direction::Generate, &resolver, project, &values)?;
    }

    // 8. Link the project config into the destination
    let config_src = resolver.resolve(&manifest.project_config_file, Some(project), Some(&values))?;
    let config_dest =
        resolver.resolve(&manifest.project_config_destination, Some(project), Some(&values))?;
    ops::remove_any(&config_dest)?;
    ops::ensure_parent(&config_dest)?;
    if opts.copy_only {
        info!(src = %config_src.display(), dest = %config_dest.display(), "copying project config");
        ops::copy_recursive(&config_src, &config_dest)?;
    } else {
        info!(src = %config_src.display(), dest = %config_dest.display(), "linking project config");
        ops::link(&config_src, &config_dest)?;
    }

    // 9. After hooks
    if opts.skip_commands || manifest.execute_after.is_empty() {
        info!("skipping execute_after");
    } else {
        hooks::run_hooks(&manifest.execute_after, &resolver, project, &values)?;
    }

    // 10. Done
    info!(project, "checkout complete");
    Ok(CheckoutOutcome::Completed)
}

fn materialize_simple(
    rule: &SimpleFileRule,
    resolver: &PathResolver<'_>,
    project: &str,
    values: &ProjectValues,
    copy_only: bool,
) -> Result<()> {
    let source = resolver.resolve(&rule.src, Some(project), Some(values))?;
    let dest = resolver.resolve(&rule.dest, Some(project), Some(values))?;

    if !source.exists() {
        return Err(mpm_fs::Error::SourceMissing { path: source }.into());
    }

    // Delete-before-create keeps the step idempotent.
    ops::remove_any(&dest)?;
    ops::ensure_parent(&dest)?;

    if rule.kind == LinkKind::Copy || copy_only {
        info!(src = %source.display(), dest = %dest.display(), "copying");
        ops::copy_recursive(&source, &dest)?;
    } else {
        info!(src = %source.display(), dest = %dest.display(), "linking");
        ops::link(&source, &dest)?;
    }
    Ok(())
}

fn ensure_project_exists(resolver: &PathResolver<'_>, project: &str) -> Result<()> {
    if !resolver.project_dir(project).is_dir() {
        return Err(Error::ProjectMissing {
            name: project.to_string(),
        });
    }
    Ok(())
}

/// Regenerate the common-tree mod files from a live project, swapping
/// the placeholder tokens back in.
///
/// Project values are fully loaded before any path resolution so that
/// `[_config:]` tokens inside mod-file paths resolve the same way they
/// do during checkout.
pub fn update(manifest: &Manifest, ctx: &RunContext, project: &str) -> Result<()> {
    let resolver = PathResolver::new(manifest, ctx);
    info!(project, "updating common files from project");

    ensure_project_exists(&resolver, project)?;
    let values = project::load_values(manifest, &resolver, project)?;

    for rule in &manifest.mod_files {
        modfile::process(rule, Direction::ExtractPlaceholder, &resolver, project, &values)?;
    }

    info!(project, "update complete");
    Ok(())
}

/// Seed a new project directory from the current destination tree.
///
/// The reverse of checkout: each simple rule's destination content is
/// copied back to its source location, and the live config is copied
/// back to the template config location when present.
pub fn new_project(manifest: &Manifest, ctx: &RunContext, project: &str) -> Result<()> {
    let resolver = PathResolver::new(manifest, ctx);
    info!(project, "creating new project");

    let project_dir = resolver.project_dir(project);
    if project_dir.exists() {
        return Err(Error::ProjectExists {
            name: project.to_string(),
        });
    }
    fs::create_dir_all(&project_dir).map_err(|e| mpm_fs::Error::io(&project_dir, e))?;

    for rule in &manifest.simple_files {
        let seed_from = resolver.resolve(&rule.dest, Some(project), None)?;
        let seed_to = resolver.resolve(&rule.src, Some(project), None)?;
        info!(src = %seed_from.display(), dest = %seed_to.display(), "seeding");
        ops::ensure_parent(&seed_to)?;
        ops::copy_recursive(&seed_from, &seed_to)?;
    }

    let live_config = resolver.resolve(&manifest.project_config_destination, Some(project), None)?;
    let template_config = resolver.resolve(&manifest.project_config_file, Some(project), None)?;
    if live_config.exists() {
        info!(src = %live_config.display(), dest = %template_config.display(), "copying config");
        ops::ensure_parent(&template_config)?;
        ops::copy_recursive(&live_config, &template_config)?;
    } else {
        warn!(path = %live_config.display(), "live config does not exist, not copied");
    }

    info!(project, "project created");
    Ok(())
}

/// Destination paths of every simple and mod rule, relative to the
/// destination root, formatted as `.gitignore` entries.
pub fn gitignore_entries(manifest: &Manifest, ctx: &RunContext) -> Result<Vec<String>> {
    let resolver = PathResolver::new(manifest, ctx);
    let dest_root = resolver.resolve(&manifest.destination_root, None, None)?;

    let dest_templates = manifest
        .simple_files
        .iter()
        .map(|r| &r.dest)
        .chain(manifest.mod_files.iter().map(|r| &r.dest));

    let mut entries = Vec::new();
    for template in dest_templates {
        let path = resolver.resolve(template, None, None)?;
        let entry = match path.strip_prefix(&dest_root) {
            Ok(rel) => format!("/{}", rel.to_string_lossy().replace('\\', "/")),
            // Outside the destination root: emit the absolute path so
            // the entry is at least visible.
            Err(_) => path.to_string_lossy().into_owned(),
        };
        entries.push(entry);
    }
    Ok(entries)
}
