//! Mod-file processing: ordered regex substitution between the common
//! tree and the destination tree
//!
//! `Generate` patches common sources into live destination files,
//! embedding project config values. `ExtractPlaceholder` runs the other
//! way during `update`, substituting placeholder tokens back in so the
//! common copy carries no environment-specific values.

use tracing::{debug, info};

use mpm_fs::{io, ops};

use crate::error::Result;
use crate::manifest::ModFileRule;
use crate::project::ProjectValues;
use crate::resolver::PathResolver;

/// Which way content flows and which replacement template applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// common -> destination, `generate` replacements (checkout).
    Generate,
    /// destination -> common, `placeholder` replacements (update).
    ExtractPlaceholder,
}

/// Apply one mod-file rule in the given direction.
///
/// With replace rules the source must be a regular file; each rule
/// rewrites the cumulative output of the previous one, and the result
/// fully overwrites the destination. Without rules the step degenerates
/// to a plain recursive overwrite copy.
pub fn process(
    rule: &ModFileRule,
    direction: Direction,
    resolver: &PathResolver<'_>,
    project: &str,
    values: &ProjectValues,
) -> Result<()> {
    let (src_template, dest_template) = match direction {
        Direction::Generate => (&rule.src, &rule.dest),
        Direction::ExtractPlaceholder => (&rule.dest, &rule.src),
    };
    let source = resolver.resolve(src_template, Some(project), Some(values))?;
    let dest = resolver.resolve(dest_template, Some(project), Some(values))?;

    if !rule.has_rules() {
        info!(src = %source.display(), dest = %dest.display(), "copying mod file (no rules)");
        ops::ensure_parent(&dest)?;
        ops::copy_recursive(&source, &dest)?;
        return Ok(());
    }

    if !source.is_file() {
        return Err(mpm_fs::Error::NotAFile { path: source }.into());
    }

    let compiled = match direction {
        Direction::Generate => rule.rules_for(values)?,
        Direction::ExtractPlaceholder => rule.placeholder_rules()?,
    };

    info!(src = %source.display(), dest = %dest.display(), rules = compiled.len(), "patching mod file");
    let mut content = io::read_text(&source)?;
    for compiled_rule in &compiled {
        debug!(pattern = %compiled_rule.pattern, "applying replace rule");
        content = compiled_rule
            .pattern
            .replace(&content, compiled_rule.replacement.as_str())
            .into_owned();
    }

    ops::ensure_parent(&dest)?;
    io::write_text(&dest, &content)?;
    Ok(())
}
