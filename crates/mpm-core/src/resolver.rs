//! Template token expansion and secure path resolution
//!
//! Path and command templates carry a fixed token set:
//!
//! - `[project_path]` - `<project_root>/<name>`, when a project is named
//! - `[env]` - the run context's environment modifier
//! - `[project_root]`, `[common_root]`, `[destination_root]` - absolute roots
//! - `[_config:KEY]` - a project config value, expanded repeatedly so
//!   chained tokens resolve too
//!
//! Every resolved path must stay inside the secure base path. That check
//! is lexical (dot segments collapse without touching the filesystem)
//! because checkout destinations usually do not exist yet. It is the sole
//! access-control mechanism, and a violation is always fatal.

use std::path::PathBuf;

use tracing::debug;

use mpm_fs::{fix_separators, is_descendant, lexical_join};

use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::project::ProjectValues;

const CONFIG_TOKEN_OPEN: &str = "[_config:";

/// How many nested `[_config:]` expansions to allow before declaring the
/// chain cyclic.
const MAX_CONFIG_TOKEN_DEPTH: usize = 64;

/// Resolves path and command templates against one manifest and run
/// context.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    manifest: &'a Manifest,
    ctx: &'a RunContext,
}

impl<'a> PathResolver<'a> {
    pub fn new(manifest: &'a Manifest, ctx: &'a RunContext) -> Self {
        Self { manifest, ctx }
    }

    /// Absolute form of a root setting, lexically joined onto the
    /// working root.
    fn absolute(&self, template_value: &str) -> PathBuf {
        lexical_join(&self.ctx.root, fix_separators(template_value))
    }

    /// Directory of a named project: `<project_root>/<name>`.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.absolute(&self.manifest.project_root).join(project)
    }

    /// Normalized absolute secure base, rejecting a base that collapses
    /// to the filesystem root.
    pub fn secure_base(&self) -> Result<PathBuf> {
        let base = self.absolute(&self.manifest.secure_base_path);
        if base.parent().is_none() {
            return Err(Error::SecureBaseIsRoot {
                path: PathBuf::from(&self.manifest.secure_base_path),
            });
        }
        Ok(base)
    }

    /// Expand every token of `template` without treating the result as a
    /// path. This is the entry point for hook command templates.
    pub fn expand(
        &self,
        template: &str,
        project: Option<&str>,
        values: Option<&ProjectValues>,
    ) -> Result<String> {
        let mut out = template.to_string();

        if let Some(name) = project {
            out = out.replace("[project_path]", &self.project_dir(name).to_string_lossy());
        }
        out = out.replace("[env]", &self.ctx.env);
        out = out.replace(
            "[project_root]",
            &self.absolute(&self.manifest.project_root).to_string_lossy(),
        );
        out = out.replace(
            "[common_root]",
            &self.absolute(&self.manifest.common_root).to_string_lossy(),
        );
        out = out.replace(
            "[destination_root]",
            &self.absolute(&self.manifest.destination_root).to_string_lossy(),
        );

        if let Some(values) = values
            && !values.is_empty()
        {
            out = expand_config_tokens(&out, values)?;
        }

        Ok(out)
    }

    /// Expand `template`, normalize separators, and verify the canonical
    /// absolute result stays under the secure base.
    pub fn resolve(
        &self,
        template: &str,
        project: Option<&str>,
        values: Option<&ProjectValues>,
    ) -> Result<PathBuf> {
        let expanded = self.expand(template, project, values)?;
        let target = lexical_join(&self.ctx.root, fix_separators(&expanded));
        let base = self.secure_base()?;

        if !is_descendant(&target, &base) {
            return Err(Error::OutsideSecureBase { path: target, base });
        }

        debug!(template, resolved = %target.display(), "resolved path");
        Ok(target)
    }
}

/// Repeatedly expand `[_config:KEY]` tokens from the project values.
///
/// Values may themselves contain tokens, so expansion restarts from the
/// top until no token remains. An unknown KEY is fatal; a chain that
/// keeps producing tokens past [`MAX_CONFIG_TOKEN_DEPTH`] rounds is
/// reported as a cycle instead of looping forever.
pub(crate) fn expand_config_tokens(input: &str, values: &ProjectValues) -> Result<String> {
    let mut out = input.to_string();

    for _ in 0..MAX_CONFIG_TOKEN_DEPTH {
        let Some(start) = out.find(CONFIG_TOKEN_OPEN) else {
            return Ok(out);
        };
        let key_start = start + CONFIG_TOKEN_OPEN.len();
        let Some(rel_end) = out[key_start..].find(']') else {
            // Unterminated token, nothing more to expand.
            return Ok(out);
        };
        let key = &out[key_start..key_start + rel_end];

        let value = values.get(key).ok_or_else(|| Error::MissingConfigKey {
            key: key.to_string(),
        })?;
        debug!(key, value = %value, "replacing [_config:] token");
        out.replace_range(start..key_start + rel_end + 1, value);
    }

    Err(Error::ConfigTokenCycle {
        input: input.to_string(),
    })
}
