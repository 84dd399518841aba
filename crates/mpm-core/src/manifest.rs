//! Manifest parsing for mpm.toml
//!
//! The manifest is the static description of a multi-project setup: the
//! roots, the simple link/copy rules, the mod-file patch rules, the
//! delete list and the hook commands. It is loaded once per invocation
//! and immutable afterwards; CLI `-o KEY VALUE` overrides are merged on
//! top of the scalar fields before anything touches the filesystem.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::project::ProjectValues;
use crate::resolver::expand_config_tokens;

/// File name of the manifest, looked up in the working directory.
pub const MANIFEST_FILE: &str = "mpm.toml";

/// How a simple file rule materializes its destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Symlink (or junction/hard link where symlinks are unavailable).
    #[default]
    Link,
    /// Recursive dereferencing copy.
    Copy,
}

/// A plain link-or-copy rule, applied in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleFileRule {
    /// Source path template.
    pub src: String,
    /// Destination path template.
    pub dest: String,
    /// Materialization strategy; linking is the default.
    #[serde(default)]
    pub kind: LinkKind,
}

/// One ordered find/replace rule of a mod file.
///
/// `pattern` is a regex expected to match only the intended region.
/// `generate` may use `$N`/`${N}` backreferences plus `[_config:KEY]`
/// tokens that expand to project config values; `placeholder` uses the
/// same backreferences with a literal placeholder token instead, so the
/// common copy stays environment-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub pattern: String,
    pub generate: String,
    pub placeholder: String,
}

/// A file materialized through regex substitution instead of a copy/link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModFileRule {
    /// Source path template (under the common root).
    pub src: String,
    /// Destination path template.
    pub dest: String,
    /// Ordered replace rules; empty means "plain overwrite copy".
    #[serde(default)]
    pub rules: Vec<ReplaceRule>,
}

/// A replace rule with its pattern compiled and its replacement template
/// fully expanded for one direction.
#[derive(Debug)]
pub struct CompiledRule {
    pub pattern: Regex,
    pub replacement: String,
}

impl ModFileRule {
    /// Whether this rule patches content at all.
    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Compile the generate-direction rules, expanding `[_config:KEY]`
    /// tokens in each replacement from the project values.
    pub fn rules_for(&self, values: &ProjectValues) -> Result<Vec<CompiledRule>> {
        self.rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    pattern: compile_pattern(&rule.pattern)?,
                    replacement: expand_config_tokens(&rule.generate, values)?,
                })
            })
            .collect()
    }

    /// Compile the placeholder-direction rules. Placeholder replacements
    /// are literal, so no project values are needed.
    pub fn placeholder_rules(&self) -> Result<Vec<CompiledRule>> {
        self.rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    pattern: compile_pattern(&rule.pattern)?,
                    replacement: rule.placeholder.clone(),
                })
            })
            .collect()
    }

    /// Basename of the source template, used to key diff reports.
    pub fn source_key(&self) -> &str {
        self.src.rsplit('/').next().unwrap_or(&self.src)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::BadPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Static configuration parsed from `mpm.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Containment root; no resolved path may leave this subtree.
    pub secure_base_path: String,
    /// Where per-project directories live, relative to the working root.
    pub project_root: String,
    /// Where the shared template files live.
    pub common_root: String,
    /// Target root the project files are materialized into.
    pub destination_root: String,
    /// Path template of the per-project JSON config.
    pub project_config_file: String,
    /// Path template the project config is linked/copied to at checkout.
    pub project_config_destination: String,
    /// Optional path template of the shared JSON config.
    #[serde(default)]
    pub common_config_file: Option<String>,
    /// Ordered link/copy rules.
    #[serde(default, rename = "simple")]
    pub simple_files: Vec<SimpleFileRule>,
    /// Ordered mod-file rules.
    #[serde(default, rename = "modfile")]
    pub mod_files: Vec<ModFileRule>,
    /// Paths removed at the start of every checkout.
    #[serde(default, rename = "delete")]
    pub delete_list: Vec<String>,
    /// Shell command templates run before materialization.
    #[serde(default)]
    pub execute_before: Vec<String>,
    /// Shell command templates run after materialization.
    #[serde(default)]
    pub execute_after: Vec<String>,
}

impl Manifest {
    /// Parse a manifest from TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Load the manifest from `path`, failing with a hint towards
    /// `mpm init` when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = mpm_fs::io::read_text(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            format: "TOML".into(),
            message: e.to_string(),
        })
    }

    /// Shallow-merge CLI overrides onto the scalar string fields.
    ///
    /// Unknown keys are logged and skipped; list-valued settings cannot
    /// be overridden from the command line.
    pub fn apply_overrides(&mut self, overrides: &[(String, String)]) {
        for (key, value) in overrides {
            match key.as_str() {
                "secure_base_path" => self.secure_base_path = value.clone(),
                "project_root" => self.project_root = value.clone(),
                "common_root" => self.common_root = value.clone(),
                "destination_root" => self.destination_root = value.clone(),
                "project_config_file" => self.project_config_file = value.clone(),
                "project_config_destination" => {
                    self.project_config_destination = value.clone();
                }
                "common_config_file" => self.common_config_file = Some(value.clone()),
                _ => warn!(key = %key, "unknown override key, ignoring"),
            }
        }
    }
}
