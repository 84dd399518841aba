//! Project config values: flat JSON maps merged common-then-project
//!
//! Each project carries a JSON file of string values used by mod-file
//! replacements and `[_config:]` tokens. An optional shared JSON file
//! supplies defaults; project values win on key collisions.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::resolver::PathResolver;

/// Flat string-to-string project configuration.
pub type ProjectValues = HashMap<String, String>;

/// Validate a project name against `^[A-Za-z0-9_-]+$`.
pub fn is_valid_project_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Load the merged project values for `project`.
///
/// The common config is best-effort: an absent or unreadable file logs a
/// warning and contributes nothing. The project config is required and
/// must be valid JSON. Both locations resolve with the project name only,
/// so no values are needed to find the values.
pub fn load_values(
    manifest: &Manifest,
    resolver: &PathResolver<'_>,
    project: &str,
) -> Result<ProjectValues> {
    let mut merged = ProjectValues::new();

    if let Some(template) = manifest.common_config_file.as_deref()
        && !template.is_empty()
    {
        let path = resolver.resolve(template, Some(project), None)?;
        match mpm_fs::io::read_text(&path) {
            Ok(text) => {
                merged = parse_values(&path, &text)?;
                debug!(path = %path.display(), keys = merged.len(), "loaded common config");
            }
            Err(_) => {
                warn!(path = %path.display(), "cannot open common config, skipping");
            }
        }
    }

    let path = resolver.resolve(&manifest.project_config_file, Some(project), None)?;
    let text = mpm_fs::io::read_text(&path)?;
    let project_values = parse_values(&path, &text)?;
    debug!(path = %path.display(), keys = project_values.len(), "loaded project config");

    // Project values override common values.
    merged.extend(project_values);
    Ok(merged)
}

fn parse_values(path: &Path, text: &str) -> Result<ProjectValues> {
    serde_json::from_str(text).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        format: "JSON".into(),
        message: e.to_string(),
    })
}
