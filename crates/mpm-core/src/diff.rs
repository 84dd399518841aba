//! Line diff between generated destinations and their sources
//!
//! The diff is the safety gate in front of every non-forced checkout:
//! both sides are normalized with the placeholder replacements first, so
//! expected per-project substitutions disappear and only hand edits
//! surface. Whitespace-only line differences are ignored.

use std::collections::BTreeMap;

use similar::{DiffTag, TextDiff};
use tracing::warn;

use crate::error::Result;
use crate::manifest::Manifest;
use crate::resolver::PathResolver;

/// Whether a span was added to or removed from the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
}

/// One contiguous run of changed lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSpan {
    pub kind: ChangeKind,
    /// 1-based line in the source where the changed region begins. A
    /// replaced region anchors its removed and added spans at the same
    /// line.
    pub start_line: usize,
    /// The affected lines, newlines included.
    pub text: String,
}

/// Changed spans per mod file, keyed by the source template's basename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    files: BTreeMap<String, Vec<DiffSpan>>,
}

impl DiffReport {
    /// True iff no file has any changed span.
    pub fn is_empty(&self) -> bool {
        self.files.values().all(Vec::is_empty)
    }

    /// Iterate files and their spans in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<DiffSpan>)> {
        self.files.iter()
    }
}

/// Diff every mod file of `project` against its source.
///
/// Best-effort: a missing source or destination logs a warning and skips
/// that rule. Paths resolve without project values, since placeholder
/// normalization needs none.
pub fn diff_project(
    manifest: &Manifest,
    resolver: &PathResolver<'_>,
    project: &str,
) -> Result<DiffReport> {
    let mut report = DiffReport::default();

    for rule in &manifest.mod_files {
        let key = rule.source_key().to_string();
        let source = resolver.resolve(&rule.src, Some(project), None)?;
        let dest = resolver.resolve(&rule.dest, Some(project), None)?;

        if !source.exists() || !dest.exists() {
            warn!(src = %source.display(), dest = %dest.display(), "diff skipped, file not found");
            report.files.entry(key).or_default();
            continue;
        }

        let mut src_text = mpm_fs::io::read_text(&source)?;
        let mut dest_text = mpm_fs::io::read_text(&dest)?;

        // Equalize the two sides: expected substitutions collapse onto
        // the placeholder token on both, leaving only unexpected edits.
        if rule.has_rules() {
            for compiled in rule.placeholder_rules()? {
                src_text = compiled
                    .pattern
                    .replace(&src_text, compiled.replacement.as_str())
                    .into_owned();
                dest_text = compiled
                    .pattern
                    .replace(&dest_text, compiled.replacement.as_str())
                    .into_owned();
            }
        }

        report.files.insert(key, diff_lines(&src_text, &dest_text));
    }

    Ok(report)
}

/// Line-based diff of two texts, comparing trimmed lines but reporting
/// the original ones.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffSpan> {
    let old_lines: Vec<&str> = old.split_inclusive('\n').collect();
    let new_lines: Vec<&str> = new.split_inclusive('\n').collect();
    let old_trimmed: Vec<&str> = old_lines.iter().map(|l| l.trim()).collect();
    let new_trimmed: Vec<&str> = new_lines.iter().map(|l| l.trim()).collect();

    let diff = TextDiff::from_slices(&old_trimmed, &new_trimmed);
    let mut spans = Vec::new();

    for op in diff.ops() {
        let anchor = op.old_range().start + 1;
        match op.tag() {
            DiffTag::Equal => {}
            DiffTag::Delete => {
                spans.push(DiffSpan {
                    kind: ChangeKind::Removed,
                    start_line: anchor,
                    text: old_lines[op.old_range()].concat(),
                });
            }
            DiffTag::Insert => {
                spans.push(DiffSpan {
                    kind: ChangeKind::Added,
                    start_line: anchor,
                    text: new_lines[op.new_range()].concat(),
                });
            }
            DiffTag::Replace => {
                spans.push(DiffSpan {
                    kind: ChangeKind::Removed,
                    start_line: anchor,
                    text: old_lines[op.old_range()].concat(),
                });
                spans.push(DiffSpan {
                    kind: ChangeKind::Added,
                    start_line: anchor,
                    text: new_lines[op.new_range()].concat(),
                });
            }
        }
    }

    spans
}
