//! Lexical path handling for cross-platform containment checks
//!
//! Checkout destinations usually do not exist yet, so `fs::canonicalize`
//! cannot be used for boundary checks. Paths are resolved lexically
//! instead: `.` and `..` segments collapse without touching the
//! filesystem, which is exactly what the secure-base containment test
//! needs.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` segments of an absolute path without consulting
/// the filesystem.
///
/// A `..` at the root is dropped rather than kept, so the result never
/// climbs above the root component.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or drive prefix.
                if !out.pop() {
                    continue;
                }
                if out.as_os_str().is_empty() {
                    out.push(Component::RootDir.as_os_str());
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }
    out
}

/// Join `rel` onto `base` and lexically normalize the result.
///
/// An absolute `rel` replaces `base` entirely, matching `Path::join`.
pub fn lexical_join(base: &Path, rel: impl AsRef<Path>) -> PathBuf {
    lexical_normalize(&base.join(rel.as_ref()))
}

/// Check whether `path` is `base` or a descendant of it.
///
/// Both arguments must already be lexically normalized absolute paths.
pub fn is_descendant(path: &Path, base: &Path) -> bool {
    path.starts_with(base)
}

/// Convert the forward slashes of a template path to the host separator.
pub fn fix_separators(s: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        s.to_string()
    } else {
        s.replace('/', std::path::MAIN_SEPARATOR_STR)
    }
}
