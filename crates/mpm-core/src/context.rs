//! Per-run context: working root and environment modifier
//!
//! Built once before any filesystem work and read-only afterwards, so no
//! ambient mutable state leaks into path resolution.

use std::path::PathBuf;

use tracing::warn;

/// Immutable context for a single command invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Working directory everything relative in the manifest hangs off.
    /// Fixed at startup and never changed mid-run.
    pub root: PathBuf,
    /// `[env]` modifier string, substituted into every template.
    pub env: String,
}

impl RunContext {
    /// Create a context rooted at `root` with an optional env modifier.
    pub fn new(root: impl Into<PathBuf>, env: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            env: env.into(),
        }
    }
}

/// Turn the flat `-o KEY VALUE KEY VALUE ...` argument list into pairs.
///
/// A trailing unpaired key is dropped with a warning rather than treated
/// as an error.
pub fn pair_overrides(flat: &[String]) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut chunks = flat.chunks_exact(2);
    for chunk in &mut chunks {
        pairs.push((chunk[0].clone(), chunk[1].clone()));
    }
    if let [stray] = chunks.remainder() {
        warn!(key = %stray, "override key has no value, ignoring");
    }
    pairs
}
