//! Core checkout pipeline for mpm
//!
//! mpm materializes per-project working trees out of a shared template
//! codebase: simple files are linked or copied, "mod files" are patched
//! through ordered regex rules, and a line diff gates destructive
//! overwrites so hand edits are never silently lost.

pub mod checkout;
pub mod context;
pub mod diff;
pub mod error;
pub mod hooks;
pub mod manifest;
pub mod modfile;
pub mod project;
pub mod resolver;

pub use checkout::{CheckoutOptions, CheckoutOutcome};
pub use context::RunContext;
pub use diff::{ChangeKind, DiffReport, DiffSpan};
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use modfile::Direction;
pub use project::ProjectValues;
pub use resolver::PathResolver;
