//! Error types for mpm-core

use std::path::PathBuf;

/// Result type for mpm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mpm-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A resolved path escaped the secure base path
    #[error("Path {path:?} is outside of the scope of secure path {base:?}")]
    OutsideSecureBase { path: PathBuf, base: PathBuf },

    /// The secure base path normalizes to the filesystem root
    #[error("secure_base_path cannot be the filesystem root (resolved from {path:?})")]
    SecureBaseIsRoot { path: PathBuf },

    /// A `[_config:KEY]` token referenced a key the project config lacks
    #[error("Config value not found for [_config:{key}]")]
    MissingConfigKey { key: String },

    /// Chained `[_config:]` tokens never stopped producing new tokens
    #[error("Unresolvable [_config:] token chain while expanding {input:?}")]
    ConfigTokenCycle { input: String },

    /// No manifest file at the expected location
    #[error("Manifest not found at {path} - run `mpm init` to create one")]
    ManifestNotFound { path: PathBuf },

    /// Failed to parse a configuration file
    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// A replace rule's regex failed to compile
    #[error("Invalid replace pattern {pattern:?}: {message}")]
    BadPattern { pattern: String, message: String },

    /// The named project has no directory under the project root
    #[error("Project {name:?} does not exist")]
    ProjectMissing { name: String },

    /// `new` was asked to create a project that is already there
    #[error("Project {name:?} already exists")]
    ProjectExists { name: String },

    /// A before/after hook command exited with a non-zero status
    #[error("Command failed with exit code {code:?}: {command}")]
    HookFailed {
        command: String,
        code: Option<i32>,
    },

    /// Filesystem error from mpm-fs
    #[error(transparent)]
    Fs(#[from] mpm_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
