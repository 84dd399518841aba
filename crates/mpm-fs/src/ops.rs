//! Copy, link and remove operations for materializing checkouts
//!
//! Every operation here is idempotent under the delete-before-create
//! discipline the orchestrator follows: re-running a checkout on an
//! unchanged source tree reproduces the destination byte for byte.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{Error, Result};

/// Remove a file, directory tree or symlink. Absence is not an error.
///
/// Symlinks are removed themselves, never followed, so deleting a linked
/// destination cannot reach back into the template tree.
pub fn remove_any(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    debug!(path = %path.display(), "removing");
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        // Covers regular files and symlinks (including dir symlinks on unix).
        fs::remove_file(path)
    };
    result.map_err(|e| Error::io(path, e))
}

/// Create the parent directory chain for a destination path.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        debug!(dir = %parent.display(), "creating directory");
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

/// Recursively copy `src` to `dest`, dereferencing symlinks and
/// overwriting existing files.
pub fn copy_recursive(src: &Path, dest: &Path) -> Result<()> {
    // metadata() follows symlinks, which gives the dereferencing copy.
    let meta = match fs::metadata(src) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::SourceMissing { path: src.to_path_buf() });
        }
        Err(e) => return Err(Error::io(src, e)),
    };

    if meta.is_dir() {
        fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;
        for entry in fs::read_dir(src).map_err(|e| Error::io(src, e))? {
            let entry = entry.map_err(|e| Error::io(src, e))?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dest).map_err(|e| Error::io(dest, e))?;
    }
    Ok(())
}

/// Link `dest` to `src` using the platform's best available strategy.
///
/// On unix a symbolic link covers both files and directories. On windows
/// a directory symlink (junction semantics) is used for directories and a
/// hard link for files, since file symlinks require elevated privileges.
#[cfg(unix)]
pub fn link(src: &Path, dest: &Path) -> Result<()> {
    std::os::unix::fs::symlink(src, dest).map_err(|e| Error::io(dest, e))
}

/// Link `dest` to `src` using the platform's best available strategy.
#[cfg(windows)]
pub fn link(src: &Path, dest: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    if meta.is_dir() {
        std::os::windows::fs::symlink_dir(src, dest).map_err(|e| Error::io(dest, e))
    } else {
        fs::hard_link(src, dest).map_err(|e| Error::io(dest, e))
    }
}
