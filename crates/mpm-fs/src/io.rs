//! Atomic text I/O with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Read a file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename so a crash mid-write never leaves a
/// truncated destination, and holds an advisory lock on the temp file
/// while writing. The parent directory must already exist.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed { path: path.to_path_buf() })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .unlock()
        .map_err(|_| Error::LockFailed { path: path.to_path_buf() })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
}

/// Write UTF-8 text atomically, fully replacing any existing file.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
