//! Atomic file writes for exports
//!
//! # Pattern
//!
//! 1. Write to a temporary file (.tmp)
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! A reader of the export path sees either the previous export or the new
//! one, never a partial file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

/// Result type for atomic operations
pub type AtomicResult<T> = Result<T, AtomicError>;

/// Errors that can occur during atomic operations
#[derive(Debug, Error)]
pub enum AtomicError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Export path has no file name: {0}")]
    InvalidPath(String),
}

/// Atomically write content using a writer function
///
/// The writer is buffered; the buffer is flushed and the file synced before
/// the rename.
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> AtomicResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let path = path.as_ref();
    if path.file_name().is_none() {
        return Err(AtomicError::InvalidPath(path.display().to_string()));
    }
    let temp_path = path.with_extension("tmp");

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);
    if let Err(e) = write_fn(&mut writer) {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    // Atomic rename
    fs::rename(&temp_path, path)?;

    Ok(())
}
