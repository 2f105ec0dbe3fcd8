//! JSON Lines export of repository snapshots
//!
//! One JSON object per line, oldest event first / modes in display order.
//! File exports go through [`atomic_write_with`] so a partially written file
//! is never observed.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::events::EventRecordStore;
use crate::modes::ModeRegistry;
use crate::types::{EventRecord, ModeRecord};
use crate::utils::atomic::{atomic_write_with, AtomicError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Atomic(#[from] AtomicError),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Which repository an export reads
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    Events(&'a EventRecordStore),
    Modes(&'a ModeRegistry),
}

/// Write `records` as JSON Lines. Returns the number of lines written.
pub fn write_events_jsonl<W, R>(out: &mut W, records: &[R]) -> ExportResult<usize>
where
    W: Write + ?Sized,
    R: AsRef<EventRecord>,
{
    for record in records {
        serde_json::to_writer(&mut *out, record.as_ref())?;
        out.write_all(b"\n")?;
    }
    Ok(records.len())
}

/// Write `modes` as JSON Lines. Returns the number of lines written.
pub fn write_modes_jsonl<W>(out: &mut W, modes: &[ModeRecord]) -> ExportResult<usize>
where
    W: Write + ?Sized,
{
    for mode in modes {
        serde_json::to_writer(&mut *out, mode)?;
        out.write_all(b"\n")?;
    }
    Ok(modes.len())
}

/// Snapshot `source` and atomically write it to `path` as JSON Lines
pub fn export_to_file(source: ExportSource<'_>, path: impl AsRef<Path>) -> ExportResult<usize> {
    let path = path.as_ref();
    let (kind, written) = match source {
        ExportSource::Events(store) => {
            let records: Vec<Arc<EventRecord>> = store.to_vec();
            ("events", write_atomically(path, |out| write_events_jsonl(out, &records))?)
        }
        ExportSource::Modes(registry) => {
            let modes = registry.to_vec();
            ("modes", write_atomically(path, |out| write_modes_jsonl(out, &modes))?)
        }
    };
    info!(kind, written, path = %path.display(), "exported snapshot");
    Ok(written)
}

fn write_atomically<F>(path: &Path, write: F) -> ExportResult<usize>
where
    F: FnOnce(&mut dyn Write) -> ExportResult<usize>,
{
    let mut written = 0;
    atomic_write_with(path, |out| {
        written = write(out).map_err(|e| match e {
            ExportError::Io(io) => io,
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        })?;
        Ok(())
    })?;
    Ok(written)
}
