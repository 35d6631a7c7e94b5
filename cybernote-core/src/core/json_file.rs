//! Whole-file JSON array persistence shared by the note and record stores.
//!
//! Files are always read and written in full. Writes go to a temporary file in
//! the destination directory which is then renamed over the destination, so a
//! crash mid-write never leaves a truncated file behind. Every store that
//! mutates a file takes that file's gate from [`gate_for`] for the whole
//! load → mutate → write sequence.

use crate::{CyberNoteError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Serializes read-modify-write sequences on one file.
pub type FileGate = Arc<tokio::sync::Mutex<()>>;

static GATES: OnceLock<Mutex<HashMap<PathBuf, FileGate>>> = OnceLock::new();

/// Returns the process-wide gate for `path`.
///
/// Two stores bound to the same file share one gate; different files never
/// contend.
pub fn gate_for(path: &Path) -> FileGate {
    let key = gate_key(path);
    let mut gates = GATES
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    gates.entry(key).or_default().clone()
}

/// Resolves `..` and symlinks through the parent directory when it exists, so
/// different spellings of one file share a gate.
fn gate_key(path: &Path) -> PathBuf {
    let canonical = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => {
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
            fs::canonicalize(dir).ok().map(|dir| dir.join(name))
        }
        _ => None,
    };
    canonical.unwrap_or_else(|| std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
}

/// Reads `path` as a JSON array.
///
/// A missing or blank file is an empty array.
///
/// # Errors
///
/// Returns [`CyberNoteError::CorruptData`] if the content is not a JSON array,
/// or [`CyberNoteError::Io`] if the file exists but cannot be read.
pub fn read_array(path: &Path) -> Result<Vec<Value>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|source| CyberNoteError::CorruptData {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically replaces `path` with `values` as indented JSON.
///
/// # Errors
///
/// Returns [`CyberNoteError::PersistenceFailure`] if the temporary file cannot
/// be written or renamed; the destination keeps its previous content.
pub fn write_array_atomic(path: &Path, values: &[Value]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(values)?;
    write_bytes_atomic(path, &bytes, |_| Ok(()))?;
    log::debug!("wrote {} entries to {}", values.len(), path.display());
    Ok(())
}

/// Writes `bytes` to a temp file next to `path`, then renames it over `path`.
///
/// `before_replace` runs after the temp file is flushed and before the rename;
/// an error from it aborts the write like any other I/O failure.
pub(crate) fn write_bytes_atomic(
    path: &Path,
    bytes: &[u8],
    before_replace: impl FnOnce(&Path) -> io::Result<()>,
) -> Result<()> {
    let fail = |source: io::Error| CyberNoteError::PersistenceFailure {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(fail)?;

    // Dropping `tmp` on any early return deletes the temp file.
    let mut tmp = tempfile::Builder::new()
        .prefix(".cybernote-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.flush().map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    before_replace(tmp.path()).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

/// Runs blocking file work on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
