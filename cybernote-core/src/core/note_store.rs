//! The document store: the only gateway between notes in memory and the note file.
//!
//! Writes work on the raw JSON rows rather than on parsed [`NoteCard`]s, so rows
//! of note kinds this version does not know, and fields it does not read,
//! survive every rewrite unchanged.

use crate::core::json_file::{self, FileGate};
use crate::core::note::row_note_id;
use crate::{CyberNoteError, NoteCard, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reads every note in the file at `path`.
///
/// A missing file yields an empty collection. Rows whose `Type` is unknown are
/// skipped.
///
/// # Errors
///
/// Returns [`CyberNoteError::CorruptData`] if the file is not a JSON array; the
/// file itself is left alone so the user can recover it.
pub fn load_notes(path: &Path) -> Result<Vec<NoteCard>> {
    let rows = json_file::read_array(path)?;
    let total = rows.len();
    let notes: Vec<NoteCard> = rows.iter().filter_map(NoteCard::from_json).collect();
    if notes.len() < total {
        log::warn!(
            "skipped {} unrecognised rows in {}",
            total - notes.len(),
            path.display()
        );
    }
    Ok(notes)
}

/// Note file bound to its process-wide write gate.
///
/// Cloning is cheap; clones share the gate.
#[derive(Debug, Clone)]
pub struct NoteStore {
    path: PathBuf,
    gate: FileGate,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let gate = json_file::gate_for(&path);
        Self { path, gate }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole collection. See [`load_notes`].
    pub async fn load_all(&self) -> Result<Vec<NoteCard>> {
        let path = self.path.clone();
        json_file::run_blocking(move || load_notes(&path)).await
    }

    /// Adds `note` at the end of the file unless a note with its id is already there.
    ///
    /// Returns `false` when the id was present; a repeated append is a benign
    /// retry, not an error.
    ///
    /// # Errors
    ///
    /// [`CyberNoteError::InvalidArgument`] for an empty id,
    /// [`CyberNoteError::CorruptData`] if the current file cannot be parsed, and
    /// [`CyberNoteError::PersistenceFailure`] if the write fails.
    pub async fn append(&self, note: &NoteCard) -> Result<bool> {
        let id = require_id(note.id())?;
        let row = note.to_json()?;
        self.mutate(move |rows| {
            if rows.iter().any(|r| row_note_id(r).as_deref() == Some(id.as_str())) {
                log::debug!("note {id} already stored, append ignored");
                return false;
            }
            rows.push(row);
            true
        })
        .await
    }

    /// Inserts or replaces `note` by id. The stored row moves to the end of the file.
    ///
    /// # Errors
    ///
    /// Same as [`NoteStore::append`].
    pub async fn save(&self, note: &NoteCard) -> Result<()> {
        let id = require_id(note.id())?;
        let row = note.to_json()?;
        self.mutate(move |rows| {
            rows.retain(|r| row_note_id(r).as_deref() != Some(id.as_str()));
            rows.push(row);
            true
        })
        .await?;
        Ok(())
    }

    /// Removes every row carrying `id`. Returns whether anything was removed;
    /// the file is only rewritten in that case.
    ///
    /// # Errors
    ///
    /// [`CyberNoteError::InvalidArgument`] for an empty id, otherwise as
    /// [`NoteStore::append`].
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = require_id(id)?;
        self.mutate(move |rows| {
            let before = rows.len();
            rows.retain(|r| row_note_id(r).as_deref() != Some(id.as_str()));
            before != rows.len()
        })
        .await
    }

    /// Runs load → `apply` → write under the gate. `apply` returns whether the
    /// rows changed and need writing.
    async fn mutate<F>(&self, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<Value>) -> bool + Send + 'static,
    {
        // The guard moves into the blocking job so the file stays locked until
        // the write finishes even if this future is dropped.
        let guard = self.gate.clone().lock_owned().await;
        let path = self.path.clone();
        json_file::run_blocking(move || {
            let _guard = guard;
            let mut rows = json_file::read_array(&path)?;
            let changed = apply(&mut rows);
            if changed {
                json_file::write_array_atomic(&path, &rows)?;
            }
            Ok(changed)
        })
        .await
    }
}

fn require_id(id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(CyberNoteError::InvalidArgument(
            "note id must not be empty".to_string(),
        ));
    }
    Ok(id.to_string())
}
