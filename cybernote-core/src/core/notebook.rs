//! The notebook: both stores behind one handle, plus tracked background writes.
//!
//! UI code that does not want to wait for a save hands it to
//! [`Notebook::spawn_save`]. Every such write is kept in a [`WriteQueue`] and
//! its outcome is reported by [`Notebook::flush`], so a failed save is logged
//! and surfaced instead of lost.

use crate::core::record_store;
use crate::{AppConfig, CalendarDay, CyberNoteError, NoteCard, NoteKind, NoteStore, Record, RecordStore, Result};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinSet;

/// Background writes that must finish before the process exits.
///
/// Writes run one after another in the order they were queued, so a later save
/// of the same note always wins. Dropping the queue aborts writes that have not
/// started yet; call [`WriteQueue::flush`] first.
#[derive(Debug, Default)]
pub struct WriteQueue {
    inner: Mutex<QueueState>,
}

#[derive(Debug, Default)]
struct QueueState {
    tasks: JoinSet<Result<()>>,
    /// Completion signal of the most recently queued write.
    tail: Option<oneshot::Receiver<()>>,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `write` behind every write already queued.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, label: impl Into<String>, write: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let label = label.into();
        let (done, next_tail) = oneshot::channel();
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = state.tail.replace(next_tail);
        state.tasks.spawn(async move {
            if let Some(previous) = previous {
                // A failed or panicked predecessor drops its sender; keep going.
                let _ = previous.await;
            }
            let result = write.await;
            if let Err(e) = &result {
                log::error!("background write '{label}' failed: {e}");
            }
            let _ = done.send(());
            result
        });
    }

    /// Number of writes queued and not yet collected by [`WriteQueue::flush`].
    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tasks
            .len()
    }

    /// Waits for every queued write.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the writes, or
    /// [`CyberNoteError::Task`] if one panicked. The remaining writes are still
    /// awaited.
    pub async fn flush(&self) -> Result<()> {
        let mut tasks = {
            let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut state.tasks)
        };
        let mut first_error: Option<CyberNoteError> = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| {
                log::error!("background write did not complete: {e}");
                CyberNoteError::from(e)
            });
            if let Err(e) = outcome.and_then(|r| r) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Note and record files of one user, opened together.
#[derive(Debug)]
pub struct Notebook {
    notes: NoteStore,
    records: RecordStore,
    queue: WriteQueue,
}

impl Notebook {
    /// Opens the files named by `config`, creating them and their defaults on first run.
    pub fn open(config: &mut AppConfig) -> Result<Self> {
        let note_path = config.note_data_path()?;
        let record_path = config.record_data_path()?;
        Ok(Self::new(note_path, record_path))
    }

    pub fn new(note_path: impl Into<PathBuf>, record_path: impl Into<PathBuf>) -> Self {
        Self {
            notes: NoteStore::new(note_path),
            records: RecordStore::new(record_path),
            queue: WriteQueue::new(),
        }
    }

    pub fn note_store(&self) -> &NoteStore {
        &self.notes
    }

    pub fn record_store(&self) -> &RecordStore {
        &self.records
    }

    /// Creates a default note of `kind`, stores it and counts it towards today.
    pub async fn create_note(&self, kind: NoteKind) -> Result<NoteCard> {
        let note = NoteCard::new_default(kind);
        self.notes.append(&note).await?;
        let count = self.records.increment_today_count().await?;
        log::debug!("created {kind} note {}, {count} today", note.id());
        Ok(note)
    }

    pub async fn load_notes(&self) -> Result<Vec<NoteCard>> {
        self.notes.load_all().await
    }

    pub async fn save_note(&self, note: &NoteCard) -> Result<()> {
        self.notes.save(note).await
    }

    pub async fn delete_note(&self, id: &str) -> Result<bool> {
        self.notes.delete(id).await
    }

    /// Saves `note` in the background. The outcome is reported by [`Notebook::flush`].
    pub fn spawn_save(&self, note: NoteCard) {
        let store = self.notes.clone();
        let label = format!("save note {}", note.id());
        self.queue.spawn(label, async move { store.save(&note).await });
    }

    /// Deletes the note `id` in the background.
    pub fn spawn_delete(&self, id: impl Into<String>) {
        let store = self.notes.clone();
        let id = id.into();
        let label = format!("delete note {id}");
        self.queue.spawn(label, async move { store.delete(&id).await.map(|_| ()) });
    }

    pub async fn records(&self) -> Vec<Record> {
        self.records.load_all().await
    }

    pub async fn save_record(&self, record: &Record) -> Result<()> {
        self.records.save(record).await
    }

    /// Makes sure today has a record; returns whether one was created.
    pub async fn start_day(&self) -> Result<bool> {
        let created = self.records.ensure_today().await?;
        if created {
            log::debug!("started record for {}", record_store::today());
        }
        Ok(created)
    }

    pub async fn month(&self, year: i32, month: u32) -> Result<Vec<CalendarDay>> {
        self.records.month(year, month).await
    }

    /// Waits for every background write. See [`WriteQueue::flush`].
    pub async fn flush(&self) -> Result<()> {
        self.queue.flush().await
    }

    pub fn pending_writes(&self) -> usize {
        self.queue.pending()
    }

    /// Flushes outstanding writes and closes the notebook.
    pub async fn shutdown(self) -> Result<()> {
        self.flush().await
    }
}
