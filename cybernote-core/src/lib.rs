//! Core library for CyberNote, a desktop sticky-notes application with a daily mood log.
//!
//! Notes live in one JSON file and daily records in another. The entry point is
//! [`Notebook`], which opens both files from an [`AppConfig`]; [`NoteStore`] and
//! [`RecordStore`] can also be used on their own. Every write replaces the whole
//! file atomically, and writes to the same file are serialized.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    config::{config_file_path, AppConfig},
    error::{CyberNoteError, Result},
    note::{CommonNote, ListCompletion, ListNote, NoteCard, NoteKind, RichTextNote, TaskItem},
    note_store::{load_notes, NoteStore},
    notebook::{Notebook, WriteQueue},
    query::{content_preview, filter_and_sort, NoteFilter, SortOrder},
    record::{CalendarDay, Mood, Record},
    record_store::{load_records, RecordStore},
};
