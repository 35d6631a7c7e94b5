//! Internal domain modules for the CyberNote core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod config;
pub mod error;
pub mod json_file;
pub mod note;
pub mod note_store;
pub mod notebook;
pub mod query;
pub mod record;
pub mod record_store;

#[doc(inline)]
pub use config::{config_file_path, AppConfig};
#[doc(inline)]
pub use error::{CyberNoteError, Result};
#[doc(inline)]
pub use note::{CommonNote, ListCompletion, ListNote, NoteCard, NoteKind, RichTextNote, TaskItem};
#[doc(inline)]
pub use note_store::{load_notes, NoteStore};
#[doc(inline)]
pub use notebook::{Notebook, WriteQueue};
#[doc(inline)]
pub use query::{content_preview, filter_and_sort, NoteFilter, SortOrder};
#[doc(inline)]
pub use record::{CalendarDay, Mood, Record};
#[doc(inline)]
pub use record_store::{load_records, RecordStore};
