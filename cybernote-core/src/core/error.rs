//! Error types for the CyberNote core library.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur within the CyberNote core library.
///
/// A missing data file and a duplicate id on append are not errors: the stores
/// absorb them as an empty collection and a no-op respectively.
#[derive(Debug, Error)]
pub enum CyberNoteError {
    /// The note file exists but is not a valid JSON array.
    #[error("Corrupt data file {path}: {source}")]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the temporary file or replacing the destination failed.
    ///
    /// The destination file still holds its previous content.
    #[error("Failed to persist {path}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A caller passed an empty id or otherwise unusable argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading a data file failed for a reason other than it being absent.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tracked background write panicked or was cancelled.
    #[error("Background write failed: {0}")]
    Task(String),
}

/// Convenience alias that pins the error type to [`CyberNoteError`].
pub type Result<T> = std::result::Result<T, CyberNoteError>;

impl CyberNoteError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CorruptData { path, .. } => format!(
                "The note file {} could not be read. Please choose another data file.",
                path.display()
            ),
            Self::PersistenceFailure { source, .. } => format!("Failed to save: {source}"),
            Self::InvalidArgument(msg) => msg.clone(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::Task(e) => format!("Failed to save: {e}"),
        }
    }

    /// True when the caller should offer to pick a replacement data file.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }
}

impl From<tokio::task::JoinError> for CyberNoteError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
