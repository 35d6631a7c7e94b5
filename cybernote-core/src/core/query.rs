//! Browsing helpers for the thumbnail list: filtering, searching, sorting and
//! short content previews.

use crate::{NoteCard, NoteKind};

/// Shown instead of a preview for rich-text notes, whose content is not plain text.
pub const RICH_TEXT_PREVIEW: &str = "Preview not available";

/// Lines of content shown in a thumbnail preview.
const PREVIEW_LINES: usize = 2;

/// Display order of the thumbnail list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    CreatedDesc,
    CreatedAsc,
}

impl SortOrder {
    /// The other direction, for a sort toggle button.
    pub fn toggled(self) -> Self {
        match self {
            Self::CreatedDesc => Self::CreatedAsc,
            Self::CreatedAsc => Self::CreatedDesc,
        }
    }
}

/// Which notes the thumbnail list shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Only notes of this kind; `None` shows every kind.
    pub kind: Option<NoteKind>,
    /// Case-insensitive text matched against title and content preview. Blank matches everything.
    pub search: String,
}

impl NoteFilter {
    pub fn matches(&self, note: &NoteCard) -> bool {
        if self.kind.is_some_and(|k| k != note.kind()) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        note.title().to_lowercase().contains(&needle)
            || content_preview(note).to_lowercase().contains(&needle)
    }
}

/// Notes passing `filter`, ordered by creation date.
///
/// The sort is stable, so notes created at the same instant keep their file order.
pub fn filter_and_sort<'a>(notes: &'a [NoteCard], filter: &NoteFilter, order: SortOrder) -> Vec<&'a NoteCard> {
    let mut shown: Vec<&NoteCard> = notes.iter().filter(|n| filter.matches(n)).collect();
    match order {
        SortOrder::CreatedAsc => shown.sort_by_key(|n| n.create_date()),
        SortOrder::CreatedDesc => shown.sort_by(|a, b| b.create_date().cmp(&a.create_date())),
    }
    shown
}

/// The first two non-blank lines of a note's content, with `...` when more follow.
pub fn content_preview(note: &NoteCard) -> String {
    if note.kind() == NoteKind::RichText {
        return RICH_TEXT_PREVIEW.to_string();
    }
    let mut lines = note.content().lines().filter(|l| !l.trim().is_empty());
    let shown: Vec<&str> = lines.by_ref().take(PREVIEW_LINES).collect();
    let mut preview = shown.join("\n");
    if lines.next().is_some() {
        preview.push_str("...");
    }
    preview
}
