//! The note model: a closed set of note variants and their JSON contract.
//!
//! Every variant serializes to a flat object carrying `id`, the `Type`
//! discriminant, its own fields and `createDate`. Reading is deliberately
//! forgiving: [`NoteCard::from_json`] treats every field as optional and heals
//! missing or mistyped values with defaults, so hand-edited or partially
//! written files still load.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Title given to notes whose stored title is missing.
pub const UNTITLED: &str = "Untitled";

/// Title given to notes created interactively.
pub const NEW_NOTE_TITLE: &str = "New note";

/// Wire format for timestamps: ISO-8601 local date-time, fractional seconds only when present.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Discriminant of a note, stored as the `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Common,
    List,
    RichText,
}

impl NoteKind {
    pub const ALL: [NoteKind; 3] = [NoteKind::Common, NoteKind::List, NoteKind::RichText];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::List => "List",
            Self::RichText => "RichText",
        }
    }

    /// Looks up a kind by its exact wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A free-form text note with a schedule and a done flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonNote {
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Schedule", serialize_with = "serialize_timestamp")]
    pub schedule: NaiveDateTime,
    #[serde(rename = "createDate", serialize_with = "serialize_timestamp")]
    pub create_date: NaiveDateTime,
    #[serde(rename = "Progress")]
    pub progress: bool,
    #[serde(rename = "Priority")]
    pub priority: i32,
    #[serde(rename = "Content")]
    pub content: String,
}

impl CommonNote {
    /// Creates a note with a freshly generated id.
    pub fn new(title: impl Into<String>, schedule: NaiveDateTime, priority: i32, content: impl Into<String>) -> Self {
        Self::with_id(String::new(), title, schedule, priority, content)
    }

    /// Creates a note with an externally assigned id; an empty id is replaced by a fresh one.
    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        schedule: NaiveDateTime,
        priority: i32,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id_or_fresh(id.into()),
            title: title.into(),
            schedule,
            create_date: now(),
            progress: false,
            priority,
            content: content.into(),
        }
    }

    pub fn shift_progress(&mut self) {
        self.progress = !self.progress;
    }

    pub fn shift_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn update_schedule(&mut self, schedule: NaiveDateTime) {
        self.schedule = schedule;
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            id: read_id(obj),
            title: read_title(obj),
            schedule: read_timestamp(obj, "Schedule"),
            create_date: read_timestamp(obj, "createDate"),
            progress: read_bool(obj, "Progress"),
            priority: read_i32(obj, "Priority"),
            content: read_string(obj, "Content"),
        }
    }
}

/// One checklist entry of a [`ListNote`].
///
/// Tasks hold no reference to their list; list-level reactions to a task
/// changing go through [`ListNote::toggle_task`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskItem {
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Progress")]
    pub progress: bool,
}

impl TaskItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            progress: false,
        }
    }

    pub fn shift_progress(&mut self) {
        self.progress = !self.progress;
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            content: read_string(obj, "Content"),
            progress: read_bool(obj, "Progress"),
        }
    }
}

/// Summary of how far a checklist has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCompletion {
    /// The list has no tasks at all.
    Empty,
    AllDone,
    /// Number of tasks not yet done.
    Remaining(usize),
}

impl fmt::Display for ListCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("No tasks"),
            Self::AllDone => f.write_str("All done"),
            Self::Remaining(n) => write!(f, "{n} remaining"),
        }
    }
}

/// A checklist note. Task order is display order and is never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListNote {
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// Free text attached to the whole list, distinct from task text.
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "createDate", serialize_with = "serialize_timestamp")]
    pub create_date: NaiveDateTime,
    #[serde(rename = "Priority")]
    pub priority: i32,
    #[serde(rename = "Tasks")]
    tasks: Vec<TaskItem>,
}

impl ListNote {
    pub fn new(title: impl Into<String>, priority: i32, content: impl Into<String>, tasks: Vec<TaskItem>) -> Self {
        Self::with_id(String::new(), title, priority, content, tasks)
    }

    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        priority: i32,
        content: impl Into<String>,
        tasks: Vec<TaskItem>,
    ) -> Self {
        Self {
            id: id_or_fresh(id.into()),
            title: title.into(),
            content: content.into(),
            create_date: now(),
            priority,
            tasks,
        }
    }

    pub fn tasks(&self) -> &[TaskItem] {
        &self.tasks
    }

    pub fn task_mut(&mut self, index: usize) -> Option<&mut TaskItem> {
        self.tasks.get_mut(index)
    }

    /// Appends a task after all existing ones.
    pub fn add_task(&mut self, task: TaskItem) {
        self.tasks.push(task);
    }

    /// Inserts a task at `index`, shifting later tasks down. Returns false if `index` is past the end.
    pub fn insert_task(&mut self, index: usize, task: TaskItem) -> bool {
        if index > self.tasks.len() {
            return false;
        }
        self.tasks.insert(index, task);
        true
    }

    /// Removes the task at `index`, keeping the order of the rest.
    pub fn remove_task(&mut self, index: usize) -> Option<TaskItem> {
        (index < self.tasks.len()).then(|| self.tasks.remove(index))
    }

    /// Toggles the task at `index`.
    ///
    /// Returns `None` for an out-of-range index, otherwise whether this toggle
    /// just completed the whole list.
    pub fn toggle_task(&mut self, index: usize) -> Option<bool> {
        let task = self.tasks.get_mut(index)?;
        task.shift_progress();
        let finished_task = task.progress;
        Some(finished_task && self.completion() == ListCompletion::AllDone)
    }

    pub fn completion(&self) -> ListCompletion {
        if self.tasks.is_empty() {
            return ListCompletion::Empty;
        }
        match self.tasks.iter().filter(|t| !t.progress).count() {
            0 => ListCompletion::AllDone,
            n => ListCompletion::Remaining(n),
        }
    }

    pub fn shift_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        let tasks = match obj.get("Tasks") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .map(TaskItem::from_object)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            id: read_id(obj),
            title: read_title(obj),
            content: read_string(obj, "Content"),
            create_date: read_timestamp(obj, "createDate"),
            priority: read_i32(obj, "Priority"),
            tasks,
        }
    }
}

/// A rich-text note. `content` is an opaque serialized document the store never interprets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichTextNote {
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Schedule", serialize_with = "serialize_timestamp")]
    pub schedule: NaiveDateTime,
    #[serde(rename = "createDate", serialize_with = "serialize_timestamp")]
    pub create_date: NaiveDateTime,
    #[serde(rename = "Progress")]
    pub progress: bool,
    #[serde(rename = "Priority")]
    pub priority: i32,
    #[serde(rename = "Content")]
    pub content: String,
}

impl RichTextNote {
    pub fn new(title: impl Into<String>, schedule: NaiveDateTime, priority: i32, content: impl Into<String>) -> Self {
        Self::with_id(String::new(), title, schedule, priority, content)
    }

    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        schedule: NaiveDateTime,
        priority: i32,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id_or_fresh(id.into()),
            title: title.into(),
            schedule,
            create_date: now(),
            progress: false,
            priority,
            content: content.into(),
        }
    }

    pub fn shift_progress(&mut self) {
        self.progress = !self.progress;
    }

    pub fn shift_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn update_schedule(&mut self, schedule: NaiveDateTime) {
        self.schedule = schedule;
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            id: read_id(obj),
            title: read_title(obj),
            schedule: read_timestamp(obj, "Schedule"),
            create_date: read_timestamp(obj, "createDate"),
            progress: read_bool(obj, "Progress"),
            priority: read_i32(obj, "Priority"),
            content: read_string(obj, "Content"),
        }
    }
}

/// A note of any kind.
///
/// Serializes internally tagged, so the `Type` field sits next to the
/// variant's own fields in one flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Type")]
pub enum NoteCard {
    Common(CommonNote),
    List(ListNote),
    RichText(RichTextNote),
}

impl NoteCard {
    /// Builds the note a user gets from "new note": placeholder text, scheduled and created now.
    pub fn new_default(kind: NoteKind) -> Self {
        let now = now();
        match kind {
            NoteKind::Common => Self::Common(CommonNote::new(
                NEW_NOTE_TITLE,
                now,
                0,
                "Click to edit...",
            )),
            NoteKind::List => Self::List(ListNote::new(NEW_NOTE_TITLE, 0, "", vec![TaskItem::new("First task")])),
            NoteKind::RichText => Self::RichText(RichTextNote::new(NEW_NOTE_TITLE, now, 0, "")),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Common(n) => &n.id,
            Self::List(n) => &n.id,
            Self::RichText(n) => &n.id,
        }
    }

    pub fn kind(&self) -> NoteKind {
        match self {
            Self::Common(_) => NoteKind::Common,
            Self::List(_) => NoteKind::List,
            Self::RichText(_) => NoteKind::RichText,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Common(n) => &n.title,
            Self::List(n) => &n.title,
            Self::RichText(n) => &n.title,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        match self {
            Self::Common(n) => n.title = title,
            Self::List(n) => n.title = title,
            Self::RichText(n) => n.title = title,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Common(n) => &n.content,
            Self::List(n) => &n.content,
            Self::RichText(n) => &n.content,
        }
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        match self {
            Self::Common(n) => n.update_content(content),
            Self::List(n) => n.update_content(content),
            Self::RichText(n) => n.update_content(content),
        }
    }

    pub fn create_date(&self) -> NaiveDateTime {
        match self {
            Self::Common(n) => n.create_date,
            Self::List(n) => n.create_date,
            Self::RichText(n) => n.create_date,
        }
    }

    pub fn priority(&self) -> i32 {
        match self {
            Self::Common(n) => n.priority,
            Self::List(n) => n.priority,
            Self::RichText(n) => n.priority,
        }
    }

    pub fn shift_priority(&mut self, priority: i32) {
        match self {
            Self::Common(n) => n.shift_priority(priority),
            Self::List(n) => n.shift_priority(priority),
            Self::RichText(n) => n.shift_priority(priority),
        }
    }

    /// The schedule, for the kinds that carry one.
    pub fn schedule(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Common(n) => Some(n.schedule),
            Self::List(_) => None,
            Self::RichText(n) => Some(n.schedule),
        }
    }

    /// Serializes the note to its flat JSON object.
    pub fn to_json(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Reads a note from one element of the note file.
    ///
    /// Returns `None` when the element is not an object or its `Type` is
    /// missing or unknown; everything else is healed with defaults. A row
    /// without an `id` gets one derived from its content, which is only
    /// persisted if the note is saved again.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = obj.get("Type").and_then(Value::as_str).and_then(NoteKind::from_name)?;
        let note = match kind {
            NoteKind::Common => Self::Common(CommonNote::from_object(obj)),
            NoteKind::List => Self::List(ListNote::from_object(obj)),
            NoteKind::RichText => Self::RichText(RichTextNote::from_object(obj)),
        };
        Some(note)
    }
}

/// Current local wall-clock time, the reference for `createDate`.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Formats a timestamp the way it is written to the note file.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 (converted to local time), bare ISO-8601 date-times with
/// `T` or space separator, and plain dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

fn id_or_fresh(id: String) -> String {
    if id.trim().is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id
    }
}

// Lenient field readers: a missing or mistyped field yields the default.

fn read_id(obj: &Map<String, Value>) -> String {
    match stored_id(obj) {
        Some(id) => id.to_string(),
        None => {
            log::warn!("note row without id, deriving one from its content");
            derived_id(obj)
        }
    }
}

fn stored_id(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
}

/// Id of a legacy row that has none. The same row always yields the same id,
/// so the store can still find the row to replace or remove it.
fn derived_id(obj: &Map<String, Value>) -> String {
    // Map keys are sorted, so the encoding is canonical.
    let canonical = serde_json::to_vec(obj).unwrap_or_default();
    Uuid::new_v5(&Uuid::NAMESPACE_OID, &canonical).to_string()
}

/// The id a raw note-file row is known by: its stored `id`, or the derived
/// one for legacy rows without it. `None` for rows that are not objects.
pub(crate) fn row_note_id(row: &Value) -> Option<String> {
    let obj = row.as_object()?;
    Some(stored_id(obj).map_or_else(|| derived_id(obj), str::to_string))
}

fn read_title(obj: &Map<String, Value>) -> String {
    obj.get("Title")
        .and_then(Value::as_str)
        .unwrap_or(UNTITLED)
        .to_string()
}

fn read_string(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn read_bool(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn read_i32(obj: &Map<String, Value>, key: &str) -> i32 {
    obj.get(key)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(0)
}

fn read_timestamp(obj: &Map<String, Value>, key: &str) -> NaiveDateTime {
    obj.get(key)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_common_note_round_trip() {
        let mut note = CommonNote::new("Buy milk", at(2025, 3, 1, 9, 30), 2, "two litres\nsemi-skimmed");
        note.shift_progress();
        let card = NoteCard::Common(note);

        let back = NoteCard::from_json(&card.to_json().unwrap()).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn test_list_note_round_trip_keeps_task_order() {
        let mut done = TaskItem::new("second");
        done.shift_progress();
        let list = ListNote::new("Groceries", 1, "for sunday", vec![TaskItem::new("first"), done, TaskItem::new("third")]);
        let card = NoteCard::List(list);

        let back = NoteCard::from_json(&card.to_json().unwrap()).unwrap();
        assert_eq!(back, card);
        let NoteCard::List(back) = back else { panic!("Wrong variant") };
        let texts: Vec<_> = back.tasks().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert!(back.tasks()[1].progress);
    }

    #[test]
    fn test_rich_text_content_is_opaque() {
        let rtf = r"{\rtf1\ansi{\fonttbl\f0 Arial;}\f0\pard Hello \b world\b0\par}";
        let card = NoteCard::RichText(RichTextNote::new("Doc", at(2025, 1, 2, 3, 4), 0, rtf));

        let back = NoteCard::from_json(&card.to_json().unwrap()).unwrap();
        assert_eq!(back.content(), rtf);
        assert_eq!(back, card);
    }

    #[test]
    fn test_wire_field_names() {
        let note = CommonNote::with_id("abc", "Buy milk", at(2025, 3, 1, 9, 30), 2, "");
        let json = NoteCard::Common(note).to_json().unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["Type"], "Common");
        assert_eq!(json["Title"], "Buy milk");
        assert_eq!(json["Schedule"], "2025-03-01T09:30:00");
        assert_eq!(json["Priority"], 2);
        assert_eq!(json["Progress"], false);
        assert!(json.get("createDate").is_some());

        let list = NoteCard::List(ListNote::new("L", 0, "", vec![TaskItem::new("t")]));
        let json = list.to_json().unwrap();
        assert_eq!(json["Type"], "List");
        assert_eq!(json["Tasks"][0]["Content"], "t");
        assert_eq!(json["Tasks"][0]["Progress"], false);
        assert!(json.get("Schedule").is_none());
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let note = NoteCard::from_json(&json!({ "Type": "Common" })).unwrap();
        let NoteCard::Common(note) = note else { panic!("Wrong variant") };
        assert!(!note.id.is_empty());
        assert_eq!(note.title, UNTITLED);
        assert_eq!(note.content, "");
        assert!(!note.progress);
        assert_eq!(note.priority, 0);
        assert_eq!(note.schedule, NaiveDateTime::default());
        assert_eq!(note.create_date, NaiveDateTime::default());

        let list = NoteCard::from_json(&json!({ "Type": "List" })).unwrap();
        let NoteCard::List(list) = list else { panic!("Wrong variant") };
        assert_eq!(list.title, UNTITLED);
        assert_eq!(list.content, "");
        assert!(list.tasks().is_empty());
        assert_eq!(list.priority, 0);
        assert_eq!(list.create_date, NaiveDateTime::default());

        let rich = NoteCard::from_json(&json!({ "Type": "RichText", "id": "r1" })).unwrap();
        let NoteCard::RichText(rich) = rich else { panic!("Wrong variant") };
        assert_eq!(rich.id, "r1");
        assert_eq!(rich.title, UNTITLED);
        assert_eq!(rich.content, "");
        assert!(!rich.progress);
        assert_eq!(rich.priority, 0);
        assert_eq!(rich.schedule, NaiveDateTime::default());
        assert_eq!(rich.create_date, NaiveDateTime::default());
    }

    #[test]
    fn test_row_without_id_gets_a_stable_derived_id() {
        let row = json!({ "Type": "Common", "Title": "legacy" });
        let first = NoteCard::from_json(&row).unwrap();
        let second = NoteCard::from_json(&row).unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(row_note_id(&row).as_deref(), Some(first.id()));

        let other = json!({ "Type": "Common", "Title": "another" });
        assert_ne!(row_note_id(&other), row_note_id(&row));
        assert_eq!(row_note_id(&json!({ "id": "a1" })).as_deref(), Some("a1"));
        assert_eq!(row_note_id(&json!([1])), None);
    }

    #[test]
    fn test_mistyped_fields_are_healed() {
        let value = json!({
            "id": "x",
            "Type": "Common",
            "Title": 42,
            "Priority": "high",
            "Progress": "yes",
            "Schedule": "not a date",
            "Content": null,
            "Extra": { "ignored": true }
        });
        let NoteCard::Common(note) = NoteCard::from_json(&value).unwrap() else { panic!("Wrong variant") };
        assert_eq!(note.title, UNTITLED);
        assert_eq!(note.priority, 0);
        assert!(!note.progress);
        assert_eq!(note.schedule, NaiveDateTime::default());
        assert_eq!(note.content, "");
    }

    #[test]
    fn test_malformed_tasks_are_skipped() {
        let value = json!({
            "Type": "List",
            "Tasks": [ { "Content": "keep" }, "junk", 3, { "Progress": true } ]
        });
        let NoteCard::List(list) = NoteCard::from_json(&value).unwrap() else { panic!("Wrong variant") };
        assert_eq!(list.tasks().len(), 2);
        assert_eq!(list.tasks()[0], TaskItem::new("keep"));
        assert!(list.tasks()[1].progress);
        assert_eq!(list.tasks()[1].content, "");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(NoteCard::from_json(&json!({ "Type": "Drawing", "id": "d" })).is_none());
        assert!(NoteCard::from_json(&json!({ "id": "no-type" })).is_none());
        assert!(NoteCard::from_json(&json!("Common")).is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2025-03-01T09:30:00"), Some(at(2025, 3, 1, 9, 30)));
        assert_eq!(parse_timestamp("2025-03-01 09:30:00"), Some(at(2025, 3, 1, 9, 30)));
        assert_eq!(parse_timestamp("2025-03-01"), Some(at(2025, 3, 1, 0, 0)));
        let fractional = parse_timestamp("2025-03-01T09:30:00.1234567").unwrap();
        assert_eq!(fractional.and_utc().timestamp_subsec_nanos(), 123_456_700);
        assert!(parse_timestamp("2025-03-01T09:30:00+08:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_constructors_assign_ids() {
        let a = CommonNote::new("a", now(), 0, "");
        let b = CommonNote::new("b", now(), 0, "");
        assert_ne!(a.id, b.id);
        assert_eq!(CommonNote::with_id("given", "c", now(), 0, "").id, "given");
        assert!(!RichTextNote::with_id("  ", "r", now(), 0, "").id.trim().is_empty());
    }

    #[test]
    fn test_setters() {
        let mut note = CommonNote::new("a", at(2025, 1, 1, 0, 0), 0, "old");
        let created = note.create_date;
        note.shift_progress();
        note.shift_priority(5);
        note.update_content("new");
        note.update_schedule(at(2025, 6, 1, 12, 0));
        assert!(note.progress);
        assert_eq!(note.priority, 5);
        assert_eq!(note.content, "new");
        assert_eq!(note.schedule, at(2025, 6, 1, 12, 0));
        assert_eq!(note.create_date, created);
        note.shift_progress();
        assert!(!note.progress);
    }

    #[test]
    fn test_list_task_mutation_keeps_order() {
        let mut list = ListNote::new("L", 0, "", vec![TaskItem::new("a"), TaskItem::new("c")]);
        assert!(list.insert_task(1, TaskItem::new("b")));
        assert!(!list.insert_task(9, TaskItem::new("z")));
        list.add_task(TaskItem::new("d"));
        assert_eq!(list.remove_task(0).map(|t| t.content), Some("a".to_string()));
        assert!(list.remove_task(10).is_none());
        let texts: Vec<_> = list.tasks().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(texts, ["b", "c", "d"]);
    }

    #[test]
    fn test_toggle_task_reports_list_completion() {
        let mut list = ListNote::new("L", 0, "", vec![TaskItem::new("a"), TaskItem::new("b")]);
        assert_eq!(list.completion(), ListCompletion::Remaining(2));
        assert_eq!(list.toggle_task(0), Some(false));
        assert_eq!(list.toggle_task(1), Some(true));
        assert_eq!(list.completion(), ListCompletion::AllDone);
        assert_eq!(list.toggle_task(1), Some(false));
        assert_eq!(list.toggle_task(7), None);

        let empty = ListNote::new("E", 0, "", vec![]);
        assert_eq!(empty.completion(), ListCompletion::Empty);
        assert_eq!(ListCompletion::Remaining(3).to_string(), "3 remaining");
    }

    #[test]
    fn test_new_default_per_kind() {
        for kind in NoteKind::ALL {
            let note = NoteCard::new_default(kind);
            assert_eq!(note.kind(), kind);
            assert_eq!(note.title(), NEW_NOTE_TITLE);
            assert!(!note.id().is_empty());
            assert_ne!(note.create_date(), NaiveDateTime::default());
        }
    }
}
