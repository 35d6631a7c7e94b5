//! The record store: the one-record-per-date mood log.
//!
//! Records are lower stakes than notes, so a corrupt record file never blocks
//! anything: it reads as empty and the next write starts it over.

use crate::core::json_file::{self, FileGate};
use crate::core::record::{card_count_field, row_date};
use crate::{CalendarDay, CyberNoteError, Record, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Reads every record in the file at `path`; missing or corrupt files read as empty.
pub fn load_records(path: &Path) -> Vec<Record> {
    read_rows(path)
        .map(|rows| rows.iter().filter_map(Record::from_json).collect())
        .unwrap_or_else(|e| {
            log::warn!("could not read records from {}: {e}", path.display());
            Vec::new()
        })
}

/// Rows of the record file, with a corrupt file treated as empty.
fn read_rows(path: &Path) -> Result<Vec<Value>> {
    match json_file::read_array(path) {
        Err(CyberNoteError::CorruptData { source, .. }) => {
            log::warn!("record file {} is corrupt, starting over: {source}", path.display());
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Record file bound to its process-wide write gate.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    gate: FileGate,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let gate = json_file::gate_for(&path);
        Self { path, gate }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load_all(&self) -> Vec<Record> {
        let path = self.path.clone();
        json_file::run_blocking(move || Ok(load_records(&path)))
            .await
            .unwrap_or_default()
    }

    /// Stores `record`, replacing whatever was recorded for its date.
    pub async fn save(&self, record: &Record) -> Result<()> {
        let date = record.date;
        let row = record.to_json()?;
        self.mutate(move |rows| {
            rows.retain(|r| row_date(r) != Some(date));
            rows.push(row);
            (true, ())
        })
        .await
    }

    /// Makes sure today has a record. See [`RecordStore::ensure_date`].
    pub async fn ensure_today(&self) -> Result<bool> {
        self.ensure_date(today()).await
    }

    /// Inserts a zero-count placeholder for `date` if it has no record yet.
    ///
    /// Returns whether a placeholder was added; calling it again is a no-op.
    pub async fn ensure_date(&self, date: NaiveDate) -> Result<bool> {
        let placeholder = Record::placeholder(date).to_json()?;
        self.mutate(move |rows| {
            if rows.iter().any(|r| row_date(r) == Some(date)) {
                return (false, false);
            }
            rows.push(placeholder);
            (true, true)
        })
        .await
    }

    /// Counts one more note created today. See [`RecordStore::increment_count_on`].
    pub async fn increment_today_count(&self) -> Result<u32> {
        self.increment_count_on(today()).await
    }

    /// Adds one to the card count of `date`, creating its placeholder first if
    /// needed. Returns the new count.
    pub async fn increment_count_on(&self, date: NaiveDate) -> Result<u32> {
        let mut first = Record::placeholder(date);
        first.card_count = 1;
        let first = first.to_json()?;
        self.mutate(move |rows| {
            let existing = rows
                .iter_mut()
                .rev()
                .find(|r| row_date(r) == Some(date))
                .and_then(Value::as_object_mut);
            match existing {
                Some(obj) => {
                    let count = card_count_field(obj.get("CardCount")).saturating_add(1);
                    obj.insert("CardCount".to_string(), Value::from(count));
                    (true, count)
                }
                None => {
                    rows.push(first);
                    (true, 1)
                }
            }
        })
        .await
    }

    /// Every day of `month` in `year`, each with its record if there is one.
    ///
    /// # Errors
    ///
    /// [`CyberNoteError::InvalidArgument`] if `year`/`month` is not a valid month.
    pub async fn month(&self, year: i32, month: u32) -> Result<Vec<CalendarDay>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CyberNoteError::InvalidArgument(format!("no such month: {year}-{month}"))
        })?;
        let records = self.load_all().await;
        Ok(first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|date| CalendarDay {
                date,
                record: records.iter().rev().find(|r| r.date == date).cloned(),
            })
            .collect())
    }

    async fn mutate<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Value>) -> (bool, T) + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.gate.clone().lock_owned().await;
        let path = self.path.clone();
        json_file::run_blocking(move || {
            let _guard = guard;
            let mut rows = read_rows(&path)?;
            let (changed, out) = apply(&mut rows);
            if changed {
                collapse_duplicate_dates(&mut rows);
                json_file::write_array_atomic(&path, &rows)?;
            }
            Ok(out)
        })
        .await
    }
}

/// Keeps only the last row of each date, the one readers show. Rows without a
/// readable date are left alone.
fn collapse_duplicate_dates(rows: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    let mut kept: Vec<Value> = rows
        .drain(..)
        .rev()
        .filter(|r| row_date(r).map_or(true, |d| seen.insert(d)))
        .collect();
    kept.reverse();
    *rows = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mood;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_in(dir: &TempDir) -> RecordStore {
        RecordStore::new(dir.path().join("records.json"))
    }

    #[tokio::test]
    async fn test_missing_and_corrupt_files_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load_all().await.is_empty());

        fs::write(store.path(), "not json at all").unwrap();
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_same_date_replaces_whole_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = Record::new(day(2025, 5, 1), Mood::Happy, 3, "sunny");
        let second = Record::new(day(2025, 5, 1), Mood::Tired, 0, "");

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(store.load_all().await, vec![second]);
    }

    #[tokio::test]
    async fn test_save_different_dates_keeps_both() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let a = Record::new(day(2025, 5, 1), Mood::Happy, 1, "a");
        let b = Record::new(day(2025, 5, 2), Mood::Sad, 2, "b");

        store.save(&a).await.unwrap();
        store.save(&b).await.unwrap();

        assert_eq!(store.load_all().await, vec![a, b]);
    }

    #[tokio::test]
    async fn test_ensure_date_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let date = day(2025, 6, 10);

        assert!(store.ensure_date(date).await.unwrap());
        assert!(!store.ensure_date(date).await.unwrap());

        assert_eq!(store.load_all().await, vec![Record::placeholder(date)]);
    }

    #[tokio::test]
    async fn test_ensure_today_creates_todays_placeholder() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_today().await.unwrap();

        let records = store.load_all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mood, Mood::Unknown);
        assert_eq!(records[0].card_count, 0);
    }

    #[tokio::test]
    async fn test_increment_creates_then_counts() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let date = day(2025, 6, 11);

        assert_eq!(store.increment_count_on(date).await.unwrap(), 1);
        assert_eq!(store.increment_count_on(date).await.unwrap(), 2);

        let records = store.load_all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].card_count, 2);
        assert_eq!(records[0].mood, Mood::Unknown);
    }

    #[tokio::test]
    async fn test_increment_keeps_mood_and_comment() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let date = day(2025, 6, 12);
        store.save(&Record::new(date, Mood::Busy, 5, "deadline")).await.unwrap();

        assert_eq!(store.increment_count_on(date).await.unwrap(), 6);

        assert_eq!(store.load_all().await, vec![Record::new(date, Mood::Busy, 6, "deadline")]);
    }

    #[tokio::test]
    async fn test_increment_starts_over_on_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "[{").unwrap();

        assert_eq!(store.increment_count_on(day(2025, 1, 1)).await.unwrap(), 1);
        assert_eq!(store.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_dates_collapse_to_the_shown_row() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let rows = serde_json::json!([
            { "Date": "2025-01-01", "Mood": "Sad", "CardCount": 1 },
            { "Date": "2025-01-02", "Mood": "Calm", "CardCount": 3 },
            { "Date": "2025-01-01", "Mood": "Happy", "CardCount": 5 }
        ]);
        fs::write(store.path(), rows.to_string()).unwrap();

        assert_eq!(store.increment_count_on(day(2025, 1, 1)).await.unwrap(), 6);

        let days = store.month(2025, 1).await.unwrap();
        assert_eq!(days[0].card_count(), 6);
        assert_eq!(days[0].mood(), Mood::Happy);
        assert_eq!(days[1].card_count(), 3);

        let records = store.load_all().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records.iter().filter(|r| r.date == day(2025, 1, 1)).count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_all_counted() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));
        let date = day(2025, 7, 4);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment_count_on(date).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = store.load_all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].card_count, 20);
    }

    #[tokio::test]
    async fn test_month_lists_every_day() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&Record::new(day(2024, 2, 29), Mood::Excited, 7, "leap")).await.unwrap();
        store.save(&Record::new(day(2024, 3, 1), Mood::Calm, 1, "")).await.unwrap();

        let days = store.month(2024, 2).await.unwrap();
        assert_eq!(days.len(), 29);
        assert_eq!(days[0].date, day(2024, 2, 1));
        assert_eq!(days[28].card_count(), 7);
        assert_eq!(days[28].mood(), Mood::Excited);
        assert!(days[..28].iter().all(|d| d.record.is_none()));

        assert!(matches!(store.month(2024, 13).await, Err(CyberNoteError::InvalidArgument(_))));
    }
}
