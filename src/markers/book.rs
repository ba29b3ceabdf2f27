//! Marker notes and the history log.
//!
//! At most one marker carries a note at a time: saving a note on one marker
//! clears every other marker. Every save and delete is appended to the history
//! log. Both lists are written to storage after each change, under separate keys.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{KeyValueStore, StorageError};

use super::builtin::BUILTIN_MARKERS;

/// Note state of one built-in marker, in its persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: u32,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub image: String,
}

impl MarkerRecord {
    fn blank(id: u32, image: &str) -> Self {
        Self {
            id,
            note: String::new(),
            date: String::new(),
            saved: false,
            image: image.to_string(),
        }
    }

    fn clear(&mut self) {
        self.note.clear();
        self.date.clear();
        self.saved = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Save,
    Delete,
}

impl HistoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryKind::Save => "SAVE",
            HistoryKind::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    #[serde(rename = "markerId")]
    pub marker_id: u32,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub date: String,
    /// Local timestamp of the change, for display only
    #[serde(default)]
    pub when: String,
}

/// Why a note was not saved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    #[error("note is empty")]
    EmptyNote,

    #[error("date is missing")]
    MissingDate,

    #[error("date must look like YYYY-MM-DD")]
    InvalidDate,

    #[error("no marker with id {0}")]
    UnknownMarker(u32),
}

/// Marker records plus history, bound to a store.
pub struct MarkerBook<S> {
    records: Vec<MarkerRecord>,
    history: Vec<HistoryEntry>,
    storage: S,
    markers_key: String,
    history_key: String,
    persist_error: Option<String>,
}

impl<S: KeyValueStore> MarkerBook<S> {
    /// Restore records and history from storage, falling back to blank markers.
    pub fn load(storage: S, markers_key: impl Into<String>, history_key: impl Into<String>) -> Self {
        let markers_key = markers_key.into();
        let history_key = history_key.into();
        let restored: Vec<MarkerRecord> = decode_list(storage.get(&markers_key), "marker");
        let history: Vec<HistoryEntry> = decode_list(storage.get(&history_key), "history");

        let records: Vec<MarkerRecord> = BUILTIN_MARKERS
            .iter()
            .enumerate()
            .map(|(index, builtin)| {
                let id = index as u32 + 1;
                let mut record = MarkerRecord::blank(id, builtin.image);
                if let Some(stored) = restored.iter().find(|r| r.id == id) {
                    record.note = stored.note.clone();
                    record.date = stored.date.clone();
                    record.saved = stored.saved;
                    if !stored.image.is_empty() {
                        record.image = stored.image.clone();
                    }
                }
                record
            })
            .collect();

        let saved = records.iter().filter(|r| r.saved).count();
        info!(
            "Restored {} marker record(s) ({} saved) and {} history entries",
            restored.len(),
            saved,
            history.len()
        );

        Self {
            records,
            history,
            storage,
            markers_key,
            history_key,
            persist_error: None,
        }
    }

    pub fn records(&self) -> &[MarkerRecord] {
        &self.records
    }

    pub fn record(&self, id: u32) -> Option<&MarkerRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// History in the order changes happened (oldest first).
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn dismiss_persist_error(&mut self) {
        self.persist_error = None;
    }

    /// Attach a note to marker `id`, clearing every other marker.
    pub fn save_note(&mut self, id: u32, note: &str, date: &str, when: &str) -> Result<(), NoteError> {
        let note = note.trim();
        let date = date.trim();
        if note.is_empty() {
            return Err(NoteError::EmptyNote);
        }
        if date.is_empty() {
            return Err(NoteError::MissingDate);
        }
        if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(NoteError::InvalidDate);
        }
        if self.record(id).is_none() {
            return Err(NoteError::UnknownMarker(id));
        }

        for record in &mut self.records {
            if record.id == id {
                record.note = note.to_string();
                record.date = date.to_string();
                record.saved = true;
            } else {
                record.clear();
            }
        }
        self.history.push(HistoryEntry {
            kind: HistoryKind::Save,
            marker_id: id,
            note: note.to_string(),
            date: date.to_string(),
            when: when.to_string(),
        });
        info!("Saved note on marker {}", id);
        self.persist();
        Ok(())
    }

    /// Clear marker `id`. Returns false for unknown ids.
    pub fn delete_note(&mut self, id: u32, when: &str) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        record.clear();
        self.history.push(HistoryEntry {
            kind: HistoryKind::Delete,
            marker_id: id,
            note: String::new(),
            date: String::new(),
            when: when.to_string(),
        });
        info!("Deleted note on marker {}", id);
        self.persist();
        true
    }

    /// Clear every marker and the whole history log.
    pub fn reset_all(&mut self) {
        for record in &mut self.records {
            record.clear();
        }
        self.history.clear();
        info!("Reset all marker data and history");
        self.persist();
    }

    fn write(&mut self) -> Result<(), StorageError> {
        let records = serde_json::to_string(&self.records)?;
        let history = serde_json::to_string(&self.history)?;
        self.storage.set(&self.markers_key, &records)?;
        self.storage.set(&self.history_key, &history)
    }

    fn persist(&mut self) {
        match self.write() {
            Ok(()) => self.persist_error = None,
            Err(e) => {
                warn!("Failed to save marker notes, keeping them in memory: {}", e);
                self.persist_error = Some(e.to_string());
            }
        }
    }
}

/// Decode a stored JSON array element by element; anything unusable is skipped.
fn decode_list<T: serde::de::DeserializeOwned>(raw: Option<String>, what: &str) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let items = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) => {
            warn!("Discarding stored {} data, expected an array", what);
            return Vec::new();
        }
        Err(e) => {
            warn!("Discarding stored {} data, not valid JSON: {}", what, e);
            return Vec::new();
        }
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if decoded.len() < total {
        warn!("Skipped {} malformed {} entries", total - decoded.len(), what);
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const MARKERS: &str = "markers";
    const HISTORY: &str = "history";
    const WHEN: &str = "2024-05-01 10:00:00";

    fn book(store: MemoryStore) -> MarkerBook<MemoryStore> {
        MarkerBook::load(store, MARKERS, HISTORY)
    }

    #[test]
    fn test_fresh_book_has_blank_builtin_markers() {
        let book = book(MemoryStore::new());
        assert_eq!(book.records().len(), 13);
        assert!(book.records().iter().all(|r| !r.saved && r.note.is_empty()));
        assert_eq!(book.record(1).unwrap().image, "https://picsum.photos/id/1015/800/560");
        assert!(book.history().is_empty());
    }

    #[test]
    fn test_save_note_clears_other_markers() {
        let mut book = book(MemoryStore::new());
        book.save_note(2, "first", "2024-01-01", WHEN).unwrap();
        book.save_note(5, "  second  ", "2024-02-02", WHEN).unwrap();

        let saved: Vec<u32> = book.records().iter().filter(|r| r.saved).map(|r| r.id).collect();
        assert_eq!(saved, vec![5]);
        assert_eq!(book.record(5).unwrap().note, "second");
        assert!(book.record(2).unwrap().note.is_empty());

        let kinds: Vec<HistoryKind> = book.history().iter().map(|h| h.kind).collect();
        assert_eq!(kinds, vec![HistoryKind::Save, HistoryKind::Save]);
        assert_eq!(book.history()[1].marker_id, 5);
    }

    #[test]
    fn test_save_note_validation() {
        let mut book = book(MemoryStore::new());
        assert_eq!(book.save_note(1, "   ", "2024-01-01", WHEN), Err(NoteError::EmptyNote));
        assert_eq!(book.save_note(1, "note", "", WHEN), Err(NoteError::MissingDate));
        assert_eq!(book.save_note(1, "note", "01/02/2024", WHEN), Err(NoteError::InvalidDate));
        assert_eq!(
            book.save_note(99, "note", "2024-01-01", WHEN),
            Err(NoteError::UnknownMarker(99))
        );
        assert!(book.history().is_empty());
    }

    #[test]
    fn test_delete_note() {
        let mut book = book(MemoryStore::new());
        book.save_note(3, "note", "2024-01-01", WHEN).unwrap();
        assert!(book.delete_note(3, WHEN));
        assert!(!book.record(3).unwrap().saved);
        assert_eq!(book.history().last().unwrap().kind, HistoryKind::Delete);

        assert!(!book.delete_note(42, WHEN));
        assert_eq!(book.history().len(), 2);
    }

    #[test]
    fn test_reset_all() {
        let mut book = book(MemoryStore::new());
        book.save_note(3, "note", "2024-01-01", WHEN).unwrap();
        book.reset_all();
        assert!(book.records().iter().all(|r| !r.saved));
        assert!(book.history().is_empty());
    }

    #[test]
    fn test_state_survives_reload() {
        let mut book = book(MemoryStore::new());
        book.save_note(4, "kept", "2024-03-03", WHEN).unwrap();
        let store = book.storage.clone();

        let reloaded = MarkerBook::load(store, MARKERS, HISTORY);
        let record = reloaded.record(4).unwrap();
        assert!(record.saved);
        assert_eq!(record.note, "kept");
        assert_eq!(reloaded.history().len(), 1);
    }

    #[test]
    fn test_history_uses_camel_case_field_names() {
        let mut book = book(MemoryStore::new());
        book.save_note(1, "n", "2024-01-01", WHEN).unwrap();
        let raw = book.storage.get(HISTORY).unwrap();
        assert!(raw.contains(r#""type":"save""#));
        assert!(raw.contains(r#""markerId":1"#));
    }

    #[test]
    fn test_tolerant_restore() {
        let mut store = MemoryStore::new();
        store.insert_raw(
            MARKERS,
            r#"[{"id":2,"note":"hi","date":"2024-01-01","saved":true,"image":""},
                {"id":77,"note":"ghost","saved":true},
                "junk",
                {"id":3,"image":"https://example.com/a.jpg"}]"#,
        );
        store.insert_raw(HISTORY, r#"{"not":"an array"}"#);

        let book = book(store);
        assert!(book.record(2).unwrap().saved);
        // Empty stored image keeps the built-in one
        assert_eq!(book.record(2).unwrap().image, "https://picsum.photos/id/1016/800/560");
        assert_eq!(book.record(3).unwrap().image, "https://example.com/a.jpg");
        assert!(book.record(77).is_none());
        assert!(book.history().is_empty());
    }

    #[test]
    fn test_corrupt_storage_gives_defaults() {
        let mut store = MemoryStore::new();
        store.insert_raw(MARKERS, "{{{");
        store.insert_raw(HISTORY, "nope");
        let book = book(store);
        assert_eq!(book.records().len(), 13);
        assert!(book.history().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_notes_in_memory() {
        let mut book = book(MemoryStore::with_quota(16));
        book.save_note(1, "note", "2024-01-01", WHEN).unwrap();
        assert!(book.record(1).unwrap().saved);
        assert!(book.persist_error().is_some());
        book.dismiss_persist_error();
        assert!(book.persist_error().is_none());
    }
}
