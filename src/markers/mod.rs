//! Built-in map markers with a note/date annotation and a history log.

mod book;
mod builtin;
mod systems;

pub use book::{HistoryEntry, HistoryKind, MarkerBook, MarkerRecord, NoteError};
pub use builtin::{BUILTIN_MARKERS, builtin_marker};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::drawing::DrawingPaint;
use crate::map::MapInput;
use crate::storage::{FileStore, SharedStore, StorageOpened};

/// The application's marker book
#[derive(Resource, Deref, DerefMut)]
pub struct Markers(MarkerBook<SharedStore<FileStore>>);

/// Editing state of the note popup.
#[derive(Resource, Debug, Default)]
pub struct MarkerPopupState {
    /// Marker whose popup is open
    pub open: Option<u32>,
    pub note: String,
    pub date: String,
    /// Draft differs from what was loaded into the popup
    pub edited: bool,
    pub confirm_delete: bool,
    pub confirm_discard: bool,
    /// Validation error from the last save attempt
    pub error: Option<String>,
}

impl MarkerPopupState {
    /// Load `record` into the popup. An empty date starts at today.
    pub fn open_for(&mut self, record: &MarkerRecord) {
        *self = Self {
            open: Some(record.id),
            note: record.note.clone(),
            date: if record.date.is_empty() {
                local_date()
            } else {
                record.date.clone()
            },
            ..Default::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Save is offered only with a non-blank note and a date.
    pub fn can_save(&self) -> bool {
        !self.note.trim().is_empty() && !self.date.trim().is_empty()
    }

    pub fn is_modal_open(&self) -> bool {
        self.confirm_delete || self.confirm_discard
    }
}

/// Which history entry is shown in the review window (index into the log).
#[derive(Resource, Debug, Default)]
pub struct HistoryReview {
    pub entry: Option<usize>,
}

/// Timestamp recorded on history entries
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn local_date() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub struct MarkersPlugin;

impl Plugin for MarkersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MarkerPopupState>()
            .init_resource::<HistoryReview>()
            .add_systems(Startup, systems::init_markers.after(StorageOpened))
            .add_systems(Update, systems::pick_marker.after(MapInput))
            .add_systems(
                EguiPrimaryContextPass,
                (systems::paint_markers, systems::saved_labels_ui)
                    .chain()
                    .after(DrawingPaint),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(note: &str, date: &str) -> MarkerRecord {
        MarkerRecord {
            id: 3,
            note: note.to_string(),
            date: date.to_string(),
            saved: !note.is_empty(),
            image: String::new(),
        }
    }

    #[test]
    fn test_popup_loads_record() {
        let mut popup = MarkerPopupState::default();
        popup.open_for(&record("hello", "2024-01-02"));
        assert_eq!(popup.open, Some(3));
        assert_eq!(popup.note, "hello");
        assert_eq!(popup.date, "2024-01-02");
        assert!(!popup.edited);
        assert!(popup.can_save());
    }

    #[test]
    fn test_popup_defaults_date_to_today() {
        let mut popup = MarkerPopupState::default();
        popup.open_for(&record("", ""));
        assert_eq!(popup.date.len(), 10);
        assert!(!popup.can_save());
    }

    #[test]
    fn test_popup_close_resets() {
        let mut popup = MarkerPopupState::default();
        popup.open_for(&record("x", "2024-01-02"));
        popup.confirm_delete = true;
        popup.close();
        assert!(popup.open.is_none());
        assert!(!popup.is_modal_open());
    }
}
