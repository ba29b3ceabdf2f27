use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::map::MapView;
use crate::markers::{HistoryEntry, HistoryReview, MarkerPopupState, Markers, builtin_marker};
use crate::theme;

#[derive(Resource, Default)]
pub struct HistoryPanelState {
    pub confirm_reset: bool,
}

/// Preview text for a history row
fn summary(entry: &HistoryEntry) -> String {
    if entry.note.is_empty() {
        return "(no note)".to_string();
    }
    let mut preview: String = entry.note.chars().take(40).collect();
    if entry.note.chars().count() > 40 {
        preview.push_str("...");
    }
    preview
}

/// Marker history, newest first. Selecting an entry centers its marker.
pub fn history_panel_ui(
    mut contexts: EguiContexts,
    markers: Res<Markers>,
    mut review: ResMut<HistoryReview>,
    mut state: ResMut<HistoryPanelState>,
    mut view: ResMut<MapView>,
) -> Result {
    egui::SidePanel::right("history_panel")
        .default_width(260.0)
        .resizable(true)
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.heading("History");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .button(egui::RichText::new("Reset history").color(theme::ERROR_TEXT))
                        .clicked()
                    {
                        state.confirm_reset = true;
                    }
                });
            });
            ui.separator();

            let history = markers.history();
            if history.is_empty() {
                ui.label(egui::RichText::new("No history yet.").color(theme::MUTED_TEXT));
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for (index, entry) in history.iter().enumerate().rev() {
                    let selected = review.entry == Some(index);
                    let response = egui::Frame::group(ui.style())
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} · Marker {}",
                                        entry.kind.label(),
                                        entry.marker_id
                                    ))
                                    .strong(),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        ui.label(
                                            egui::RichText::new(&entry.when)
                                                .small()
                                                .color(theme::MUTED_TEXT),
                                        );
                                    },
                                );
                            });
                            ui.label(summary(entry));
                        })
                        .response
                        .interact(egui::Sense::click());

                    if selected {
                        ui.painter().rect_stroke(
                            response.rect,
                            4.0,
                            egui::Stroke::new(1.5, ui.visuals().selection.stroke.color),
                            egui::StrokeKind::Inside,
                        );
                    }

                    if response.clicked() {
                        review.entry = Some(index);
                        match builtin_marker(entry.marker_id) {
                            Some(site) => view.center_on(site.position),
                            None => warn!("History entry for unknown marker {}", entry.marker_id),
                        }
                    }
                }
            });
        });
    Ok(())
}

/// Details of the selected history entry plus the reset confirmation.
pub fn history_dialogs_ui(
    mut contexts: EguiContexts,
    mut markers: ResMut<Markers>,
    mut review: ResMut<HistoryReview>,
    mut state: ResMut<HistoryPanelState>,
    mut popup: ResMut<MarkerPopupState>,
) -> Result {
    if let Some(index) = review.entry {
        let Some(entry) = markers.history().get(index).cloned() else {
            review.entry = None;
            return Ok(());
        };

        let mut open = true;
        egui::Window::new(format!("History: Marker {}", entry.marker_id))
            .id(egui::Id::new("history_review"))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
            .show(contexts.ctx_mut()?, |ui| {
                ui.label(egui::RichText::new(entry.kind.label()).strong());
                ui.add_space(4.0);
                egui::Grid::new("history_review_grid")
                    .num_columns(2)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        let note = if entry.note.is_empty() {
                            "(none)"
                        } else {
                            entry.note.as_str()
                        };
                        let date = if entry.date.is_empty() {
                            "(none)"
                        } else {
                            entry.date.as_str()
                        };
                        ui.label("Note:");
                        ui.label(note);
                        ui.end_row();
                        ui.label("Date:");
                        ui.label(date);
                        ui.end_row();
                        ui.label("When:");
                        ui.label(entry.when.as_str());
                        ui.end_row();
                    });
                ui.add_space(6.0);
                if ui.button("Open Marker").clicked()
                    && let Some(record) = markers.record(entry.marker_id)
                {
                    popup.open_for(record);
                }
            });
        if !open {
            review.entry = None;
        }
    }

    if state.confirm_reset {
        egui::Window::new("Reset History")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(contexts.ctx_mut()?, |ui| {
                ui.label("Reset all saved marker data and history?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .button(egui::RichText::new("Reset").color(theme::ERROR_TEXT))
                        .clicked()
                    {
                        markers.reset_all();
                        review.entry = None;
                        popup.close();
                        state.confirm_reset = false;
                    }
                    if ui.button("Cancel").clicked() {
                        state.confirm_reset = false;
                    }
                });
            });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::HistoryKind;

    fn entry(note: &str) -> HistoryEntry {
        HistoryEntry {
            kind: HistoryKind::Save,
            marker_id: 1,
            note: note.to_string(),
            date: "2024-01-01".to_string(),
            when: String::new(),
        }
    }

    #[test]
    fn test_summary_truncates_long_notes() {
        let long = "x".repeat(60);
        let text = summary(&entry(&long));
        assert_eq!(text.len(), 43);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_summary_of_empty_note() {
        assert_eq!(summary(&entry("")), "(no note)");
        assert_eq!(summary(&entry("short")), "short");
    }
}
