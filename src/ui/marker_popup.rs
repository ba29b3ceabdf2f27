use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::map::MapView;
use crate::markers::{MarkerPopupState, Markers, builtin_marker, local_timestamp};
use crate::theme;

/// Apply the popup's draft. Closes the popup on success.
fn commit_note(markers: &mut Markers, popup: &mut MarkerPopupState, id: u32) {
    match markers.save_note(id, &popup.note, &popup.date, &local_timestamp()) {
        Ok(()) => popup.close(),
        Err(e) => {
            popup.confirm_discard = false;
            popup.error = Some(e.to_string());
        }
    }
}

/// Note editor for the clicked marker.
pub fn marker_popup_ui(
    mut contexts: EguiContexts,
    mut popup: ResMut<MarkerPopupState>,
    mut markers: ResMut<Markers>,
    view: Res<MapView>,
) -> Result {
    let Some(id) = popup.open else {
        return Ok(());
    };
    let (Some(record), Some(site)) = (markers.record(id).cloned(), builtin_marker(id)) else {
        popup.close();
        return Ok(());
    };

    let anchor = view.latlng_to_screen(site.position);
    let mut close_requested = false;
    let mut save_requested = false;
    let dialog_open = popup.is_modal_open();

    egui::Window::new(format!("Marker {}", id))
        .id(egui::Id::new("marker_popup"))
        .collapsible(false)
        .resizable(false)
        .default_pos(egui::pos2(anchor.x + 16.0, anchor.y - 40.0))
        .default_width(320.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_enabled_ui(!dialog_open, |ui| {
                if ui.link("Open photo").clicked()
                    && let Err(e) = open::that(&record.image)
                {
                    warn!("Failed to open {}: {}", record.image, e);
                }
                ui.add_space(6.0);

                let note = ui.add(
                    egui::TextEdit::multiline(&mut popup.note)
                        .hint_text("Enter note...")
                        .desired_rows(3)
                        .desired_width(f32::INFINITY),
                );
                ui.horizontal(|ui| {
                    ui.label("Date:");
                    let date = ui.add(
                        egui::TextEdit::singleline(&mut popup.date)
                            .hint_text("YYYY-MM-DD")
                            .desired_width(100.0),
                    );
                    if note.changed() || date.changed() {
                        popup.edited = true;
                        popup.error = None;
                    }
                });

                if let Some(error) = &popup.error {
                    ui.colored_label(theme::ERROR_TEXT, error.as_str());
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(popup.can_save(), egui::Button::new("Save"))
                        .clicked()
                    {
                        save_requested = true;
                    }
                    if record.saved
                        && ui
                            .button(egui::RichText::new("Delete").color(theme::ERROR_TEXT))
                            .clicked()
                    {
                        popup.confirm_delete = true;
                    }
                    if ui.button("Close").clicked() {
                        close_requested = true;
                    }
                });
            });
        });

    if save_requested {
        commit_note(&mut markers, &mut popup, id);
    } else if close_requested {
        if popup.edited {
            popup.confirm_discard = true;
        } else {
            popup.close();
        }
    }

    if popup.confirm_delete {
        egui::Window::new("Clear Marker")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(contexts.ctx_mut()?, |ui| {
                ui.label("Clear saved data for this marker?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        markers.delete_note(id, &local_timestamp());
                        popup.close();
                    }
                    if ui.button("Cancel").clicked() {
                        popup.confirm_delete = false;
                    }
                });
            });
    }

    if popup.confirm_discard {
        egui::Window::new("Unsaved Note")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(contexts.ctx_mut()?, |ui| {
                ui.label("You have unsaved changes.");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(popup.can_save(), egui::Button::new("Save"))
                        .clicked()
                    {
                        commit_note(&mut markers, &mut popup, id);
                    }
                    if ui.button("Discard").clicked() {
                        popup.close();
                    }
                    if ui.button("Keep Editing").clicked() {
                        popup.confirm_discard = false;
                    }
                });
            });
    }

    Ok(())
}
