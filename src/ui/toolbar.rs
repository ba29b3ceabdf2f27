use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::RememberStyleRequest;
use crate::constants::{STROKE_COLORS, STROKE_WEIGHTS};
use crate::drawing::{Drawing, Mode};
use crate::map::parse_hex_color;
use crate::markers::Markers;
use crate::theme;

/// Toolbar-owned dialogs
#[derive(Resource, Default)]
pub struct ToolbarState {
    pub confirm_erase_all: bool,
    /// Outcome of the last explicit Save, shown until acknowledged
    pub save_result: Option<Result<(), String>>,
}

fn mode_button(ui: &mut egui::Ui, label: &str, hint: &str, selected: bool) -> bool {
    let button = egui::Button::new(egui::RichText::new(label).size(14.0).strong())
        .min_size(egui::vec2(0.0, 28.0))
        .selected(selected);
    ui.add(button).on_hover_text(hint).clicked()
}

/// Main drawing toolbar
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut drawing: ResMut<Drawing>,
    mut state: ResMut<ToolbarState>,
    mut remember_style: MessageWriter<RememberStyleRequest>,
) -> Result {
    egui::TopBottomPanel::top("drawing_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;
                let mode = drawing.mode();

                if mode_button(ui, "Draw", "Draw freehand (D)", mode == Mode::Drawing) {
                    drawing.set_mode(mode.toggled(Mode::Drawing));
                }
                if mode_button(ui, "Erase", "Erase under the pointer (E)", mode == Mode::Erasing) {
                    drawing.set_mode(mode.toggled(Mode::Erasing));
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let style = drawing.style().clone();
                let mut picked = None;

                for (name, hex) in STROKE_COLORS {
                    let Some(color) = parse_hex_color(hex) else {
                        continue;
                    };
                    let selected = style.color.eq_ignore_ascii_case(hex);
                    let swatch = egui::Button::new("")
                        .fill(color)
                        .min_size(egui::vec2(20.0, 20.0))
                        .stroke(if selected {
                            egui::Stroke::new(2.0, ui.visuals().strong_text_color())
                        } else {
                            egui::Stroke::new(1.0, egui::Color32::DARK_GRAY)
                        });
                    if ui.add(swatch).on_hover_text(name).clicked() {
                        picked = Some((hex.to_string(), style.weight));
                    }
                }

                ui.add_space(8.0);
                let mut weight = style.weight;
                egui::ComboBox::from_id_salt("stroke_width")
                    .selected_text(format!("{} px", weight))
                    .width(64.0)
                    .show_ui(ui, |ui| {
                        for choice in STROKE_WEIGHTS {
                            ui.selectable_value(&mut weight, choice, format!("{} px", choice));
                        }
                    });
                if weight != style.weight {
                    picked = Some((style.color.clone(), weight));
                }

                if let Some((color, weight)) = picked {
                    drawing.set_style(color.clone(), weight);
                    remember_style.write(RememberStyleRequest { color, weight });
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let has_strokes = !drawing.strokes().is_empty();
                if ui
                    .add_enabled(has_strokes, egui::Button::new("Undo"))
                    .on_hover_text("Remove the newest stroke (Ctrl+Z)")
                    .clicked()
                {
                    drawing.undo();
                }
                if ui
                    .add_enabled(has_strokes, egui::Button::new("Erase All"))
                    .clicked()
                {
                    state.confirm_erase_all = true;
                }
                if ui.button("Save").clicked() {
                    state.save_result = Some(drawing.save());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} · {} stroke(s)",
                            mode.display_name(),
                            drawing.strokes().len()
                        ))
                        .color(theme::MUTED_TEXT),
                    );
                });
            });
        });
    Ok(())
}

/// Non-modal banner for the latest failed write, drawings or markers.
pub fn persistence_error_banner_ui(
    mut contexts: EguiContexts,
    mut drawing: ResMut<Drawing>,
    mut markers: ResMut<Markers>,
) -> Result {
    let message = match (drawing.persist_error(), markers.persist_error()) {
        (Some(e), _) => format!("Drawings could not be saved: {}", e),
        (None, Some(e)) => format!("Marker notes could not be saved: {}", e),
        (None, None) => return Ok(()),
    };

    egui::TopBottomPanel::top("persistence_error_banner")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .fill(theme::ERROR_BANNER_FILL)
                .inner_margin(egui::Margin::symmetric(12, 6)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(theme::ERROR_TEXT, message);
                ui.label(
                    egui::RichText::new("Changes are kept until the app closes.")
                        .color(theme::MUTED_TEXT),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Dismiss").clicked() {
                        drawing.dismiss_persist_error();
                        markers.dismiss_persist_error();
                    }
                });
            });
        });
    Ok(())
}

/// Erase-all confirmation and the save outcome message.
pub fn toolbar_dialogs_ui(
    mut contexts: EguiContexts,
    mut drawing: ResMut<Drawing>,
    mut state: ResMut<ToolbarState>,
) -> Result {
    if state.confirm_erase_all {
        egui::Window::new("Erase All")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(contexts.ctx_mut()?, |ui| {
                ui.label("Erase ALL drawings? This cannot be undone.");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .button(egui::RichText::new("Erase All").color(theme::ERROR_TEXT))
                        .clicked()
                    {
                        drawing.clear_all();
                        state.confirm_erase_all = false;
                    }
                    if ui.button("Cancel").clicked() {
                        state.confirm_erase_all = false;
                    }
                });
            });
    }

    let mut acknowledged = false;
    if let Some(result) = &state.save_result {
        egui::Window::new("Save")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(contexts.ctx_mut()?, |ui| {
                match result {
                    Ok(()) => ui.colored_label(theme::SUCCESS_TEXT, "Drawings saved."),
                    Err(e) => {
                        ui.colored_label(theme::ERROR_TEXT, format!("Could not save drawings: {}", e))
                    }
                };
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
    }
    if acknowledged {
        state.save_result = None;
    }

    Ok(())
}
