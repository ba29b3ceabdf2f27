use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::constants::{HISTORY_STORAGE_KEY, MARKERS_STORAGE_KEY};
use crate::drawing::Drawing;
use crate::map::{MapView, PointerPress, background_painter};
use crate::storage::AppStorage;
use crate::theme;
use crate::ui::DialogState;

use super::builtin::BUILTIN_MARKERS;
use super::{MarkerBook, MarkerPopupState, Markers};

/// Distance from the pin tip (the marker position) up to the head center
const PIN_HEAD_OFFSET: f32 = 16.0;
const PIN_HEAD_RADIUS: f32 = 9.0;
const PIN_DOT_RADIUS: f32 = 3.5;

/// Extra hit area around the pin head
const PIN_HIT_SLOP: f32 = 3.0;

fn pin_head(tip: Vec2) -> Vec2 {
    tip - Vec2::new(0.0, PIN_HEAD_OFFSET)
}

/// Whether a click at `at` lands on the pin whose tip is at `tip` (screen px).
pub fn pin_hit(tip: Vec2, at: Vec2) -> bool {
    let head = pin_head(tip);
    if at.distance(head) <= PIN_HEAD_RADIUS + PIN_HIT_SLOP {
        return true;
    }
    // Stem between head and tip
    (at.x - tip.x).abs() <= PIN_HEAD_RADIUS / 2.0 && at.y >= head.y && at.y <= tip.y
}

pub fn init_markers(mut commands: Commands, storage: Res<AppStorage>) {
    let book = MarkerBook::load(storage.0.clone(), MARKERS_STORAGE_KEY, HISTORY_STORAGE_KEY);
    commands.insert_resource(Markers(book));
}

/// Open the note popup for a clicked pin. Pins only respond while nothing is armed.
pub fn pick_marker(
    press: Res<PointerPress>,
    drawing: Res<Drawing>,
    view: Res<MapView>,
    markers: Res<Markers>,
    dialogs: Res<DialogState>,
    mut popup: ResMut<MarkerPopupState>,
) {
    if drawing.mode().is_armed() || dialogs.any_modal_open {
        return;
    }
    let Some(click) = press.click() else {
        return;
    };

    // Later pins are painted on top, so test them first
    let hit = BUILTIN_MARKERS
        .iter()
        .enumerate()
        .rev()
        .find(|(_, marker)| pin_hit(view.latlng_to_screen(marker.position), click));

    if let Some((index, _)) = hit
        && let Some(record) = markers.record(index as u32 + 1)
    {
        debug!("Opened marker {}", record.id);
        popup.open_for(record);
    }
}

pub fn paint_markers(
    mut contexts: EguiContexts,
    view: Res<MapView>,
    markers: Res<Markers>,
    popup: Res<MarkerPopupState>,
) -> Result {
    let painter = background_painter(&mut contexts)?;

    for (index, marker) in BUILTIN_MARKERS.iter().enumerate() {
        let id = index as u32 + 1;
        let saved = markers.record(id).is_some_and(|r| r.saved);
        let tip = view.latlng_to_screen(marker.position);
        let head = pin_head(tip);
        let fill = if saved {
            theme::PIN_SAVED
        } else {
            theme::PIN_DEFAULT
        };

        let tip_pos = egui::pos2(tip.x, tip.y);
        let head_pos = egui::pos2(head.x, head.y);
        painter.add(egui::Shape::convex_polygon(
            vec![
                egui::pos2(head.x - PIN_HEAD_RADIUS * 0.8, head.y + PIN_HEAD_RADIUS * 0.5),
                egui::pos2(head.x + PIN_HEAD_RADIUS * 0.8, head.y + PIN_HEAD_RADIUS * 0.5),
                tip_pos,
            ],
            fill,
            egui::Stroke::NONE,
        ));
        painter.circle_filled(head_pos, PIN_HEAD_RADIUS, fill);
        painter.circle_filled(head_pos, PIN_DOT_RADIUS, egui::Color32::WHITE);

        if popup.open == Some(id) {
            painter.circle_stroke(
                head_pos,
                PIN_HEAD_RADIUS + 2.0,
                egui::Stroke::new(2.0, theme::PIN_OUTLINE),
            );
        }
    }
    Ok(())
}

/// Small always-on labels above saved markers.
pub fn saved_labels_ui(
    mut contexts: EguiContexts,
    view: Res<MapView>,
    markers: Res<Markers>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    for record in markers.records().iter().filter(|r| r.saved) {
        let Some(marker) = super::builtin_marker(record.id) else {
            continue;
        };
        let head = pin_head(view.latlng_to_screen(marker.position));

        egui::Area::new(egui::Id::new(("marker_label", record.id)))
            .fixed_pos(egui::pos2(head.x, head.y - PIN_HEAD_RADIUS - 4.0))
            .pivot(egui::Align2::CENTER_BOTTOM)
            .order(egui::Order::Background)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(theme::LABEL_FILL)
                    .show(ui, |ui| {
                        ui.set_max_width(180.0);
                        ui.label(
                            egui::RichText::new(&record.date)
                                .strong()
                                .color(egui::Color32::BLACK),
                        );
                        ui.label(egui::RichText::new(&record.note).color(egui::Color32::BLACK));
                    });
            });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_hit_on_head_and_stem() {
        let tip = Vec2::new(100.0, 100.0);
        assert!(pin_hit(tip, Vec2::new(100.0, 84.0)));
        assert!(pin_hit(tip, Vec2::new(108.0, 84.0)));
        assert!(pin_hit(tip, Vec2::new(101.0, 98.0)));
    }

    #[test]
    fn test_pin_miss() {
        let tip = Vec2::new(100.0, 100.0);
        assert!(!pin_hit(tip, Vec2::new(130.0, 84.0)));
        assert!(!pin_hit(tip, Vec2::new(100.0, 110.0)));
        assert!(!pin_hit(tip, Vec2::new(100.0, 60.0)));
    }
}
