//! Polyline overlay drawn on top of the map.
//!
//! Lines are stored in geographic coordinates and re-projected every frame, so
//! they stay glued to the map while it pans and zooms. They are painted on
//! egui's background layer, which honors per-line stroke widths and sits under
//! all panels and windows.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::constants::DEFAULT_STROKE_COLOR;
use crate::drawing::{LatLng, LineOverlay, Style};

use super::MapView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolylineHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub path: Vec<LatLng>,
    pub style: Style,
}

/// Live polylines in paint order. A line added later paints on top.
#[derive(Debug, Default)]
pub struct PolylineLayer {
    lines: Vec<(PolylineHandle, Polyline)>,
    next_id: u64,
}

impl PolylineLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live lines, bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Polyline> {
        self.lines.iter().map(|(_, line)| line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LineOverlay for PolylineLayer {
    type Handle = PolylineHandle;

    fn add_line(&mut self, path: &[LatLng], style: &Style) -> PolylineHandle {
        let handle = PolylineHandle(self.next_id);
        self.next_id += 1;
        self.lines.push((
            handle,
            Polyline {
                path: path.to_vec(),
                style: style.clone(),
            },
        ));
        handle
    }

    fn remove_line(&mut self, handle: PolylineHandle) {
        // Handles are issued in increasing order, so the list stays sorted by them
        if let Ok(index) = self.lines.binary_search_by_key(&handle.0, |(h, _)| h.0) {
            self.lines.remove(index);
        }
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into an egui color.
pub fn parse_hex_color(hex: &str) -> Option<egui::Color32> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(egui::Color32::from_rgb(
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
    ))
}

pub fn stroke_color(style: &Style) -> egui::Color32 {
    parse_hex_color(&style.color)
        .or_else(|| parse_hex_color(DEFAULT_STROKE_COLOR))
        .unwrap_or(egui::Color32::DARK_GREEN)
}

/// Paint every polyline of `layer` with `view`'s projection.
pub fn paint_polylines(painter: &egui::Painter, view: &MapView, layer: &PolylineLayer) {
    for line in layer.iter() {
        let points: Vec<egui::Pos2> = line
            .path
            .iter()
            .map(|p| {
                let screen = view.latlng_to_screen(*p);
                egui::pos2(screen.x, screen.y)
            })
            .collect();
        let stroke = egui::Stroke::new(line.style.weight as f32, stroke_color(&line.style));

        match points.as_slice() {
            [] => {}
            // A stroke that has just begun: show a dot where the pointer went down
            [single] => {
                painter.circle_filled(*single, line.style.weight as f32 / 2.0, stroke.color);
            }
            _ => {
                painter.add(egui::Shape::line(points.clone(), stroke));
                // Round caps and joints
                for point in &points {
                    painter.circle_filled(*point, line.style.weight as f32 / 2.0, stroke.color);
                }
            }
        }
    }
}

/// Background painter shared by the map overlays.
pub fn background_painter(contexts: &mut EguiContexts) -> Result<egui::Painter> {
    let ctx = contexts.ctx_mut()?;
    Ok(ctx.layer_painter(egui::LayerId::background()))
}
