//! Centralized color theme for the map, overlays and dialogs.

use bevy::prelude::Color;
use bevy_egui::egui;

// ============================================================================
// Map Surface
// ============================================================================

/// Paper-like background behind the graticule
pub const MAP_BACKGROUND: Color = Color::srgb(0.93, 0.93, 0.89);

/// Minor graticule lines
pub const GRATICULE_COLOR: Color = Color::srgba(0.45, 0.5, 0.55, 0.25);

/// Every fifth graticule line
pub const GRATICULE_MAJOR_COLOR: Color = Color::srgba(0.35, 0.4, 0.45, 0.5);

/// Outline of the eraser footprint under the cursor
pub const ERASER_OUTLINE: Color = Color::srgba(0.9, 0.2, 0.2, 0.8);

// ============================================================================
// Marker Pins
// ============================================================================

/// Pin without a saved note
pub const PIN_DEFAULT: egui::Color32 = egui::Color32::from_rgb(0x00, 0x7b, 0xff);

/// Pin carrying a saved note
pub const PIN_SAVED: egui::Color32 = egui::Color32::from_rgb(0xff, 0x00, 0x00);

/// Pin under the pointer or with its popup open
pub const PIN_OUTLINE: egui::Color32 = egui::Color32::WHITE;

/// Saved-note label background
pub const LABEL_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(255, 255, 255, 235);

// ============================================================================
// Status Colors
// ============================================================================

/// Red for errors and destructive actions
pub const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);

/// Dark red fill behind the persistence error banner
pub const ERROR_BANNER_FILL: egui::Color32 = egui::Color32::from_rgb(90, 20, 20);

/// Green for confirmations
pub const SUCCESS_TEXT: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);

/// Muted grey for secondary text
pub const MUTED_TEXT: egui::Color32 = egui::Color32::GRAY;
