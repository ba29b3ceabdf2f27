//! Centralized constants used across the application.
//!
//! Storage keys are shared with earlier releases of the map and must not change,
//! or saved drawings and notes will appear lost.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1280.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 800.0;

/// Storage key holding the serialized drawing (array of strokes)
pub const DRAWINGS_STORAGE_KEY: &str = "lg6map_drawings_v1";

/// Storage key holding the per-marker note records
pub const MARKERS_STORAGE_KEY: &str = "lg6map_markers_v1";

/// Storage key holding the marker history log
pub const HISTORY_STORAGE_KEY: &str = "lg6map_history_v1";

/// Upper bound for the whole storage file, mirroring a browser local-storage quota
pub const STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_STROKE_COLOR: &str = "#16a34a";

pub const DEFAULT_STROKE_WEIGHT: u32 = 5;

/// Stroke width choices offered by the toolbar
pub const STROKE_WEIGHTS: [u32; 5] = [2, 3, 5, 8, 12];

/// Color swatches offered by the toolbar
pub const STROKE_COLORS: [(&str, &str); 8] = [
    ("Green", "#16a34a"),
    ("Red", "#dc2626"),
    ("Blue", "#2563eb"),
    ("Yellow", "#eab308"),
    ("Orange", "#ea580c"),
    ("Purple", "#9333ea"),
    ("Black", "#111827"),
    ("White", "#ffffff"),
];

/// Erase radius per weight unit, mouse input
pub const POINTER_ERASE_FACTOR: f64 = 1.5;

/// Erase radius per weight unit, touch input (fingers are less precise)
pub const TOUCH_ERASE_FACTOR: f64 = 3.0;

/// Initial map center (lat, lng)
pub const DEFAULT_MAP_CENTER: (f64, f64) = (7.0840, 125.6277);

pub const DEFAULT_MAP_ZOOM: f64 = 17.0;

/// Pointer travel (logical px) below which a press/release counts as a click
pub const CLICK_SLOP_PX: f32 = 4.0;
