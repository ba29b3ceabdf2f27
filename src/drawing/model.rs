//! Plain data types for freehand drawings.
//!
//! These serialize to the persisted layout directly:
//! a drawing is `[[{lat, lng, color, weight}, ...], ...]`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WEIGHT};

use super::geo::LatLng;

fn default_color() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}

fn default_weight() -> u32 {
    DEFAULT_STROKE_WEIGHT
}

/// Stroke color and line width applied to newly started strokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// Hex color, e.g. `#16a34a`
    pub color: String,
    /// Line width in pixels
    pub weight: u32,
}

impl Style {
    pub fn new(color: impl Into<String>, weight: u32) -> Self {
        Self {
            color: color.into(),
            weight,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: default_color(),
            weight: default_weight(),
        }
    }
}

/// One sampled position of a stroke. Style is repeated on every point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl Point {
    pub fn new(position: LatLng, style: &Style) -> Self {
        Self {
            lat: position.lat,
            lng: position.lng,
            color: style.color.clone(),
            weight: style.weight,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A continuous freehand line in drawing order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A stroke needs at least two points to be drawn as a line.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Style of the stroke, taken from its first point.
    pub fn style(&self) -> Style {
        self.points
            .first()
            .map(|p| Style::new(p.color.clone(), p.weight))
            .unwrap_or_default()
    }

    pub fn positions(&self) -> Vec<LatLng> {
        self.points.iter().map(Point::position).collect()
    }
}

/// Current tool mode selected from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Drawing,
    Erasing,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Idle => "Idle",
            Mode::Drawing => "Drawing",
            Mode::Erasing => "Erasing",
        }
    }

    /// Whether input capture is attached in this mode.
    pub fn is_armed(&self) -> bool {
        !matches!(self, Mode::Idle)
    }

    /// Toolbar toggle semantics: pressing the active mode's button goes idle.
    pub fn toggled(self, target: Mode) -> Mode {
        if self == target { Mode::Idle } else { target }
    }
}
