//! Freehand drawing on the map.
//!
//! The core owns no ECS state and is tested without an `App`:
//!
//! - [`geo`]: `LatLng` and haversine distance
//! - [`model`]: points, strokes, styles, modes
//! - [`path_store`]: the ordered stroke list and the stroke being drawn
//! - [`erase`]: splitting strokes around an erase point
//! - [`input`]: gesture router turning pointer/touch input into intents
//! - [`render_sync`]: mirrors the stroke list onto a [`LineOverlay`]
//! - [`persistence`]: tolerant load, strict save
//! - [`session`]: ties the above together behind toolbar-level operations
//!
//! [`systems`] adapts the session to bevy: window events in, painted lines out.

pub mod erase;
pub mod geo;
pub mod input;
pub mod model;
pub mod path_store;
pub mod persistence;
pub mod render_sync;
pub mod session;
mod systems;

pub use geo::{LatLng, distance_meters};
pub use input::{InputEvent, InputSource};
pub use model::{Mode, Stroke, Style};
pub use render_sync::LineOverlay;
pub use session::{DrawingSession, EraseSettings};
pub use systems::{Drawing, DrawingReady, TouchTracker};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigLoaded;
use crate::map::MapInput;
use crate::storage::StorageOpened;

/// System set painting the drawing overlay (map decorations paint after it)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrawingPaint;

pub struct DrawingPlugin;

impl Plugin for DrawingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TouchTracker>()
            .add_systems(
                Startup,
                systems::init_drawing_session
                    .after(ConfigLoaded)
                    .after(StorageOpened)
                    .in_set(DrawingReady),
            )
            // Gate must reflect the current mode before the map handles panning
            .add_systems(Update, systems::sync_gesture_gate.before(MapInput))
            .add_systems(
                Update,
                (systems::route_window_input, systems::handle_drawing_shortcuts)
                    .chain()
                    .after(MapInput),
            )
            .add_systems(
                Update,
                systems::draw_eraser_cursor.after(systems::route_window_input),
            )
            .add_systems(
                EguiPrimaryContextPass,
                systems::paint_drawing.in_set(DrawingPaint),
            );
    }
}
