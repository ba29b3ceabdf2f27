//! The map surface the drawing sits on.
//!
//! - [`MapView`]: Web Mercator projection between window pixels and lat/lng
//! - [`PolylineLayer`]: geo-anchored lines, the drawing overlay's backing store
//! - gestures: pan, scroll zoom and pinch zoom, gated by [`MapGestureGate`]
//!
//! There are no raster tiles; a lat/lng graticule gives the surface its scale.

mod camera;
mod gestures;
mod overlay;
mod view;

pub use camera::MapGizmoGroup;
pub use gestures::{MapGestureGate, PointerPress};
pub use overlay::{PolylineLayer, background_painter, paint_polylines, parse_hex_color};
pub use view::MapView;

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};
use crate::constants::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM};
use crate::drawing::LatLng;

/// System set for map input handling. Drawing input runs after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapInput;

impl Default for MapView {
    fn default() -> Self {
        MapView::new(
            LatLng::new(DEFAULT_MAP_CENTER.0, DEFAULT_MAP_CENTER.1),
            DEFAULT_MAP_ZOOM,
            Vec2::ZERO,
        )
    }
}

fn apply_configured_view(config: Res<AppConfig>, mut view: ResMut<MapView>) {
    let [lat, lng] = config.data.map_center;
    *view = MapView::new(LatLng::new(lat, lng), config.data.map_zoom, view.viewport);
    info!(
        "Map view at ({:.5}, {:.5}), zoom {}",
        view.center.lat, view.center.lng, view.zoom
    );
}

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapView>()
            .init_resource::<MapGestureGate>()
            .init_resource::<PointerPress>()
            .insert_resource(ClearColor(crate::theme::MAP_BACKGROUND))
            .init_gizmo_group::<MapGizmoGroup>()
            .add_systems(
                Startup,
                (camera::spawn_camera, apply_configured_view.after(ConfigLoaded)),
            )
            .add_systems(
                Update,
                (
                    camera::sync_viewport,
                    gestures::track_pointer_press,
                    gestures::pointer_pan,
                    gestures::scroll_zoom,
                    gestures::touch_gestures,
                )
                    .chain()
                    .in_set(MapInput),
            )
            .add_systems(Update, camera::draw_graticule.after(MapInput));
    }
}
