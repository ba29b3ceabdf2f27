use bevy::gizmos::config::GizmoConfigGroup;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::drawing::LatLng;
use crate::theme;

use super::MapView;

#[derive(Component)]
pub struct MapCamera;

/// Gizmo group for the graticule and cursor decorations
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct MapGizmoGroup;

/// Graticule spacing candidates in degrees, coarse to fine
const GRATICULE_STEPS: [f64; 14] = [
    10.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.1, 0.05, 0.02, 0.01, 0.005, 0.002, 0.001, 0.0005,
];

/// Minimum on-screen distance between graticule lines
const GRATICULE_MIN_SPACING_PX: f64 = 80.0;

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, MapCamera));
}

/// Keep the view's viewport in step with the primary window size.
pub fn sync_viewport(
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut view: ResMut<MapView>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let size = window.size();
    if view.viewport != size {
        view.viewport = size;
    }
}

/// Pick the finest graticule step that keeps lines at least the minimum spacing apart.
pub fn graticule_step(view: &MapView) -> f64 {
    let left = view.screen_to_latlng(Vec2::ZERO);
    let right = view.screen_to_latlng(Vec2::new(GRATICULE_MIN_SPACING_PX as f32, 0.0));
    let degrees = (right.lng - left.lng).abs();
    GRATICULE_STEPS
        .iter()
        .rev()
        .copied()
        .find(|step| *step >= degrees)
        .unwrap_or(GRATICULE_STEPS[0])
}

pub fn draw_graticule(mut gizmos: Gizmos<MapGizmoGroup>, view: Res<MapView>) {
    if view.viewport.x <= 0.0 || view.viewport.y <= 0.0 {
        return;
    }

    let step = graticule_step(&view);
    let top_left = view.screen_to_latlng(Vec2::ZERO);
    let bottom_right = view.screen_to_latlng(view.viewport);
    let line_color = |index: i64| {
        if index % 5 == 0 {
            theme::GRATICULE_MAJOR_COLOR
        } else {
            theme::GRATICULE_COLOR
        }
    };

    let first_lng = (top_left.lng / step).floor() as i64;
    let last_lng = (bottom_right.lng / step).ceil() as i64;
    for index in first_lng..=last_lng {
        let lng = index as f64 * step;
        let screen_x = view.latlng_to_screen(LatLng::new(view.center.lat, lng)).x;
        let top = view.screen_to_world(Vec2::new(screen_x, 0.0));
        let bottom = view.screen_to_world(Vec2::new(screen_x, view.viewport.y));
        gizmos.line_2d(top, bottom, line_color(index));
    }

    let first_lat = (bottom_right.lat / step).floor() as i64;
    let last_lat = (top_left.lat / step).ceil() as i64;
    for index in first_lat..=last_lat {
        let lat = index as f64 * step;
        let screen_y = view.latlng_to_screen(LatLng::new(lat, view.center.lng)).y;
        let left = view.screen_to_world(Vec2::new(0.0, screen_y));
        let right = view.screen_to_world(Vec2::new(view.viewport.x, screen_y));
        gizmos.line_2d(left, right, line_color(index));
    }
}
