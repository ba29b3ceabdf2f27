//! Native map gestures: drag to pan, scroll and pinch to zoom.
//!
//! Single-pointer panning (left mouse drag, one-finger drag) can be switched
//! off through [`MapGestureGate`] while another tool owns that input.
//! Middle-drag, scroll and two-finger pinch always stay available.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow};
use bevy_egui::EguiContexts;

use crate::constants::CLICK_SLOP_PX;

use super::MapView;

/// Whether single-pointer panning is currently allowed.
#[derive(Resource, Debug)]
pub struct MapGestureGate {
    pub single_pointer_pan: bool,
}

impl Default for MapGestureGate {
    fn default() -> Self {
        Self {
            single_pointer_pan: true,
        }
    }
}

/// Tracks the current left-button press that started on the map.
#[derive(Resource, Debug, Default)]
pub struct PointerPress {
    origin: Option<Vec2>,
    travelled: f32,
    click: Option<Vec2>,
}

impl PointerPress {
    /// True while a left press that began on the map (not on a panel) is held.
    pub fn on_map(&self) -> bool {
        self.origin.is_some()
    }

    /// Screen position of a click released this frame, if any.
    pub fn click(&self) -> Option<Vec2> {
        self.click
    }

    fn press(&mut self, at: Vec2) {
        self.origin = Some(at);
        self.travelled = 0.0;
    }

    fn moved(&mut self, delta: Vec2) {
        if self.origin.is_some() {
            self.travelled += delta.length();
        }
    }

    fn release(&mut self, at: Option<Vec2>) {
        if self.origin.take().is_some() && self.travelled < CLICK_SLOP_PX {
            self.click = at;
        }
    }
}

/// Zoom levels per scroll line
const ZOOM_PER_LINE: f64 = 0.5;

/// Zoom levels per scrolled pixel (touchpads)
const ZOOM_PER_PIXEL: f64 = 0.01;

pub fn track_pointer_press(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut cursor_moves: MessageReader<CursorMoved>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut press: ResMut<PointerPress>,
    mut contexts: EguiContexts,
) {
    press.click = None;
    let cursor = window_query.single().ok().and_then(Window::cursor_position);

    if mouse_button.just_pressed(MouseButton::Left)
        && let Some(at) = cursor
    {
        let over_ui = contexts
            .ctx_mut()
            .map(|ctx| ctx.is_pointer_over_area())
            .unwrap_or(false);
        if !over_ui {
            press.press(at);
        }
    }

    for moved in cursor_moves.read() {
        if let Some(delta) = moved.delta {
            press.moved(delta);
        }
    }

    if mouse_button.just_released(MouseButton::Left) {
        press.release(cursor);
    }
}

pub fn pointer_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut cursor_moves: MessageReader<CursorMoved>,
    gate: Res<MapGestureGate>,
    press: Res<PointerPress>,
    mut view: ResMut<MapView>,
) {
    let left_pan =
        gate.single_pointer_pan && press.on_map() && mouse_button.pressed(MouseButton::Left);
    let middle_pan = mouse_button.pressed(MouseButton::Middle);

    if !left_pan && !middle_pan {
        cursor_moves.clear();
        return;
    }

    for moved in cursor_moves.read() {
        if let Some(delta) = moved.delta {
            view.pan_by(delta);
        }
    }
}

pub fn scroll_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut view: ResMut<MapView>,
    mut contexts: EguiContexts,
) {
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        scroll_events.clear();
        return;
    }

    let anchor = window_query
        .single()
        .ok()
        .and_then(Window::cursor_position)
        .unwrap_or(view.viewport / 2.0);

    for event in scroll_events.read() {
        let amount = match event.unit {
            MouseScrollUnit::Line => f64::from(event.y) * ZOOM_PER_LINE,
            MouseScrollUnit::Pixel => f64::from(event.y) * ZOOM_PER_PIXEL,
        };
        let zoom = view.zoom + amount;
        view.zoom_around(anchor, zoom);
    }
}

/// One-finger pan (when allowed) and two-finger pinch zoom.
pub fn touch_gestures(touches: Res<Touches>, gate: Res<MapGestureGate>, mut view: ResMut<MapView>) {
    let active: Vec<&bevy::input::touch::Touch> = touches.iter().collect();
    match active.as_slice() {
        [one] if gate.single_pointer_pan => view.pan_by(one.delta()),
        [a, b] => {
            let before = a.previous_position().distance(b.previous_position());
            let after = a.position().distance(b.position());
            let mid_before = (a.previous_position() + b.previous_position()) / 2.0;
            let mid_after = (a.position() + b.position()) / 2.0;

            view.pan_by(mid_after - mid_before);
            if before > 1.0 && after > 1.0 {
                let zoom = view.zoom + f64::from(after / before).log2();
                view.zoom_around(mid_after, zoom);
            }
        }
        _ => {}
    }
}
